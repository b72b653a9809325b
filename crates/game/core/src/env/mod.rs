//! Read-only content and the random source.
//!
//! The [`ContentCatalog`] and [`Localizer`] are constructed once by the host
//! and handed to the combat and event engines. [`RngOracle`] is the only
//! source of randomness any rule in this crate consults.
mod catalog;
mod error;
mod locale;
mod rng;

pub use catalog::{ContentCatalog, Environment, MonsterTemplate, TemplateMove};
pub use error::CatalogError;
pub use locale::Localizer;
pub use rng::{PcgRng, RngOracle, ScriptedRng};
