//! Combat formula library.
//!
//! Pure functions over monster snapshots: damage, capture, money and
//! experience. The combat engine calls these; nothing here schedules,
//! animates or logs beyond warnings for malformed content.
//!
//! # Core Functions
//!
//! - `simple_damage_calculate`: stats, range and type chart to damage
//! - `capture_check`: four shake trials against the capture threshold
//! - `award_money` / `award_experience`: reward methods selected by name
//! - `apply_technique`: runs the effect list of a technique

pub mod capture;
pub mod damage;
pub mod effect;
pub mod error;
pub mod reward;

pub use capture::{
    CaptureInput, CaptureResult, SHAKE_ROLL_MAX, SHAKE_TRIALS, capture_check,
    capture_probability, catch_value, shake_threshold, status_modifier,
};
pub use damage::{
    damage_multiplier, effectiveness_key, simple_damage_calculate, simple_lifeleech, simple_overfeed, simple_poison,
    simple_recover,
};
pub use effect::{EffectOutcome, apply_technique};
pub use error::FormulaError;
pub use reward::{
    DamageMap, ExperienceMethod, ExperienceShare, Hit, MoneyMethod, award_experience,
    award_money, winners,
};
