//! Message template loader.

use std::collections::HashMap;
use std::path::Path;

use monster_core::Localizer;

use crate::loaders::{LoadResult, read_file};

/// Loader for localized strings from RON maps of `key: template`.
pub struct LocaleLoader;

impl LocaleLoader {
    /// Load the templates of `locale` from a RON file.
    ///
    /// # Returns
    ///
    /// Returns a Localizer; keys missing from the file translate to themselves.
    pub fn load(path: &Path, locale: &str) -> LoadResult<Localizer> {
        let content = read_file(path)?;
        Self::parse(&content, locale)
    }

    pub fn parse(content: &str, locale: &str) -> LoadResult<Localizer> {
        let strings: HashMap<String, String> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse locale RON: {}", e))?;
        Ok(Localizer::with_strings(locale, strings))
    }
}
