//! Message templates keyed by localization id.

use std::collections::HashMap;

/// Translation table for one locale.
///
/// Templates use `{name}` placeholders. Missing keys translate to the key
/// itself so scripts never fail on absent strings.
#[derive(Clone, Debug, Default)]
pub struct Localizer {
    locale: String,
    strings: HashMap<String, String>,
}

impl Localizer {
    pub const DEFAULT_LOCALE: &'static str = "en_US";

    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            strings: HashMap::new(),
        }
    }

    pub fn with_strings(
        locale: impl Into<String>,
        strings: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            locale: locale.into(),
            strings: strings.into_iter().collect(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.strings.insert(key.into(), template.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.strings.contains_key(key)
    }

    pub fn translate(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_owned())
    }

    /// Translates `key` and substitutes each `{param}` placeholder.
    pub fn format(&self, key: &str, params: &[(&str, &str)]) -> String {
        let template = self.strings.get(key).map(String::as_str).unwrap_or(key);
        let mut text = template.to_owned();
        for (name, value) in params {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_replaces_placeholders() {
        let mut locale = Localizer::new(Localizer::DEFAULT_LOCALE);
        locale.insert("combat_used_x", "{user} used {name} on {target}!");
        let text = locale.format(
            "combat_used_x",
            &[("user", "Rockitten"), ("name", "Ram"), ("target", "Bamboon")],
        );
        assert_eq!(text, "Rockitten used Ram on Bamboon!");
    }

    #[test]
    fn missing_keys_fall_back_to_the_key() {
        let locale = Localizer::default();
        assert_eq!(locale.translate("gotcha"), "gotcha");
        assert_eq!(locale.format("gotcha", &[("name", "x")]), "gotcha");
    }
}
