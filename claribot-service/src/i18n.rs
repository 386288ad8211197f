//! User-facing messages, resolved through Fluent bundles.
//!
//! Message catalogues are compiled into the binary from `locales/*.ftl` and
//! parsed once at startup. Lookups fall back from a regional locale
//! (`en-GB`) to its language (`en`), then to English, then to the key itself.

use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use std::collections::HashMap;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

const DEFAULT_LOCALE: &str = "en";

const EMBEDDED_LOCALES: &[(&str, &str)] = &[("en", include_str!("../locales/en.ftl"))];

/// Message catalogue for every embedded locale
pub struct I18n {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl I18n {
    pub fn new() -> Self {
        let mut bundles = HashMap::new();
        for (locale, source) in EMBEDDED_LOCALES {
            match build_bundle(locale, source) {
                Ok(bundle) => {
                    debug!(locale = %locale, "Loaded messages");
                    bundles.insert(locale.to_string(), bundle);
                }
                Err(e) => warn!(locale = %locale, error = %e, "Failed to load messages"),
            }
        }
        Self { bundles }
    }

    /// Message without arguments
    pub fn get(&self, locale: &str, key: &str) -> String {
        self.resolve(locale, key, None)
    }

    /// Message with named string arguments
    pub fn format(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, *value);
        }
        self.resolve(locale, key, Some(&fluent_args))
    }

    fn resolve(&self, locale: &str, key: &str, args: Option<&FluentArgs>) -> String {
        let language = locale.split(['-', '_']).next().unwrap_or(locale);
        [locale, language, DEFAULT_LOCALE]
            .into_iter()
            .find_map(|candidate| self.lookup(candidate, key, args))
            .unwrap_or_else(|| key.to_string())
    }

    fn lookup(&self, locale: &str, key: &str, args: Option<&FluentArgs>) -> Option<String> {
        let bundle = self.bundles.get(locale)?;
        let pattern = bundle.get_message(key)?.value()?;

        let mut errors = vec![];
        let text = bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            warn!(key = %key, errors = ?errors, "Fluent formatting errors");
        }

        Some(text.into_owned())
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

fn build_bundle(locale: &str, source: &str) -> Result<FluentBundle<FluentResource>, String> {
    let lang_id: LanguageIdentifier = locale
        .parse()
        .map_err(|e| format!("Invalid locale '{}': {}", locale, e))?;

    let resource = FluentResource::try_new(source.to_string())
        .map_err(|(_, errors)| format!("Failed to parse Fluent resource: {:?}", errors))?;

    let mut bundle = FluentBundle::new_concurrent(vec![lang_id]);
    bundle
        .add_resource(resource)
        .map_err(|errors| format!("Failed to add resource to bundle: {:?}", errors))?;

    Ok(bundle)
}
