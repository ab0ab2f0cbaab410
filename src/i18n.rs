//! Translation of labels and locale metadata.
//!
//! # Responsibilities
//! - `Translator` seam used by menus, actions and fields
//! - Catalog-backed translator built from the `[i18n.catalogs]` table
//! - Per-request locale, text direction and translation domain
//!
//! # Design Decisions
//! - Missing messages translate to their id
//! - Parameters are substituted as `%name%` or `{name}`

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::http::query::scalar_to_string;

/// Domain used when none is given.
pub const DEFAULT_DOMAIN: &str = "messages";

pub trait Translator: Send + Sync {
    fn trans(&self, id: &str, params: &Map<String, Value>, domain: Option<&str>, locale: &str) -> String;
}

/// A message translated lazily, once the locale is known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslatableMessage {
    pub message: String,
    pub parameters: Map<String, Value>,
    pub domain: Option<String>,
}

impl TranslatableMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            parameters: Map::new(),
            domain: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn trans(&self, translator: &dyn Translator, locale: &str) -> String {
        translator.trans(&self.message, &self.parameters, self.domain.as_deref(), locale)
    }
}

impl From<&str> for TranslatableMessage {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for TranslatableMessage {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// locale → domain → id → translation
type Catalogs = HashMap<String, HashMap<String, HashMap<String, String>>>;

/// Translator over in-memory catalogs.
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    catalogs: Catalogs,
}

impl CatalogTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the catalogs from `locale → domain → id → translation` tables.
    /// Non-string translations are ignored.
    pub fn from_config(catalogs: &Map<String, Value>) -> Self {
        let mut translator = Self::new();
        for (locale, domains) in catalogs {
            let Some(domains) = domains.as_object() else {
                tracing::warn!(locale = %locale, "Ignoring translation catalog that is not a table");
                continue;
            };
            for (domain, messages) in domains {
                for (id, translation) in messages.as_object().into_iter().flatten() {
                    if let Some(translation) = translation.as_str() {
                        translator.add(locale, domain, id, translation);
                    }
                }
            }
        }
        translator
    }

    pub fn add(&mut self, locale: &str, domain: &str, id: &str, translation: &str) {
        self.catalogs
            .entry(locale.to_string())
            .or_default()
            .entry(domain.to_string())
            .or_default()
            .insert(id.to_string(), translation.to_string());
    }

    fn lookup(&self, id: &str, domain: &str, locale: &str) -> Option<&str> {
        self.catalogs
            .get(locale)?
            .get(domain)?
            .get(id)
            .map(String::as_str)
    }
}

impl Translator for CatalogTranslator {
    fn trans(&self, id: &str, params: &Map<String, Value>, domain: Option<&str>, locale: &str) -> String {
        let domain = domain.unwrap_or(DEFAULT_DOMAIN);
        // "pt_BR" falls back to "pt"
        let language = locale.split(['_', '-']).next().unwrap_or(locale);
        let message = self
            .lookup(id, domain, locale)
            .or_else(|| self.lookup(id, domain, language))
            .unwrap_or(id);
        substitute(message, params)
    }
}

fn substitute(message: &str, params: &Map<String, Value>) -> String {
    let mut result = message.to_string();
    for (key, value) in params {
        let value = scalar_to_string(value).unwrap_or_default();
        if key.starts_with('%') || key.starts_with('{') {
            result = result.replace(key.as_str(), &value);
        } else {
            result = result
                .replace(&format!("%{key}%"), &value)
                .replace(&format!("{{{key}}}"), &value);
        }
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    const RTL_LANGUAGES: [&'static str; 7] = ["ar", "dv", "fa", "he", "ku", "ps", "ur"];

    pub fn for_locale(locale: &str) -> Self {
        let language = locale.split(['_', '-']).next().unwrap_or(locale);
        if Self::RTL_LANGUAGES.contains(&language.to_ascii_lowercase().as_str()) {
            Self::Rtl
        } else {
            Self::Ltr
        }
    }
}

/// Locale settings of the current request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct I18n {
    pub locale: String,
    pub text_direction: TextDirection,
    pub translation_domain: String,
    pub translation_parameters: Map<String, Value>,
}

impl I18n {
    pub fn new(locale: impl Into<String>) -> Self {
        let locale = locale.into();
        Self {
            text_direction: TextDirection::for_locale(&locale),
            locale,
            translation_domain: DEFAULT_DOMAIN.to_string(),
            translation_parameters: Map::new(),
        }
    }

    /// Translates `id` in the request domain, with `params` over the request parameters.
    pub fn trans(&self, translator: &dyn Translator, id: &str, params: &Map<String, Value>) -> String {
        let mut merged = self.translation_parameters.clone();
        merged.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        translator.trans(id, &merged, Some(&self.translation_domain), &self.locale)
    }
}
