//! Dashboard presentation settings.

use serde::Serialize;

use crate::i18n::{TextDirection, DEFAULT_DOMAIN};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub title: String,
    pub favicon_path: String,
    pub translation_domain: String,
    /// Forced text direction; derived from the locale when unset.
    pub text_direction: Option<TextDirection>,
    pub locales: Vec<String>,
    pub content_maximized: bool,
    pub sidebar_minimized: bool,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            title: "Admin".to_string(),
            favicon_path: "favicon.svg".to_string(),
            translation_domain: DEFAULT_DOMAIN.to_string(),
            text_direction: None,
            locales: Vec::new(),
            content_maximized: false,
            sidebar_minimized: false,
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn set_favicon_path(mut self, path: impl Into<String>) -> Self {
        self.favicon_path = path.into();
        self
    }

    pub fn set_translation_domain(mut self, domain: impl Into<String>) -> Self {
        self.translation_domain = domain.into();
        self
    }

    pub fn set_text_direction(mut self, direction: TextDirection) -> Self {
        self.text_direction = Some(direction);
        self
    }

    pub fn set_locales<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locales = locales.into_iter().map(Into::into).collect();
        self
    }

    pub fn render_content_maximized(mut self) -> Self {
        self.content_maximized = true;
        self
    }

    pub fn render_sidebar_minimized(mut self) -> Self {
        self.sidebar_minimized = true;
        self
    }
}
