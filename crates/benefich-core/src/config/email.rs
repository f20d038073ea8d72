//! SMTP email channel configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Email notification channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Whether the EMAIL channel is dispatched.
    #[serde(default)]
    pub enabled: bool,
    /// SMTP relay host.
    #[serde(default)]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_port")]
    pub smtp_port: u16,
    /// SMTP username; empty disables authentication.
    #[serde(default)]
    pub username: String,
    /// SMTP password.
    #[serde(default)]
    pub password: String,
    /// Sender mailbox, e.g. `BenefiCh <no-reply@benefi.ch>`.
    #[serde(default = "default_from")]
    pub from_address: String,
    /// Handlebars template for the HTML body. Falls back to the bundled one.
    #[serde(default)]
    pub template_path: Option<String>,
    /// Per-kind banner line rendered at the top of the body.
    #[serde(default)]
    pub headlines: EmailHeadlines,
}

/// Banner text shown in the email body, one per content kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailHeadlines {
    /// Headline for events.
    #[serde(default = "default_event_headline")]
    pub event: String,
    /// Headline for news.
    #[serde(default = "default_new_headline")]
    pub new: String,
    /// Headline for benefits.
    #[serde(default = "default_benefit_headline")]
    pub benefit: String,
}

impl Default for EmailHeadlines {
    fn default() -> Self {
        Self {
            event: default_event_headline(),
            new: default_new_headline(),
            benefit: default_benefit_headline(),
        }
    }
}

impl EmailConfig {
    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if !self.enabled {
            return Ok(());
        }
        super::require("email", "smtp_host", &self.smtp_host)?;
        super::require("email", "from_address", &self.from_address)?;
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: String::new(),
            smtp_port: default_port(),
            username: String::new(),
            password: String::new(),
            from_address: default_from(),
            template_path: None,
            headlines: EmailHeadlines::default(),
        }
    }
}

fn default_port() -> u16 {
    587
}

fn default_from() -> String {
    "BenefiCh <no-reply@benefi.ch>".to_string()
}

fn default_event_headline() -> String {
    "BenefiCh - ¡Se ha añadido un evento!".to_string()
}

fn default_new_headline() -> String {
    "BenefiCh - ¡Se ha añadido una noticia!".to_string()
}

fn default_benefit_headline() -> String {
    "BenefiCh - ¡Hay un nuevo beneficio para ti!".to_string()
}
