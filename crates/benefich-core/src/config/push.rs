//! Firebase Cloud Messaging configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Mobile push channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Whether the MOBILE channel is dispatched.
    #[serde(default)]
    pub enabled: bool,
    /// Firebase project id.
    #[serde(default)]
    pub project_id: String,
    /// Path to the service-account JSON key.
    #[serde(default)]
    pub service_account_path: String,
    /// FCM API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Body template shared by every kind.
    #[serde(default = "default_body")]
    pub body: String,
    /// Event broadcasts.
    #[serde(default = "default_event")]
    pub event: PushKindConfig,
    /// News broadcasts.
    #[serde(default = "default_new")]
    pub new: PushKindConfig,
    /// Benefit broadcasts.
    #[serde(default = "default_benefit")]
    pub benefit: PushKindConfig,
}

/// Title and topic templates for one content kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushKindConfig {
    /// Notification title template.
    pub title: String,
    /// FCM topic template, e.g. `eventsAt{{place_id}}`.
    pub topic: String,
}

impl PushConfig {
    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if !self.enabled {
            return Ok(());
        }
        super::require("push", "project_id", &self.project_id)?;
        super::require("push", "service_account_path", &self.service_account_path)?;
        for kind in [&self.event, &self.new, &self.benefit] {
            super::require("push", "topic", &kind.topic)?;
        }
        Ok(())
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            project_id: String::new(),
            service_account_path: String::new(),
            api_base: default_api_base(),
            body: default_body(),
            event: default_event(),
            new: default_new(),
            benefit: default_benefit(),
        }
    }
}

fn default_api_base() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_body() -> String {
    "{{title}}".to_string()
}

fn default_event() -> PushKindConfig {
    PushKindConfig {
        title: "¡Se ha añadido un evento!".to_string(),
        topic: "events".to_string(),
    }
}

fn default_new() -> PushKindConfig {
    PushKindConfig {
        title: "¡Se ha añadido una noticia!".to_string(),
        topic: "news".to_string(),
    }
}

fn default_benefit() -> PushKindConfig {
    PushKindConfig {
        title: "¡Hay un nuevo beneficio para ti!".to_string(),
        topic: "benefits".to_string(),
    }
}
