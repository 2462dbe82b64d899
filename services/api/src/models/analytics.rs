//! Analytics event model

use serde::{Deserialize, Serialize};

/// Kind of event recorded against a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    View,
    Download,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::View => "view",
            EventKind::Download => "download",
        }
    }
}

/// Opaque request metadata captured alongside an event
#[derive(Debug, Clone, Default)]
pub struct EventMetadata {
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub ip: Option<String>,
}
