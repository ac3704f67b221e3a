//! Reload message protocol.
//!
//! Messages are JSON objects tagged by `type`:
//!
//! - `full-reload`: discard client state and reload the page

use serde::{Deserialize, Serialize};

/// Message sent to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ReloadMessage {
    /// Full page reload.
    FullReload,
}

impl ReloadMessage {
    pub fn full_reload() -> Self {
        Self::FullReload
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"full-reload"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

/// Destination for reload messages, provided by the host.
pub trait ReloadSink {
    fn send(&mut self, message: &ReloadMessage);
}

impl ReloadSink for Vec<ReloadMessage> {
    fn send(&mut self, message: &ReloadMessage) {
        self.push(message.clone());
    }
}

impl ReloadSink for std::sync::mpsc::Sender<ReloadMessage> {
    fn send(&mut self, message: &ReloadMessage) {
        // Receiver gone means no client is listening.
        let _ = std::sync::mpsc::Sender::send(self, message.clone());
    }
}
