use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clipboard::{CapturePolicy, ClipFormat};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Capacity of the history. Changes apply on the next insertion.
    pub max_history_size: usize,
    pub poll_interval_ms: u64,
    /// Foreground application identifiers whose clipboard changes are ignored.
    pub excluded_application_identifiers: BTreeSet<String>,
    /// Formats captured at all.
    pub store_types: Vec<ClipFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Menu titles longer than this are truncated. Display only.
    pub max_menu_item_title_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasteSettings {
    /// Pause between two injection strategies.
    pub inter_strategy_delay_ms: u64,
    /// Pause after staging the clipboard, before the first strategy.
    pub settle_delay_ms: u64,
    /// Gap between synthetic key events for the standard chord.
    pub standard_chord_delay_ms: u64,
    /// Gap between synthetic key events for timing-sensitive targets.
    pub slow_chord_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration.
    pub schema_version: u32,

    #[serde(default)]
    pub history: HistorySettings,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub paste: PasteSettings,
}

impl HistorySettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn capture_policy(&self) -> CapturePolicy {
        CapturePolicy::with_store_types(self.store_types.clone())
    }
}
