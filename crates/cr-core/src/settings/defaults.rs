use std::collections::BTreeSet;

use super::model::*;
use crate::clipboard::ClipFormat;

#[cfg(not(feature = "large-history"))]
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 20;
#[cfg(feature = "large-history")]
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 200;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_MAX_MENU_ITEM_TITLE_LENGTH: usize = 50;

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            excluded_application_identifiers: BTreeSet::new(),
            store_types: ClipFormat::ALL.to_vec(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_menu_item_title_length: DEFAULT_MAX_MENU_ITEM_TITLE_LENGTH,
        }
    }
}

impl Default for PasteSettings {
    fn default() -> Self {
        Self {
            inter_strategy_delay_ms: 50,
            settle_delay_ms: 50,
            standard_chord_delay_ms: 10,
            slow_chord_delay_ms: 120,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            history: HistorySettings::default(),
            display: DisplaySettings::default(),
            paste: PasteSettings::default(),
        }
    }
}
