use serde::{Deserialize, Serialize};

/// Notifications broadcast to external collaborators.
///
/// 向外部协作者（UI 层）广播的通知。
///
/// `HistoryChanged` carries no payload: consumers re-query the record list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreEvent {
    HistoryChanged,
    SnippetsChanged,
    /// Every injection strategy was exhausted; content is staged on the
    /// clipboard and must be pasted by hand.
    ManualPasteRequired { title: String },
}
