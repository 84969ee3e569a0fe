use std::time::Duration;

use thiserror::Error;

/// Where a synthetic key event is injected into the OS input pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTap {
    /// Hardware-level tap, the primary location.
    Hid,
    /// Login-session tap.
    Session,
    /// Session tap after event annotation.
    AnnotatedSession,
}

/// Delays around a synthetic paste chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordTiming {
    /// Gap between modifier down, key down, key up and modifier up.
    pub between_events: Duration,
}

impl ChordTiming {
    pub fn from_millis(ms: u64) -> Self {
        Self {
            between_events: Duration::from_millis(ms),
        }
    }
}

#[derive(Debug, Error)]
pub enum KeyChordError {
    /// The synthetic event objects could not be built (no event source,
    /// input backend unavailable).
    #[error("failed to construct synthetic key event: {0}")]
    EventConstruction(String),

    #[error("event tap {0:?} not supported on this platform")]
    UnsupportedTap(EventTap),
}

/// Posts the platform's paste key chord (Cmd+V / Ctrl+V).
///
/// 发送平台粘贴快捷键的端口。
///
/// Success only means the events were posted; delivery cannot be observed.
/// Implementations may block for the chord's delays.
pub trait KeyChordPort: Send + Sync {
    fn post_paste_chord(&self, tap: EventTap, timing: ChordTiming) -> Result<(), KeyChordError>;
}

/// Paste through an automation/scripting facility.
pub trait ScriptPastePort: Send + Sync {
    /// Whether the accessibility/automation grant is present right now.
    fn has_permission(&self) -> bool;

    fn run_paste(&self) -> anyhow::Result<()>;
}

/// User-visible notice that content is staged and must be pasted by hand.
pub trait ManualPasteNotifierPort: Send + Sync {
    fn notify_manual_paste(&self, title: &str) -> anyhow::Result<()>;
}
