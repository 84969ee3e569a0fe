use serde::{Deserialize, Serialize};

/// Opaque value exposed by the clipboard facility that changes whenever the
/// clipboard contents change.
///
/// Only equality is meaningful. The watcher never inspects content to decide
/// whether a change happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeCount(pub u64);

impl std::fmt::Display for ChangeCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
