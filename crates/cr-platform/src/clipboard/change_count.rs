use std::sync::Mutex;

use cr_core::clipboard::ChangeCount;

/// Emulates a change counter from successive content fingerprints.
///
/// The counter advances whenever the fingerprint differs from the previous
/// reading. Writing the same content twice in a row is invisible to it.
#[derive(Debug, Default)]
pub struct FingerprintChangeCounter {
    state: Mutex<CounterState>,
}

#[derive(Debug, Default)]
struct CounterState {
    last: Option<[u8; 32]>,
    count: u64,
}

impl FingerprintChangeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, fingerprint: [u8; 32]) -> ChangeCount {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if state.last != Some(fingerprint) {
            if state.last.is_some() {
                state.count += 1;
            }
            state.last = Some(fingerprint);
        }
        ChangeCount(state.count)
    }
}
