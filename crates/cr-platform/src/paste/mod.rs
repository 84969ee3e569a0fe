mod key_chord;
mod notifier;
mod script;

pub use key_chord::SystemKeyChord;
pub use notifier::{manual_paste_message, SystemNotifier};
pub use script::SystemScriptPaste;
