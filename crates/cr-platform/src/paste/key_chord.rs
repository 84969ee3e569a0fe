//! Synthetic paste chord: Cmd+V through Core Graphics on macOS, Ctrl+V
//! through enigo elsewhere.

use cr_core::ports::{ChordTiming, EventTap, KeyChordError, KeyChordPort};
use tracing::debug;

#[cfg(target_os = "macos")]
pub use self::macos::CoreGraphicsKeyChord as SystemKeyChord;
#[cfg(not(target_os = "macos"))]
pub use self::enigo_chord::EnigoKeyChord as SystemKeyChord;

#[cfg(target_os = "macos")]
mod macos {
    use super::*;
    use core_graphics::event::{CGEvent, CGEventFlags, CGEventTapLocation, CGKeyCode};
    use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
    use std::thread;

    const K_VK_ANSI_V: CGKeyCode = 0x09;
    const K_VK_COMMAND: CGKeyCode = 0x37;

    #[derive(Default)]
    pub struct CoreGraphicsKeyChord;

    impl CoreGraphicsKeyChord {
        pub fn new() -> Self {
            Self
        }
    }

    fn location(tap: EventTap) -> CGEventTapLocation {
        match tap {
            EventTap::Hid => CGEventTapLocation::HID,
            EventTap::Session => CGEventTapLocation::Session,
            EventTap::AnnotatedSession => CGEventTapLocation::AnnotatedSession,
        }
    }

    fn key_event(
        source: &CGEventSource,
        key: CGKeyCode,
        down: bool,
        flags: CGEventFlags,
    ) -> Result<CGEvent, KeyChordError> {
        let event = CGEvent::new_keyboard_event(source.clone(), key, down).map_err(|_| {
            KeyChordError::EventConstruction(format!("keyboard event {key:#x} down={down}"))
        })?;
        event.set_flags(flags);
        Ok(event)
    }

    impl KeyChordPort for CoreGraphicsKeyChord {
        fn post_paste_chord(
            &self,
            tap: EventTap,
            timing: ChordTiming,
        ) -> Result<(), KeyChordError> {
            let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
                .map_err(|_| KeyChordError::EventConstruction("CGEventSource".to_string()))?;

            let command = CGEventFlags::CGEventFlagCommand;
            // All four events are built before any is posted, so a
            // construction failure never leaves Command held down.
            let events = [
                key_event(&source, K_VK_COMMAND, true, command)?,
                key_event(&source, K_VK_ANSI_V, true, command)?,
                key_event(&source, K_VK_ANSI_V, false, command)?,
                key_event(&source, K_VK_COMMAND, false, CGEventFlags::CGEventFlagNull)?,
            ];

            let location = location(tap);
            for (i, event) in events.iter().enumerate() {
                if i > 0 {
                    thread::sleep(timing.between_events);
                }
                event.post(location);
            }
            debug!(?tap, "Posted Cmd+V chord");
            Ok(())
        }
    }
}

#[cfg(not(target_os = "macos"))]
mod enigo_chord {
    use super::*;
    use enigo::{Direction, Enigo, Key, Keyboard, Settings};
    use std::thread;

    /// enigo has one injection path, so only [`EventTap::Hid`] is supported.
    #[derive(Default)]
    pub struct EnigoKeyChord;

    impl EnigoKeyChord {
        pub fn new() -> Self {
            Self
        }
    }

    impl KeyChordPort for EnigoKeyChord {
        fn post_paste_chord(
            &self,
            tap: EventTap,
            timing: ChordTiming,
        ) -> Result<(), KeyChordError> {
            if tap != EventTap::Hid {
                return Err(KeyChordError::UnsupportedTap(tap));
            }

            let mut enigo = Enigo::new(&Settings::default())
                .map_err(|e| KeyChordError::EventConstruction(e.to_string()))?;
            let input_err = |e: enigo::InputError| KeyChordError::EventConstruction(e.to_string());

            enigo
                .key(Key::Control, Direction::Press)
                .map_err(input_err)?;
            thread::sleep(timing.between_events);
            let clicked = enigo.key(Key::Unicode('v'), Direction::Click);
            thread::sleep(timing.between_events);
            // Release the modifier even if the click failed.
            enigo
                .key(Key::Control, Direction::Release)
                .map_err(input_err)?;
            clicked.map_err(input_err)?;

            debug!(?tap, "Posted Ctrl+V chord");
            Ok(())
        }
    }
}
