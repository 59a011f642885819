//! Clipstack - Key event and pointer sources
//!
//! OS hooks sit behind the `os-input` feature; everything else is plain channels.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use super::KeyEvent;

/// Result of waiting for the next key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPoll {
    Event(KeyEvent),
    /// Nothing arrived within the timeout
    Idle,
    /// The source will never produce another event
    Closed,
}

/// Producer of global key events
pub trait KeyEventSource: Send {
    /// Wait up to `timeout` for the next event
    fn poll_event(&mut self, timeout: Duration) -> KeyPoll;
}

/// Current pointer position in screen coordinates
pub trait PointerSource: Send {
    fn position(&self) -> Option<(i32, i32)>;
}

/// Key events delivered over a std channel
pub struct ChannelKeySource {
    rx: Receiver<KeyEvent>,
}

impl ChannelKeySource {
    pub fn new(rx: Receiver<KeyEvent>) -> Self {
        Self { rx }
    }
}

impl KeyEventSource for ChannelKeySource {
    fn poll_event(&mut self, timeout: Duration) -> KeyPoll {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => KeyPoll::Event(event),
            Err(RecvTimeoutError::Timeout) => KeyPoll::Idle,
            Err(RecvTimeoutError::Disconnected) => KeyPoll::Closed,
        }
    }
}

/// Pointer that always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedPointer(pub Option<(i32, i32)>);

impl PointerSource for FixedPointer {
    fn position(&self) -> Option<(i32, i32)> {
        self.0
    }
}

#[cfg(feature = "os-input")]
pub mod os {
    //! Global keyboard hook (`rdev`) and pointer query (`mouse_position`)

    use std::sync::mpsc;
    use std::thread;

    use mouse_position::mouse_position::Mouse;
    use rdev::{EventType, Key as RdevKey};

    use super::{ChannelKeySource, PointerSource};
    use crate::hotkey::{Key, KeyEvent, Modifier};

    /// Start the global keyboard hook on its own thread
    ///
    /// The hook cannot be stopped once installed; it lives until process exit.
    pub fn spawn_key_source() -> ChannelKeySource {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("clipstack-keyhook".into())
            .spawn(move || {
                let result = rdev::listen(move |event| {
                    let mapped = match event.event_type {
                        EventType::KeyPress(key) => Some(KeyEvent::Press(map_key(key, event.name.as_deref()))),
                        EventType::KeyRelease(key) => Some(KeyEvent::Release(map_key(key, None))),
                        _ => None,
                    };
                    if let Some(mapped) = mapped {
                        let _ = tx.send(mapped);
                    }
                });
                if let Err(e) = result {
                    log::error!("[Hotkey] Global key hook failed: {:?}", e);
                }
            });
        if let Err(e) = spawned {
            log::error!("[Hotkey] Failed to spawn key hook thread: {}", e);
        }
        ChannelKeySource::new(rx)
    }

    fn map_key(key: RdevKey, name: Option<&str>) -> Key {
        match key {
            RdevKey::Alt | RdevKey::AltGr => Key::Modifier(Modifier::Alt),
            RdevKey::ControlLeft | RdevKey::ControlRight => Key::Modifier(Modifier::Ctrl),
            RdevKey::ShiftLeft | RdevKey::ShiftRight => Key::Modifier(Modifier::Shift),
            RdevKey::MetaLeft | RdevKey::MetaRight => Key::Modifier(Modifier::Super),
            _ => physical_char(key)
                .or_else(|| single_char(name.unwrap_or_default()))
                .map(Key::Char)
                .unwrap_or(Key::Other),
        }
    }

    // Held modifiers change `event.name` (Alt+y may arrive as "¥" or nothing),
    // so letter and digit keys are mapped from the key code.
    fn physical_char(key: RdevKey) -> Option<char> {
        let code = format!("{:?}", key);
        code.strip_prefix("Key")
            .or_else(|| code.strip_prefix("Num"))
            .and_then(single_char)
            .map(|c| c.to_ascii_lowercase())
    }

    fn single_char(s: &str) -> Option<char> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }

    /// Pointer position from the OS
    #[derive(Debug, Default, Clone, Copy)]
    pub struct SystemPointer;

    impl PointerSource for SystemPointer {
        fn position(&self) -> Option<(i32, i32)> {
            match Mouse::get_mouse_position() {
                Mouse::Position { x, y } => Some((x, y)),
                Mouse::Error => None,
            }
        }
    }
}
