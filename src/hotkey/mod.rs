//! Clipstack - Global hotkey module
//!
//! Watches raw key events and emits a reveal signal when the chord key is pressed
//! while the configured modifier is held. Never touches history or the clipboard.

pub mod source;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::engine::{Reveal, RevealSender};

pub use source::{ChannelKeySource, FixedPointer, KeyEventSource, KeyPoll, PointerSource};

/// How long a source may block before the cancellation token is rechecked
const SOURCE_POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// Modifier keys; left and right variants are not distinguished
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Alt,
    Ctrl,
    Shift,
    Super,
}

/// A key as reported by an event source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Modifier(Modifier),
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Press(Key),
    Release(Key),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HotkeyState {
    #[default]
    ModifierIdle,
    ModifierHeld,
}

/// Modifier + chord state machine
#[derive(Debug, Clone)]
pub struct HotkeyMachine {
    modifier: Modifier,
    chord: char,
    state: HotkeyState,
}

impl HotkeyMachine {
    pub fn new(modifier: Modifier, chord: char) -> Self {
        Self {
            modifier,
            chord: chord.to_ascii_lowercase(),
            state: HotkeyState::ModifierIdle,
        }
    }

    pub fn state(&self) -> HotkeyState {
        self.state
    }

    /// Feed one event; returns true when the hotkey fired
    pub fn handle(&mut self, event: KeyEvent) -> bool {
        match (self.state, event) {
            (_, KeyEvent::Press(Key::Modifier(m))) if m == self.modifier => {
                self.state = HotkeyState::ModifierHeld;
                false
            }
            (_, KeyEvent::Release(Key::Modifier(m))) if m == self.modifier => {
                self.state = HotkeyState::ModifierIdle;
                false
            }
            (HotkeyState::ModifierHeld, KeyEvent::Press(Key::Char(c))) => {
                c.to_ascii_lowercase() == self.chord
            }
            _ => false,
        }
    }
}

/// Hotkey listener
pub struct HotkeyListener<S, P> {
    machine: HotkeyMachine,
    source: S,
    pointer: P,
    reveals: RevealSender,
}

impl<S, P> HotkeyListener<S, P>
where
    S: KeyEventSource,
    P: PointerSource,
{
    pub fn new(settings: &Settings, source: S, pointer: P, reveals: RevealSender) -> Self {
        Self {
            machine: HotkeyMachine::new(settings.modifier_key, settings.chord_char()),
            source,
            pointer,
            reveals,
        }
    }

    /// Blocking event loop; returns when cancelled or when the source closes
    pub fn run(mut self, token: CancellationToken) {
        log::info!("[Hotkey] Listening for {:?}+{}", self.machine.modifier, self.machine.chord);

        while !token.is_cancelled() {
            match self.source.poll_event(SOURCE_POLL_TIMEOUT) {
                KeyPoll::Event(event) => {
                    if self.machine.handle(event) {
                        self.fire();
                    }
                }
                KeyPoll::Idle => {}
                KeyPoll::Closed => {
                    log::warn!("[Hotkey] Key event source closed");
                    break;
                }
            }
        }

        log::info!("[Hotkey] Listener stopped");
    }

    fn fire(&self) {
        let (x, y) = self.pointer.position().unwrap_or_else(|| {
            log::warn!("[Hotkey] Pointer position unavailable, revealing at origin");
            (0, 0)
        });
        log::info!("[Hotkey] Reveal requested at ({}, {})", x, y);
        self.reveals.send(Reveal { x, y });
    }
}
