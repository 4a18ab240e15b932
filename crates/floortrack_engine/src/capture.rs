//! Input capture.
//!
//! Two kinds of source feed the processor: a raw keystroke-emitting device
//! (handheld/Wi-Fi scanner acting as a keyboard wedge) and a structured
//! text field (manual search box, camera decode callback). Both implement
//! [`InputSource`]; callers route events by capability instead of
//! inspecting UI focus at runtime.
//!
//! There is one logical raw-device listener per running session, not one
//! per view.

/// Minimum buffered length for a raw-device submission. Shorter bursts are
/// treated as key-chatter noise and discarded.
pub const MIN_SCAN_LEN: usize = 3;

/// What a source consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// One keystroke from the ambient stream.
    Key(char),
    /// The designated end-of-scan character (Enter on keyboard wedges).
    Terminator,
    /// A whole string submitted by a structured field.
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCapability {
    /// Emits individual keystrokes terminated by a designated character.
    RawDevice,
    /// Emits complete strings.
    StructuredField,
}

/// A stream of input events that occasionally yields a submitted identifier.
pub trait InputSource {
    fn capability(&self) -> InputCapability;

    /// Feed one event; returns a raw identifier when a submission completes.
    fn push(&mut self, event: InputEvent) -> Option<String>;
}

/// Accumulates a raw character stream into discrete submissions.
#[derive(Debug)]
pub struct RawDeviceSource {
    buffer: String,
    min_len: usize,
    suppressed: bool,
}

impl Default for RawDeviceSource {
    fn default() -> Self {
        Self::new(MIN_SCAN_LEN)
    }
}

impl RawDeviceSource {
    pub fn new(min_len: usize) -> Self {
        Self {
            buffer: String::new(),
            min_len,
            suppressed: false,
        }
    }

    /// While an editable text control has focus, keystrokes belong to the
    /// host input handling and are not captured.
    pub fn set_suppressed(&mut self, suppressed: bool) {
        if suppressed {
            self.buffer.clear();
        }
        self.suppressed = suppressed;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }
}

impl InputSource for RawDeviceSource {
    fn capability(&self) -> InputCapability {
        InputCapability::RawDevice
    }

    fn push(&mut self, event: InputEvent) -> Option<String> {
        if self.suppressed {
            return None;
        }
        match event {
            InputEvent::Key(ch) => {
                if !ch.is_control() {
                    self.buffer.push(ch);
                }
                None
            }
            InputEvent::Terminator => {
                let buffered = std::mem::take(&mut self.buffer);
                if buffered.len() >= self.min_len {
                    Some(buffered)
                } else {
                    // noise guard: short bursts are dropped with the buffer
                    None
                }
            }
            // raw devices do not emit whole strings
            InputEvent::Text(_) => None,
        }
    }
}

/// Pass-through for manual entry and camera decode results.
#[derive(Debug, Default)]
pub struct ManualFieldSource;

impl InputSource for ManualFieldSource {
    fn capability(&self) -> InputCapability {
        InputCapability::StructuredField
    }

    fn push(&mut self, event: InputEvent) -> Option<String> {
        match event {
            InputEvent::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(text.to_string())
                }
            }
            InputEvent::Key(_) | InputEvent::Terminator => None,
        }
    }
}
