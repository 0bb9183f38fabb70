//! Locomotive function slots.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// DCC function number (F0 to F127).
pub type FunctionNumber = u8;

/// Highest function number a decoder slot can carry.
pub const MAX_FUNCTION_NUMBER: FunctionNumber = 127;

/// Duration sentinel for functions that are not timed.
pub const NO_DURATION: &str = "0";

/// How the throttle button for a function behaves.
///
/// Stored as an integer code. Codes this crate does not know are kept in
/// [`ButtonKind::Other`] so they are written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ButtonKind {
    /// Latching on/off switch (code 0).
    #[default]
    Momentary,
    /// Active only while pressed (code 1).
    PushButton,
    /// Active for a fixed duration after a press (code 2).
    Timed,
    /// A code outside the known range.
    Other(i64),
}

impl ButtonKind {
    /// Maps a stored code to a kind.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ButtonKind::Momentary,
            1 => ButtonKind::PushButton,
            2 => ButtonKind::Timed,
            other => ButtonKind::Other(other),
        }
    }

    /// Returns the stored code.
    pub fn code(&self) -> i64 {
        match self {
            ButtonKind::Momentary => 0,
            ButtonKind::PushButton => 1,
            ButtonKind::Timed => 2,
            ButtonKind::Other(code) => *code,
        }
    }

    /// Returns the label shown by the Z21 app.
    pub fn name(&self) -> &'static str {
        match self {
            ButtonKind::Momentary => "switch",
            ButtonKind::PushButton => "push-button",
            ButtonKind::Timed => "time button",
            ButtonKind::Other(_) => "unknown",
        }
    }
}

impl fmt::Display for ButtonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonKind::Other(code) => write!(f, "unknown({})", code),
            kind => f.write_str(kind.name()),
        }
    }
}

impl FromStr for ButtonKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "switch" | "momentary" => Ok(ButtonKind::Momentary),
            "push-button" | "push" | "pushbutton" => Ok(ButtonKind::PushButton),
            "time button" | "time" | "timed" => Ok(ButtonKind::Timed),
            other => other
                .parse::<i64>()
                .map(ButtonKind::from_code)
                .map_err(|_| Error::invalid_value("button kind", s)),
        }
    }
}

/// Detailed configuration of one function slot.
///
/// The function number is fixed at construction; use
/// [`Locomotive::renumber_function`](super::Locomotive::renumber_function)
/// to move a function to another slot.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    number: FunctionNumber,
    /// Icon name, may be empty.
    pub image_name: String,
    /// Shortcut label, may be empty.
    pub shortcut: String,
    /// Display and edit order. Ties are broken by function number.
    pub position: i64,
    /// Timed duration in seconds as a decimal string. `"0"` means not timed.
    pub duration: String,
    /// Button behaviour.
    pub button: ButtonKind,
    /// Whether the function is enabled.
    pub active: bool,
}

impl FunctionInfo {
    /// Creates an active, momentary function with no icon.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFunctionNumber`] if `number` is above 127.
    pub fn new(number: FunctionNumber) -> Result<Self> {
        validate_number(number as u32)?;
        Ok(Self::unchecked(number))
    }

    /// Creates a function without range validation. Used for stored data.
    pub(crate) fn unchecked(number: FunctionNumber) -> Self {
        Self {
            number,
            image_name: String::new(),
            shortcut: String::new(),
            position: 0,
            duration: NO_DURATION.to_string(),
            button: ButtonKind::Momentary,
            active: true,
        }
    }

    /// Returns the function number.
    pub fn number(&self) -> FunctionNumber {
        self.number
    }

    pub(crate) fn set_number(&mut self, number: FunctionNumber) {
        self.number = number;
    }

    /// Sets the icon name.
    pub fn with_image(mut self, image_name: impl Into<String>) -> Self {
        self.image_name = image_name.into();
        self
    }

    /// Sets the shortcut label.
    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = shortcut.into();
        self
    }

    /// Sets the ordering position.
    pub fn with_position(mut self, position: i64) -> Self {
        self.position = position;
        self
    }

    /// Sets the button kind, see [`set_button`](Self::set_button).
    pub fn with_button(mut self, kind: ButtonKind) -> Self {
        self.set_button(kind);
        self
    }

    /// Changes the button kind.
    ///
    /// Any kind other than [`ButtonKind::Timed`] clears the duration back to
    /// the `"0"` sentinel. Switching to timed keeps the current duration.
    pub fn set_button(&mut self, kind: ButtonKind) {
        self.button = kind;
        if kind != ButtonKind::Timed {
            self.duration = NO_DURATION.to_string();
        }
    }

    /// Makes this a timed function running for `seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for negative or non-finite durations.
    pub fn set_timed(&mut self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Error::invalid_value("duration", seconds.to_string()));
        }
        self.button = ButtonKind::Timed;
        self.duration = format_duration(seconds);
        Ok(())
    }

    /// Returns whether this function has a non-zero duration.
    pub fn is_timed(&self) -> bool {
        self.duration_secs().is_some_and(|secs| secs != 0.0)
    }

    /// Parses the duration, `None` if it is not a number.
    pub fn duration_secs(&self) -> Option<f64> {
        let trimmed = self.duration.trim();
        if trimmed.is_empty() {
            return Some(0.0);
        }
        trimmed.parse().ok()
    }
}

impl fmt::Display for FunctionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{} [{}] {}", self.number, self.button, self.image_name)?;
        if !self.shortcut.is_empty() {
            write!(f, " ({})", self.shortcut)?;
        }
        if self.is_timed() {
            write!(f, " {}s", self.duration)?;
        }
        Ok(())
    }
}

/// Formats a duration the way the Z21 app stores it: always with a decimal
/// point (`3.0`, `2.5`).
pub(crate) fn format_duration(seconds: f64) -> String {
    format!("{:?}", seconds)
}

pub(crate) fn validate_number(number: u32) -> Result<FunctionNumber> {
    if number > MAX_FUNCTION_NUMBER as u32 {
        return Err(Error::InvalidFunctionNumber { number });
    }
    Ok(number as FunctionNumber)
}
