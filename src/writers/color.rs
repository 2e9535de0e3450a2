//! # ANSI colors for text output.
//!
//! [`AnsiColor`] wraps [`colored::Color`] and renders escape sequences
//! explicitly, so output depends only on the writer's `use_color` setting and
//! never on terminal detection.
//!
//! [`FlagTextColors`] maps flags to colors. Every [`TextWriter`](crate::TextWriter)
//! owns one, seeded with [`FlagTextColors::default`].

use std::collections::HashMap;
use std::fmt;

use colored::Color;

use crate::flags::Flag;

const ESCAPE_RESET: &str = "\x1b[0m";

/// Foreground color applied to a column of text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnsiColor(Color);

impl AnsiColor {
    pub const BLACK: AnsiColor = AnsiColor(Color::Black);
    pub const RED: AnsiColor = AnsiColor(Color::Red);
    pub const GREEN: AnsiColor = AnsiColor(Color::Green);
    pub const YELLOW: AnsiColor = AnsiColor(Color::Yellow);
    pub const BLUE: AnsiColor = AnsiColor(Color::Blue);
    pub const PURPLE: AnsiColor = AnsiColor(Color::Magenta);
    pub const CYAN: AnsiColor = AnsiColor(Color::Cyan);
    pub const WHITE: AnsiColor = AnsiColor(Color::White);
    pub const GRAY: AnsiColor = AnsiColor(Color::BrightBlack);
    pub const LIGHT_RED: AnsiColor = AnsiColor(Color::BrightRed);
    pub const LIGHT_BLUE: AnsiColor = AnsiColor(Color::BrightBlue);

    /// Wraps any [`colored::Color`], including true colors.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self(color)
    }

    /// Returns the wrapped color.
    #[inline]
    pub fn color(&self) -> Color {
        self.0
    }

    /// Returns the SGR parameters, e.g. `"31"` for red.
    pub fn code(&self) -> String {
        self.0.to_fg_str().into_owned()
    }

    /// Wraps `value` in this color's escape sequence followed by a reset.
    pub fn apply(&self, value: &str) -> String {
        format!("\x1b[{}m{value}{ESCAPE_RESET}", self.0.to_fg_str())
    }
}

impl From<Color> for AnsiColor {
    fn from(color: Color) -> Self {
        Self(color)
    }
}

impl fmt::Display for AnsiColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Color for an HTTP status code: 2xx green, 500 red, anything else yellow.
pub fn status_code_color(status_code: u16) -> AnsiColor {
    match status_code {
        200..=299 => AnsiColor::GREEN,
        500 => AnsiColor::RED,
        _ => AnsiColor::YELLOW,
    }
}

/// Renders a status code in its status color.
pub fn colorize_status_code(status_code: u16) -> String {
    status_code_color(status_code).apply(&status_code.to_string())
}

/// Renders `value` in the color of `status_code`.
pub fn colorize_by_status_code(status_code: u16, value: &str) -> String {
    status_code_color(status_code).apply(value)
}

/// Flag to color table with a fallback for unknown flags.
#[derive(Clone, Debug)]
pub struct FlagTextColors {
    colors: HashMap<Flag, AnsiColor>,
    fallback: AnsiColor,
}

impl FlagTextColors {
    /// Empty table; every flag resolves to `fallback`.
    #[must_use]
    pub fn with_fallback(fallback: AnsiColor) -> Self {
        Self {
            colors: HashMap::new(),
            fallback,
        }
    }

    /// Sets the color of one flag.
    pub fn set(&mut self, flag: impl Into<Flag>, color: AnsiColor) {
        self.colors.insert(flag.into(), color);
    }

    /// Resolves the color of `flag`.
    pub fn get(&self, flag: &Flag) -> AnsiColor {
        self.colors.get(flag).copied().unwrap_or(self.fallback)
    }
}

impl Default for FlagTextColors {
    fn default() -> Self {
        let mut colors = Self::with_fallback(AnsiColor::WHITE);
        colors.set(Flag::FATAL, AnsiColor::LIGHT_RED);
        colors.set(Flag::ERROR, AnsiColor::RED);
        colors.set(Flag::WARNING, AnsiColor::YELLOW);
        colors.set(Flag::INFO, AnsiColor::WHITE);
        colors.set(Flag::DEBUG, AnsiColor::PURPLE);
        colors.set(Flag::SILLY, AnsiColor::CYAN);
        colors.set(Flag::AUDIT, AnsiColor::WHITE);
        colors.set(Flag::HTTP_REQUEST, AnsiColor::GREEN);
        colors.set(Flag::HTTP_RESPONSE, AnsiColor::GREEN);
        colors.set(Flag::QUERY, AnsiColor::LIGHT_BLUE);
        colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_wraps_with_escape_and_reset() {
        assert_eq!(AnsiColor::RED.apply("boom"), "\x1b[31mboom\x1b[0m");
        assert_eq!(AnsiColor::GRAY.apply("t"), "\x1b[90mt\x1b[0m");
        assert_eq!(AnsiColor::BLUE.code(), "34");
    }

    #[test]
    fn test_status_code_colors() {
        assert_eq!(status_code_color(200), AnsiColor::GREEN);
        assert_eq!(status_code_color(204), AnsiColor::GREEN);
        assert_eq!(status_code_color(500), AnsiColor::RED);
        assert_eq!(status_code_color(404), AnsiColor::YELLOW);
        assert_eq!(status_code_color(302), AnsiColor::YELLOW);
        assert_eq!(colorize_status_code(200), "\x1b[32m200\x1b[0m");
    }

    #[test]
    fn test_flag_colors_fallback_and_override() {
        let mut colors = FlagTextColors::default();
        assert_eq!(colors.get(&Flag::ERROR), AnsiColor::RED);
        assert_eq!(colors.get(&Flag::new("ping")), AnsiColor::WHITE);

        colors.set("ping", AnsiColor::CYAN);
        assert_eq!(colors.get(&Flag::new("ping")), AnsiColor::CYAN);
    }
}
