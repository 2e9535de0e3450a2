//! # Event category tags.
//!
//! A [`Flag`] is an opaque, comparable tag attached to every event. It drives
//! both filtering (via [`FlagSet`](crate::FlagSet)) and display (the bracketed
//! column in text output).
//!
//! Two tags are reserved: [`Flag::ALL`] and [`Flag::NONE`]. They are sentinels
//! understood by the flag set parser and are never rendered as per-flag tokens.

use std::borrow::Cow;
use std::fmt;

/// Category tag attached to an event.
///
/// Cheap to clone for the well-known constants (borrowed `'static` text);
/// owned for tags parsed at runtime.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Flag(Cow<'static, str>);

impl Flag {
    /// Sentinel: matches every flag.
    pub const ALL: Flag = Flag::from_static("all");
    /// Sentinel: matches no flag.
    pub const NONE: Flag = Flag::from_static("none");

    pub const FATAL: Flag = Flag::from_static("fatal");
    pub const ERROR: Flag = Flag::from_static("error");
    pub const WARNING: Flag = Flag::from_static("warning");
    pub const INFO: Flag = Flag::from_static("info");
    pub const DEBUG: Flag = Flag::from_static("debug");
    pub const SILLY: Flag = Flag::from_static("silly");
    pub const AUDIT: Flag = Flag::from_static("audit");
    pub const HTTP_REQUEST: Flag = Flag::from_static("http.request");
    pub const HTTP_RESPONSE: Flag = Flag::from_static("http.response");
    pub const QUERY: Flag = Flag::from_static("query");

    /// Creates a flag from any string.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Creates a flag from static text (usable in `const` context).
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the tag text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for [`Flag::ALL`] and [`Flag::NONE`].
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        *self == Flag::ALL || *self == Flag::NONE
    }

    /// True for flags routed to a writer's error output (`fatal`, `error`).
    #[inline]
    pub fn is_error(&self) -> bool {
        *self == Flag::FATAL || *self == Flag::ERROR
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Flag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Flag {
    fn from(value: &'static str) -> Self {
        Flag::from_static(value)
    }
}

impl From<String> for Flag {
    fn from(value: String) -> Self {
        Flag(Cow::Owned(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_and_static_flags_compare_equal() {
        assert_eq!(Flag::from(String::from("info")), Flag::INFO);
        assert_eq!(Flag::new("http.request"), Flag::HTTP_REQUEST);
    }

    #[test]
    fn test_sentinels() {
        assert!(Flag::ALL.is_sentinel());
        assert!(Flag::NONE.is_sentinel());
        assert!(!Flag::INFO.is_sentinel());
    }

    #[test]
    fn test_error_flags() {
        assert!(Flag::FATAL.is_error());
        assert!(Flag::ERROR.is_error());
        assert!(!Flag::WARNING.is_error());
        assert_eq!(Flag::new("ping").to_string(), "ping");
    }
}
