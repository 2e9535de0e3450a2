//! # FlagSet: category filter with set/override semantics.
//!
//! A [`FlagSet`] combines a default policy (the `all` and `none` bits) with
//! explicit per-flag overrides.
//!
//! ## Resolution order
//! ```text
//! is_enabled(flag)
//!     │
//!     ├─ none bit set ──────────────► false   (absolute)
//!     ├─ all bit set
//!     │     ├─ explicit false entry ► false
//!     │     └─ otherwise ───────────► true
//!     └─ per-flag entry ────────────► entry value (absent → false)
//! ```
//!
//! ## Textual form
//! The CSV grammar is case-insensitive and trims whitespace around tokens:
//! - `all` / `none` set the corresponding bit;
//! - `-name` disables `name`;
//! - any other token enables it.
//!
//! [`Display`](std::fmt::Display) writes the canonical form, which parses back
//! into a set with the same filtering behavior:
//! ```rust
//! use fanlog::{Flag, FlagSet};
//!
//! let set: FlagSet = "ALL, -Error".parse().unwrap();
//! assert!(!set.is_enabled(&Flag::ERROR));
//! assert!(set.is_enabled(&Flag::INFO));
//! assert_eq!(set.to_string(), "all, -error");
//! ```

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::Flag;

/// Token separator used by [`FlagSet`]'s canonical textual form.
const SEPARATOR: &str = ", ";

/// Filter combining an `all`/`none` default policy with per-flag overrides.
///
/// ### Invariants
/// - Explicit per-flag entries take precedence over the `all` bit.
/// - The `none` bit overrides everything, including explicit entries.
/// - `all` and `none` may both be set; `none` wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: BTreeMap<Flag, bool>,
    all: bool,
    none: bool,
}

impl FlagSet {
    /// Creates a set with the given flags enabled.
    #[must_use]
    pub fn new<I>(flags: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Flag>,
    {
        let mut set = Self::default();
        for flag in flags {
            set.enable(flag);
        }
        set
    }

    /// Creates a set with the `all` bit flipped on.
    #[must_use]
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    /// Creates a set with the `none` bit flipped on.
    #[must_use]
    pub fn none() -> Self {
        Self {
            none: true,
            ..Self::default()
        }
    }

    /// Default verbosity: `fatal`, `error` and `info`.
    #[must_use]
    pub fn default_flags() -> Self {
        Self::new([Flag::FATAL, Flag::ERROR, Flag::INFO])
    }

    /// Parses a case-insensitive comma separated token list.
    ///
    /// Unknown tokens are accepted verbatim; empty tokens are skipped.
    #[must_use]
    pub fn from_csv(csv: &str) -> Self {
        let mut set = Self::default();
        for token in csv.split(',') {
            let token = token.trim().to_lowercase();
            if token.is_empty() {
                continue;
            }
            if token == Flag::ALL.as_str() {
                set.all = true;
                continue;
            }
            if token == Flag::NONE.as_str() {
                set.none = true;
                continue;
            }
            match token.strip_prefix('-') {
                Some("") => {}
                Some(name) => {
                    set.flags.insert(Flag::from(name.to_string()), false);
                }
                None => {
                    set.flags.insert(Flag::from(token), true);
                }
            }
        }
        set
    }

    /// Enables a flag and clears the `none` bit.
    ///
    /// The `all` bit is left untouched.
    pub fn enable(&mut self, flag: impl Into<Flag>) {
        self.none = false;
        self.flags.insert(flag.into(), true);
    }

    /// Disables a flag.
    ///
    /// Acts as an explicit override even when the `all` bit is set.
    pub fn disable(&mut self, flag: impl Into<Flag>) {
        self.flags.insert(flag.into(), false);
    }

    /// Flips the `all` bit on (and `none` off). Per-flag entries are kept.
    pub fn set_all(&mut self) {
        self.all = true;
        self.none = false;
    }

    /// Flips the `none` bit on (and `all` off), discarding every per-flag entry.
    pub fn set_none(&mut self) {
        self.all = false;
        self.none = true;
        self.flags.clear();
    }

    /// True if the `all` bit is set.
    #[inline]
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// True if the `none` bit is set.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.none
    }

    /// Returns whether events carrying `flag` pass the filter.
    pub fn is_enabled(&self, flag: &Flag) -> bool {
        if self.none {
            return false;
        }
        let explicit = self.flags.get(flag).copied();
        if self.all {
            return explicit != Some(false);
        }
        explicit.unwrap_or(false)
    }

    /// Merges `other` into `self`, with `other` taking precedence.
    ///
    /// - `other.all` / `other.none` can only set the bits here, never clear them.
    /// - Every per-flag entry of `other` overwrites the entry here.
    pub fn coalesce_with(&mut self, other: &FlagSet) {
        if other.all {
            self.all = true;
        }
        if other.none {
            self.none = true;
        }
        for (flag, enabled) in &other.flags {
            self.flags.insert(flag.clone(), *enabled);
        }
    }

    /// Iterates over the explicit per-flag entries in flag order.
    pub fn entries(&self) -> impl Iterator<Item = (&Flag, bool)> {
        self.flags.iter().map(|(flag, enabled)| (flag, *enabled))
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.none {
            return f.write_str(Flag::NONE.as_str());
        }

        let mut tokens: Vec<String> = Vec::with_capacity(self.flags.len() + 1);
        if self.all {
            tokens.push(Flag::ALL.to_string());
        }
        for (flag, enabled) in self.flags.iter().filter(|(flag, _)| !flag.is_sentinel()) {
            match (*enabled, self.all) {
                (false, _) => tokens.push(format!("-{flag}")),
                (true, false) => tokens.push(flag.to_string()),
                (true, true) => {}
            }
        }
        f.write_str(&tokens.join(SEPARATOR))
    }
}

impl FromStr for FlagSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FlagSet::from_csv(s))
    }
}

impl<F: Into<Flag>> FromIterator<F> for FlagSet {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        FlagSet::new(iter)
    }
}
