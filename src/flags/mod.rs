//! Event flags and the flag set filter.
//!
//! ## Contents
//! - [`Flag`] category tag carried by every event
//! - [`FlagSet`] all/none policy plus per-flag overrides
//!
//! A dispatcher consults [`FlagSet::is_enabled`] before handing an event to
//! any worker; filtered events never reach a queue.

mod flag;
mod set;

pub use flag::Flag;
pub use set::FlagSet;
