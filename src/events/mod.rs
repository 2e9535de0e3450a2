//! Events: the contract every logged value implements, plus built-in events.
//!
//! ## Contents
//! - [`Event`], [`EventRef`] flag + timestamp contract with capability probes
//! - [`TextWritable`], [`FlagTextColorProvider`] optional rendering capabilities
//! - [`MessageEvent`], [`ErrorEvent`] ready-made events
//!
//! Events travel through worker queues as [`EventRef`] (`Arc<dyn Event>`), so a
//! single event fanned out to several listeners is never cloned.

mod event;
mod message;

pub use event::{Event, EventRef, FlagTextColorProvider, TextWritable};
pub use message::{ErrorEvent, MessageEvent};
