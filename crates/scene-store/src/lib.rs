//! MockReel Scene Store
//!
//! An in-memory, observable state container holding the ordered scene list,
//! the active edit target, and the global playback/export flags. Every action
//! is a whole-state functional update followed by a change notification;
//! there is no I/O and no locking. The store is used from a single thread.
//!
//! The recording orchestrator does not see the full store. It works through
//! the narrow [`SessionStore`] contract instead.

pub mod ingest;
pub mod session;
pub mod store;
pub mod storyboard;

pub use ingest::*;
pub use session::*;
pub use store::*;
pub use storyboard::*;
