//! Event vocabulary shared by the stockroom domain crates.

pub mod event;

pub use event::{Event, occurred_since};
