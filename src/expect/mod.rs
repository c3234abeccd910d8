//! Expect/Send Automation Primitives
//!
//! A transport-agnostic expect engine: named regex patterns, a byte
//! transport trait and the buffered expecter that races patterns against
//! the incoming stream under a deadline.

pub mod expecter;
pub mod pattern;
pub mod transport;

pub use expecter::{Expecter, DEFAULT_MAX_BUFFER_BYTES};
pub use pattern::{Match, Pattern};
pub use transport::Transport;
