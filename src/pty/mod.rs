//! Pseudoterminal (PTY) Transport
//!
//! Spawns the line-oriented remote-terminal client and exposes it as an
//! expect [`Transport`](crate::expect::Transport).

pub mod process;
pub mod streams;

pub use process::spawn_transport;
pub use streams::{PtyStreams, StreamStats};
