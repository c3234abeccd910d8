//! horizons-expect - scripted client for the JPL Horizons telnet service
//!
//! This library automates the service's interactive, line-oriented menu
//! dialogue with expect/send steps and decodes the osculating orbital
//! element blocks it prints into typed records.
//!
//! ## Features
//!
//! - **Expect engine:** Regex patterns raced against a live byte stream under deadlines
//! - **Scripted dialogue:** Explicit state machine, timeouts attributed per state
//! - **Block parser:** Lazy, all-or-nothing records located field by field
//! - **PTY transport:** Spawns the telnet client via `portable-pty`
//! - **Configuration:** TOML or JSON files with built-in defaults
//!
//! ## Module Organization
//!
//! - [`expect`] - Patterns, the transport trait and the buffered expecter
//! - [`horizons`] - Protocol patterns, request, records, parser and session
//! - [`pty`] - Client spawning and PTY streams
//! - [`config`] - Configuration loading and defaults
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use horizons_expect::{fetch_orbital_elements, Config};
//!
//! # async fn example() -> horizons_expect::Result<()> {
//! let config = Config::default();
//! let request = config.request.request_for("DES=C/2012 S1;");
//! for record in fetch_orbital_elements(&config, &request).await? {
//!     println!("{} EC={}", record.julian_date, record.eccentricity);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod expect;
pub mod horizons;
pub mod pty;

// Re-exports for convenience
pub use config::{Config, ConfigLoader};
pub use error::{Error, Result};
pub use expect::{Expecter, Match, Pattern, Transport};
pub use horizons::{
    fetch_orbital_elements, ElementField, EphemerisRequest, OrbitalElementRecord,
    ReferencePlane, Session, SessionState,
};
