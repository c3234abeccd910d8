//! Horizons ephemeris client
//!
//! The scripted dialogue with the JPL Horizons telnet service and the
//! parser for the osculating element blocks it prints.

pub mod parser;
pub mod protocol;
pub mod record;
pub mod request;
pub mod session;

pub use parser::{parse_blocks, BlockParser};
pub use protocol::Protocol;
pub use record::{ElementField, OrbitalElementRecord, RecordBuilder};
pub use request::{EphemerisRequest, ReferencePlane, RequestError};
pub use session::{LookupOutcome, Session, SessionState};

use crate::config::Config;
use crate::error::Result;
use crate::pty::spawn_transport;

/// Connect with the configured client and fetch the elements for `request`.
///
/// One client process per call; it is torn down when the call returns.
pub async fn fetch_orbital_elements(
    config: &Config,
    request: &EphemerisRequest,
) -> Result<Vec<OrbitalElementRecord>> {
    request.validate()?;
    let transport = spawn_transport(&config.transport)?;
    Session::new(transport, config.session.clone())?
        .run(request)
        .await
}
