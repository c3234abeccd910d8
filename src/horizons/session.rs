//! Horizons Session Automaton
//!
//! Drives one ephemeris request through the service's menu dialogue. The
//! dialogue is a fixed chain of "wait for prompt, send answer" steps; each
//! step is one [`SessionState`] with its own transition, so a timeout can
//! always be attributed to the state that was waiting.

use std::fmt;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::parser::BlockParser;
use super::protocol::Protocol;
use super::record::OrbitalElementRecord;
use super::request::EphemerisRequest;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::expect::{Expecter, Pattern, Transport};

/// Position in the scripted dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the first `Horizons>` prompt
    AwaitBanner,
    /// Paging disabled, waiting for the prompt to send the designation
    PagingOff,
    /// Designation sent; either a disambiguation prompt or the body's menu follows
    Lookup,
    /// Main menu; `prompt_seen` when the lookup race already consumed it
    SelectMode { prompt_seen: bool },
    SelectSubMode,
    SetCenter,
    SetReferencePlane,
    SetStart,
    SetEnd,
    SetInterval,
    ConfirmDefaults,
    AwaitDataStart,
    /// Delegated to [`BlockParser`]
    ParsingBlocks,
    AwaitMenuReturn,
    Quit,
    Done,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::AwaitBanner => "AwaitBanner",
            SessionState::PagingOff => "PagingOff",
            SessionState::Lookup => "Lookup",
            SessionState::SelectMode { .. } => "SelectMode",
            SessionState::SelectSubMode => "SelectSubMode",
            SessionState::SetCenter => "SetCenter",
            SessionState::SetReferencePlane => "SetReferencePlane",
            SessionState::SetStart => "SetStart",
            SessionState::SetEnd => "SetEnd",
            SessionState::SetInterval => "SetInterval",
            SessionState::ConfirmDefaults => "ConfirmDefaults",
            SessionState::AwaitDataStart => "AwaitDataStart",
            SessionState::ParsingBlocks => "ParsingBlocks",
            SessionState::AwaitMenuReturn => "AwaitMenuReturn",
            SessionState::Quit => "Quit",
            SessionState::Done => "Done",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the lookup race was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The service asked to confirm the search results; `y` was sent
    Confirmed,
    /// The body resolved without disambiguation
    AlreadyResolved,
}

/// One scripted conversation over an exclusively owned transport.
///
/// [`Session::run`] consumes the session, so it yields at most one result.
pub struct Session<T: Transport> {
    expecter: Expecter<T>,
    protocol: &'static Protocol,
    config: SessionConfig,
    state: SessionState,
    records: Vec<OrbitalElementRecord>,
    lookup: Option<LookupOutcome>,
    quit_sent: bool,
}

impl<T: Transport> Session<T> {
    /// Wrap a freshly connected transport
    pub fn new(transport: T, config: SessionConfig) -> Result<Self> {
        let expecter = Expecter::new(transport).with_max_buffer(config.max_buffer_bytes);
        Ok(Self {
            expecter,
            protocol: Protocol::shared()?,
            config,
            state: SessionState::AwaitBanner,
            records: Vec::new(),
            lookup: None,
            quit_sent: false,
        })
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Outcome of the lookup race, once decided
    pub fn lookup_outcome(&self) -> Option<LookupOutcome> {
        self.lookup
    }

    /// Run the whole dialogue and return the records in stream order.
    ///
    /// The quit command is attempted exactly once whatever the outcome; a
    /// failure to send it is logged and never replaces the result.
    pub async fn run(mut self, request: &EphemerisRequest) -> Result<Vec<OrbitalElementRecord>> {
        let outcome = match request.validate() {
            Ok(()) => {
                info!(
                    "Requesting elements for {:?} ({} to {}, every {})",
                    request.designation, request.start, request.end, request.interval
                );
                self.drive(request).await
            }
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(()) => {
                info!("Received {} element records", self.records.len());
                Ok(self.records)
            }
            Err(e) => {
                error!("Session failed in {}: {}", self.state, e);
                if !self.records.is_empty() {
                    warn!("Discarding {} records received before the failure", self.records.len());
                }
                self.quit().await;
                Err(e)
            }
        }
    }

    async fn drive(&mut self, request: &EphemerisRequest) -> Result<()> {
        while self.state != SessionState::Done {
            let next = self.step(request).await?;
            debug!("{} -> {}", self.state, next);
            self.state = next;
        }
        Ok(())
    }

    /// Perform the transition out of the current state
    async fn step(&mut self, request: &EphemerisRequest) -> Result<SessionState> {
        let p = self.protocol;
        let prompt = self.config.prompt_timeout();

        match self.state {
            SessionState::AwaitBanner => {
                self.wait(&p.main_prompt, self.config.banner_timeout()).await?;
                debug!("Turning off paging");
                self.send("P").await?;
                Ok(SessionState::PagingOff)
            }
            SessionState::PagingOff => {
                self.wait(&p.main_prompt, prompt).await?;
                debug!("Looking up {:?}", request.designation);
                self.send(&request.designation).await?;
                Ok(SessionState::Lookup)
            }
            SessionState::Lookup => self.lookup().await,
            SessionState::SelectMode { prompt_seen } => {
                if !prompt_seen {
                    self.wait(&p.select_prompt, prompt).await?;
                }
                debug!("Selecting mode of operations");
                self.send("E").await?;
                Ok(SessionState::SelectSubMode)
            }
            SessionState::SelectSubMode => {
                self.wait(&p.element_menu, prompt).await?;
                self.send("E").await?;
                Ok(SessionState::SetCenter)
            }
            SessionState::SetCenter => {
                debug!("Selecting coordinate system center");
                self.wait(&p.center_prompt, prompt).await?;
                self.send(&request.center).await?;
                Ok(SessionState::SetReferencePlane)
            }
            SessionState::SetReferencePlane => {
                debug!("Selecting reference plane");
                self.wait(&p.plane_prompt, prompt).await?;
                self.send(request.reference_plane.as_str()).await?;
                Ok(SessionState::SetStart)
            }
            SessionState::SetStart => {
                debug!("Setting times and interval");
                self.wait(&p.start_prompt, prompt).await?;
                self.send(&request.start).await?;
                Ok(SessionState::SetEnd)
            }
            SessionState::SetEnd => {
                self.wait(&p.end_prompt, prompt).await?;
                self.send(&request.end).await?;
                Ok(SessionState::SetInterval)
            }
            SessionState::SetInterval => {
                self.wait(&p.interval_prompt, prompt).await?;
                self.send(&request.interval).await?;
                Ok(SessionState::ConfirmDefaults)
            }
            SessionState::ConfirmDefaults => {
                debug!("Accepting values");
                self.wait(&p.accept_defaults, prompt).await?;
                self.send("y").await?;
                Ok(SessionState::AwaitDataStart)
            }
            SessionState::AwaitDataStart => {
                self.wait(&p.start_of_data, self.config.data_start_timeout())
                    .await?;
                debug!("Start of ephemerides data");
                Ok(SessionState::ParsingBlocks)
            }
            SessionState::ParsingBlocks => {
                let mut parser =
                    BlockParser::new(&mut self.expecter, p, self.config.field_timeout());
                while let Some(record) = parser.next_record().await? {
                    self.records.push(record);
                }
                Ok(SessionState::AwaitMenuReturn)
            }
            SessionState::AwaitMenuReturn => {
                self.wait(&p.menu_return, self.config.menu_return_timeout())
                    .await?;
                Ok(SessionState::Quit)
            }
            SessionState::Quit => {
                self.quit().await;
                Ok(SessionState::Done)
            }
            SessionState::Done => Ok(SessionState::Done),
        }
    }

    /// Race the disambiguation prompt against the resolved body's menu
    async fn lookup(&mut self) -> Result<SessionState> {
        let p = self.protocol;
        let (winner, _) = self
            .expecter
            .expect_any(
                &[&p.continue_prompt, &p.select_prompt],
                self.config.lookup_timeout(),
            )
            .await
            .map_err(|e| at_state(e, SessionState::Lookup))?;

        if winner == 0 {
            debug!("Confirming search results");
            self.send("y").await?;
            self.lookup = Some(LookupOutcome::Confirmed);
            Ok(SessionState::SelectMode { prompt_seen: false })
        } else {
            debug!("Lookup resolved without confirmation");
            self.lookup = Some(LookupOutcome::AlreadyResolved);
            Ok(SessionState::SelectMode { prompt_seen: true })
        }
    }

    /// Best-effort quit; runs at most once per session
    async fn quit(&mut self) {
        if self.quit_sent {
            return;
        }
        self.quit_sent = true;
        debug!("quit");
        if let Err(e) = self.expecter.send_line("Q").await {
            warn!("Failed to send quit command: {}", e);
        }
    }

    async fn wait(&mut self, pattern: &Pattern, timeout: Duration) -> Result<()> {
        let state = self.state;
        self.expecter
            .expect(pattern, timeout)
            .await
            .map(|_| ())
            .map_err(|e| at_state(e, state))
    }

    async fn send(&mut self, line: &str) -> Result<()> {
        self.expecter.send_line(line).await
    }
}

/// Attribute a timeout to the state that was waiting
fn at_state(err: Error, state: SessionState) -> Error {
    match err {
        Error::ProtocolTimeout { duration, .. } => Error::timeout(state.name(), duration),
        other => other,
    }
}
