//! Expect/send over a live byte stream
//!
//! The expecter keeps everything received but not yet consumed in a text
//! buffer. An expectation scans that buffer, and if nothing matches it
//! waits for more output until its deadline passes. A successful match
//! consumes the buffer up to the end of the match, so later expectations
//! only ever see newer text.

use std::time::Duration;

use tokio::time::{timeout_at, Instant};
use tracing::{debug, trace};

use super::pattern::{Located, Match, Pattern};
use super::transport::Transport;
use crate::error::{Error, Result};

/// Default upper bound on unconsumed text (1 MiB)
pub const DEFAULT_MAX_BUFFER_BYTES: usize = 1024 * 1024;

/// Outcome of one scan over the buffer
enum Scan<R> {
    /// Found; consume the buffer up to `end`
    Found { value: R, end: usize },
    /// Not yet; wait for more output
    Pending,
    /// Can never match from here on
    Unreachable,
}

/// Expect/send driver owning a transport and its receive buffer
pub struct Expecter<T: Transport> {
    transport: T,
    buffer: String,
    /// Bytes of an incomplete UTF-8 sequence carried to the next chunk
    partial: Vec<u8>,
    max_buffer_bytes: usize,
    closed: bool,
}

impl<T: Transport> Expecter<T> {
    /// Create an expecter over `transport`
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buffer: String::new(),
            partial: Vec::new(),
            max_buffer_bytes: DEFAULT_MAX_BUFFER_BYTES,
            closed: false,
        }
    }

    /// Bound the unconsumed text kept in memory
    pub fn with_max_buffer(mut self, max_buffer_bytes: usize) -> Self {
        self.max_buffer_bytes = max_buffer_bytes.max(1);
        self
    }

    /// Send `line` followed by a newline
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        debug!("send: {:?}", line);
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.transport.send(&data).await
    }

    /// Wait for a single pattern
    pub async fn expect(&mut self, pattern: &Pattern, timeout: Duration) -> Result<Match> {
        let (_, found) = self.expect_any(&[pattern], timeout).await?;
        Ok(found)
    }

    /// Race several patterns against the stream.
    ///
    /// The pattern whose match starts earliest in the buffer wins; on a tie
    /// the one listed first wins. Only the winner is consumed. Returns the
    /// winner's index in `patterns`.
    pub async fn expect_any(
        &mut self,
        patterns: &[&Pattern],
        timeout: Duration,
    ) -> Result<(usize, Match)> {
        let label = race_label(patterns);
        self.wait_for(&label, timeout, |text| {
            let winner = patterns
                .iter()
                .enumerate()
                .filter_map(|(index, pattern)| pattern.locate(text).map(|loc| (index, loc)))
                .min_by_key(|(index, loc)| (loc.start, *index));

            match winner {
                Some((index, loc)) => {
                    let end = loc.end;
                    Scan::Found {
                        value: (index, to_match(text, loc)),
                        end,
                    }
                }
                None => Scan::Pending,
            }
        })
        .await
    }

    /// Wait for `pattern`, but only in the text ahead of the first fence.
    ///
    /// Fences mark where the current region ends (for example the next
    /// record header). If a fence is already buffered and the pattern does
    /// not occur before it, the pattern can no longer arrive in this region
    /// and the call fails at once with a timeout naming the pattern. Fences
    /// are never consumed.
    pub async fn expect_fenced(
        &mut self,
        pattern: &Pattern,
        fences: &[&Pattern],
        timeout: Duration,
    ) -> Result<Match> {
        self.wait_for(pattern.name(), timeout, |text| {
            let fence = fences.iter().filter_map(|f| f.find_start(text)).min();
            let region = match fence {
                Some(at) => &text[..at],
                None => text,
            };

            match pattern.locate(region) {
                Some(loc) => {
                    let end = loc.end;
                    Scan::Found {
                        value: to_match(text, loc),
                        end,
                    }
                }
                None if fence.is_some() => Scan::Unreachable,
                None => Scan::Pending,
            }
        })
        .await
    }

    /// Text received but not consumed yet
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Whether the transport has reported end of stream
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    async fn wait_for<R, F>(&mut self, label: &str, timeout: Duration, mut scan: F) -> Result<R>
    where
        F: FnMut(&str) -> Scan<R>,
    {
        let deadline = Instant::now() + timeout;

        loop {
            match scan(&self.buffer) {
                Scan::Found { value, end } => {
                    trace!("matched '{}', consuming {} bytes", label, end);
                    self.buffer.drain(..end);
                    return Ok(value);
                }
                Scan::Unreachable => {
                    debug!("'{}' cannot appear before the next boundary", label);
                    return Err(Error::timeout(label, timeout));
                }
                Scan::Pending => {}
            }

            if self.closed {
                return Err(Error::transport(format!(
                    "stream closed while waiting for '{}'",
                    label
                )));
            }

            match timeout_at(deadline, self.transport.recv()).await {
                Err(_) => {
                    debug!("timed out after {:?} waiting for '{}'", timeout, label);
                    return Err(Error::timeout(label, timeout));
                }
                Ok(Err(e)) => return Err(e),
                Ok(Ok(None)) => {
                    debug!("stream closed");
                    self.closed = true;
                }
                Ok(Ok(Some(bytes))) => self.push_bytes(&bytes),
            }
        }
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.partial.extend_from_slice(bytes);
        let mut rest: &[u8] = &self.partial;
        let mut decoded = String::new();

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    decoded.push_str(text);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    decoded.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        self.partial = rest.to_vec();
        self.buffer.push_str(&decoded);
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        if self.buffer.len() <= self.max_buffer_bytes {
            return;
        }
        let mut cut = self.buffer.len() - self.max_buffer_bytes;
        while !self.buffer.is_char_boundary(cut) {
            cut += 1;
        }
        debug!("expect buffer over limit, dropping {} bytes", cut);
        self.buffer.drain(..cut);
    }
}

fn to_match(text: &str, loc: Located) -> Match {
    Match {
        captures: loc.captures,
        before: text[..loc.start].to_string(),
        consumed: text[..loc.end].to_string(),
    }
}

fn race_label(patterns: &[&Pattern]) -> String {
    patterns
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(" | ")
}
