//! Ephemeris Block Parser
//!
//! Turns the data region (after `$$SOE`) into orbital element records.
//! Each step races the record header against the `$$EOE` marker. After a
//! header, the twelve labeled fields are awaited one by one in their
//! declaration order, each located by its label rather than by column.
//! The fixed order is an assumption about the service's output; if a
//! future version reorders fields, the scan times out on the first one
//! that moved.

use std::time::Duration;

use futures::stream::{self, Stream};
use tracing::{debug, trace};

use super::protocol::Protocol;
use super::record::{parse_value, OrbitalElementRecord, RecordBuilder};
use crate::error::{Error, Result};
use crate::expect::{Expecter, Match, Transport};

/// State name reported when neither a header nor the end marker shows up
pub const PARSING_STATE: &str = "ParsingBlocks";

/// Lazy, finite, non-restartable sequence of records.
///
/// Once the end marker has been seen or an error has been returned, the
/// parser is exhausted and only yields `Ok(None)`.
pub struct BlockParser<'a, T: Transport> {
    expecter: &'a mut Expecter<T>,
    protocol: &'a Protocol,
    field_timeout: Duration,
    finished: bool,
    emitted: usize,
}

impl<'a, T: Transport> BlockParser<'a, T> {
    /// Start parsing; the caller has already consumed `$$SOE`
    pub fn new(
        expecter: &'a mut Expecter<T>,
        protocol: &'a Protocol,
        field_timeout: Duration,
    ) -> Self {
        Self {
            expecter,
            protocol,
            field_timeout,
            finished: false,
            emitted: 0,
        }
    }

    /// Next complete record, `Ok(None)` at the end of the data region
    pub async fn next_record(&mut self) -> Result<Option<OrbitalElementRecord>> {
        if self.finished {
            return Ok(None);
        }

        let result = self.advance().await;
        match &result {
            Ok(Some(_)) => self.emitted += 1,
            Ok(None) => {
                debug!("End of ephemerides data ({} records)", self.emitted);
                self.finished = true;
            }
            Err(e) => {
                debug!("Block parsing failed after {} records: {}", self.emitted, e);
                self.finished = true;
            }
        }
        result
    }

    /// Whether the sequence is exhausted
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Records produced so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Drive the parser to the end, keeping every record
    pub async fn collect_all(mut self) -> Result<Vec<OrbitalElementRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }
        Ok(records)
    }

    /// View the parser as a `Stream`. A failure is yielded once, then the
    /// stream ends.
    pub fn into_stream(self) -> impl Stream<Item = Result<OrbitalElementRecord>> + 'a
    where
        T: 'a,
    {
        stream::unfold(self, |mut parser| async move {
            match parser.next_record().await {
                Ok(Some(record)) => Some((Ok(record), parser)),
                Ok(None) => None,
                Err(e) => Some((Err(e), parser)),
            }
        })
    }

    async fn advance(&mut self) -> Result<Option<OrbitalElementRecord>> {
        let protocol = self.protocol;
        let (winner, header) = self
            .expecter
            .expect_any(&[&protocol.header, &protocol.end_of_data], self.field_timeout)
            .await
            .map_err(|e| relabel(e, PARSING_STATE))?;

        if winner == 1 {
            return Ok(None);
        }

        self.scan_fields(header).await.map(Some)
    }

    async fn scan_fields(&mut self, header: Match) -> Result<OrbitalElementRecord> {
        let protocol = self.protocol;
        let jd_text = header.capture(0).unwrap_or_default();
        let julian_date = parse_value("JD", jd_text)?;
        let calendar_date = header.capture(1).unwrap_or_default();
        let time_scale = header.capture(2).unwrap_or_default();
        trace!("parseBlock: JD {} ({})", jd_text, calendar_date);

        let mut builder = RecordBuilder::new(julian_date, calendar_date, time_scale);
        let fences = [&protocol.header, &protocol.end_of_data];

        for (field, pattern) in protocol.fields() {
            let found = self
                .expecter
                .expect_fenced(pattern, &fences, self.field_timeout)
                .await?;
            let value = parse_value(field.label(), found.capture(0).unwrap_or_default())?;
            builder.set(*field, value);
        }

        // every field was set above
        builder.build().ok_or_else(|| Error::MalformedRecord {
            field: format!("{:?}", builder.missing()),
            value: jd_text.to_string(),
        })
    }
}

/// Collect every record of the data region
pub async fn parse_blocks<T: Transport>(
    expecter: &mut Expecter<T>,
    protocol: &Protocol,
    field_timeout: Duration,
) -> Result<Vec<OrbitalElementRecord>> {
    BlockParser::new(expecter, protocol, field_timeout)
        .collect_all()
        .await
}

fn relabel(err: Error, state: &str) -> Error {
    match err {
        Error::ProtocolTimeout { duration, .. } => Error::timeout(state, duration),
        other => other,
    }
}
