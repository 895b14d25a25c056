use std::fs;
use std::path::Path;
use std::{thread, time};

use tracing::{debug, info, warn};

use crate::base::SentimentSnapshot;
use crate::error::{Result, SentimentError};
use super::{FetchOutcome, InstrumentPageSource};

/// Splits a comma separated instrument list. Blank tokens are kept.
pub fn parse_instrument_list(content: &str) -> Vec<String> {
    content.split(',')
        .map(|token| token.trim().to_owned())
        .collect()
}

pub fn read_input_instruments<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|source| SentimentError::InputRead { path: path.to_owned(), source })?;
    Ok(parse_instrument_list(&content))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub succeeded: usize,
    pub no_data: usize,
    pub http_errors: usize,
}

impl FetchSummary {
    fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Success(_) => self.succeeded += 1,
            FetchOutcome::NoData => self.no_data += 1,
            FetchOutcome::HttpError(_) => self.http_errors += 1,
        }
    }
}

/// Sequential fetch loop over a list of instruments
pub struct SentimentLive<S: InstrumentPageSource> {
    source: S,
    request_delay: time::Duration,
    summary: FetchSummary,
}

impl<S: InstrumentPageSource> SentimentLive<S> {
    pub fn new(source: S, request_delay: time::Duration) -> Self {
        SentimentLive { source, request_delay, summary: FetchSummary::default() }
    }

    /// Counts for every instrument attempted so far
    pub fn summary(&self) -> FetchSummary {
        self.summary
    }

    pub fn fetch_instrument(&mut self, instrument: &str) -> Result<FetchOutcome> {
        info!("Querying instrument {}", instrument);
        let response = self.source.fetch_page(instrument)?;
        let outcome = FetchOutcome::from_response(&response);
        self.summary.record(&outcome);
        Ok(outcome)
    }

    /// Queries every instrument in order, sleeping after each request.
    ///
    /// Http failures and pages without data are skipped. Transport errors abort the run.
    pub fn fetch_instruments(&mut self, instruments: &[String]) -> Result<SentimentSnapshot> {
        let mut snapshot = SentimentSnapshot::new();

        for instrument in instruments {
            match self.fetch_instrument(instrument)? {
                FetchOutcome::Success(reading) => {
                    debug!("{}: {}", instrument, reading);
                    snapshot.insert(instrument, reading);
                },
                FetchOutcome::NoData => {
                    debug!("No sentiment data for {}", instrument);
                },
                FetchOutcome::HttpError(status) => {
                    warn!("Request for instrument {} failed with status {}", instrument, status);
                }
            }

            if !self.request_delay.is_zero() {
                thread::sleep(self.request_delay);
            }
        }

        Ok(snapshot)
    }
}
