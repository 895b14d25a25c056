use crate::base::SentimentReading;
use crate::error::Result;

pub mod api_parser;
pub mod reader;
pub mod writer;

pub use api_parser::{parse_sentiment, Plus500Client};
pub use reader::{read_input_instruments, parse_instrument_list, FetchSummary, SentimentLive};
pub use writer::{write_results, SentimentCsvWriter};

/// Raw reply for one instrument page request
#[derive(Clone, Debug, PartialEq)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

impl PageResponse {
    pub fn new(status: u16, body: &str) -> Self {
        PageResponse { status, body: body.to_owned() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Result of querying a single instrument
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FetchOutcome {
    Success(SentimentReading),
    /// Page loaded but carries no sentiment markers
    NoData,
    HttpError(u16),
}

impl FetchOutcome {
    pub fn from_response(response: &PageResponse) -> Self {
        if !response.is_success() {
            return FetchOutcome::HttpError(response.status);
        }
        match parse_sentiment(&response.body) {
            Some(reading) => FetchOutcome::Success(reading),
            None => FetchOutcome::NoData,
        }
    }
}

/// Source of instrument pages.
///
/// Transport failures are errors. Any http status, successful or not, is a response.
pub trait InstrumentPageSource {
    fn fetch_page(&self, instrument: &str) -> Result<PageResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAGE: &str = "UsersSellPercentage: '30', UsersBuyPercentage: '70', SellPrice: '123.45'";

    #[test]
    fn non_success_status_is_http_error() {
        let response = PageResponse::new(404, FULL_PAGE);
        assert_eq!(FetchOutcome::from_response(&response), FetchOutcome::HttpError(404));
        assert_eq!(FetchOutcome::from_response(&PageResponse::new(503, "")), FetchOutcome::HttpError(503));
    }

    #[test]
    fn success_status_is_parsed() {
        let outcome = FetchOutcome::from_response(&PageResponse::new(200, FULL_PAGE));
        assert_eq!(outcome, FetchOutcome::Success(SentimentReading::new(70.0, 30.0, 123.45)));
    }

    #[test]
    fn success_without_markers_is_no_data() {
        let outcome = FetchOutcome::from_response(&PageResponse::new(200, "<html></html>"));
        assert_eq!(outcome, FetchOutcome::NoData);
    }
}
