use std::io::Read;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::base::SentimentReading;
use crate::config::FetchConfig;
use crate::error::{Result, SentimentError};
use crate::market_data::{InstrumentPageSource, PageResponse};

static SELL_PERCENTAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"UsersSellPercentage: '(\d+)'").expect("sell percentage pattern")
});
static BUY_PERCENTAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"UsersBuyPercentage: '(\d+)'").expect("buy percentage pattern")
});
static SELL_PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"SellPrice: '(\d+(?:\.\d+)?)'").expect("sell price pattern")
});

fn first_capture(pattern: &Regex, text: &str) -> Option<f64> {
    pattern.captures(text)?
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
}

/// Extracts the sentiment markers embedded in an instrument page.
///
/// Returns None when any of the sell percentage, buy percentage or price markers
/// is missing. Only the first price marker is used.
pub fn parse_sentiment(body: &str) -> Option<SentimentReading> {
    let sellers_percentage = first_capture(&SELL_PERCENTAGE, body)?;
    let buyers_percentage = first_capture(&BUY_PERCENTAGE, body)?;
    let price = first_capture(&SELL_PRICE, body)?;
    Some(SentimentReading::new(buyers_percentage, sellers_percentage, price))
}

/// Blocking http client for the public instrument pages
pub struct Plus500Client {
    agent: ureq::Agent,
    config: FetchConfig,
}

impl Plus500Client {
    pub fn new(config: FetchConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.timeout {
            builder = builder
                .timeout_connect(timeout)
                .timeout_read(timeout);
        }
        Plus500Client { agent: builder.build(), config }
    }
}

impl InstrumentPageSource for Plus500Client {
    fn fetch_page(&self, instrument: &str) -> Result<PageResponse> {
        let url = self.config.instrument_url(instrument);
        let resp = self.agent.get(&url)
            .set("User-Agent", &self.config.user_agent)
            .call();

        match resp {
            Ok(resp) => {
                let status = resp.status();
                let mut raw = Vec::new();
                resp.into_reader()
                    .read_to_end(&mut raw)
                    .map_err(|source| SentimentError::ResponseBody {
                        instrument: instrument.to_owned(),
                        source,
                    })?;
                let body = String::from_utf8_lossy(&raw).into_owned();
                debug!("{} returned {} ({} bytes)", url, status, body.len());
                Ok(PageResponse { status, body })
            },
            Err(ureq::Error::Status(status, _resp)) => {
                Ok(PageResponse { status, body: String::new() })
            },
            Err(ureq::Error::Transport(transport)) => {
                Err(SentimentError::Transport { url, source: Box::new(transport) })
            }
        }
    }
}
