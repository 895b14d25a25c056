use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.plus500.com/Instruments/";
/// The origin rejects the default user agents of http libraries.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
/// Pause after every instrument request
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_OUTPUT_DIR: &str = "./outputs";

#[derive(Clone, Debug, PartialEq)]
pub struct FetchConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Connect and read timeout. None leaves the http client defaults in place.
    pub timeout: Option<Duration>,
}

impl FetchConfig {
    pub fn instrument_url(&self, instrument: &str) -> String {
        format!("{}{}", self.base_url, instrument)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_owned();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            base_url: DEFAULT_BASE_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: None,
        }
    }
}
