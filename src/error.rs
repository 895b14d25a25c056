use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of an archiving run.
///
/// Non-success HTTP statuses and pages without sentiment markers are not errors,
/// see [`crate::market_data::FetchOutcome`].
#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("unable to read instrument list {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("transport failure requesting {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    #[error("unable to read response body for {instrument}: {source}")]
    ResponseBody {
        instrument: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to write {path}: {source}")]
    OutputIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("csv error writing {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, SentimentError>;
