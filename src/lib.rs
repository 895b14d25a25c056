pub mod base;
pub mod config;
pub mod error;
pub mod market_data;

pub use error::{Result, SentimentError};
