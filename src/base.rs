use std::fmt;

use indexmap::IndexMap;

/// Sentiment indicators scraped from one instrument page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SentimentReading {
    pub buyers_percentage: f64,
    pub sellers_percentage: f64,
    /// Always buyers_percentage - sellers_percentage
    pub imbalance: f64,
    pub price: f64,
}

impl SentimentReading {
    pub fn new(buyers_percentage: f64, sellers_percentage: f64, price: f64) -> Self {
        SentimentReading {
            buyers_percentage,
            sellers_percentage,
            imbalance: buyers_percentage - sellers_percentage,
            price,
        }
    }
}

impl fmt::Display for SentimentReading {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "buy {}% sell {}% imbalance {} price {}",
            self.buyers_percentage, self.sellers_percentage, self.imbalance, self.price)
    }
}

/// Readings gathered during one run, in the order the instruments were fetched.
///
/// Only instruments that produced a reading are present.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SentimentSnapshot {
    entries: IndexMap<String, SentimentReading>,
}

impl SentimentSnapshot {
    pub fn new() -> Self {
        SentimentSnapshot { entries: IndexMap::new() }
    }

    /// A repeated instrument keeps its first position and takes the newest reading.
    pub fn insert(&mut self, instrument: &str, reading: SentimentReading) {
        self.entries.insert(instrument.to_owned(), reading);
    }

    pub fn get(&self, instrument: &str) -> Option<&SentimentReading> {
        self.entries.get(instrument)
    }

    pub fn contains(&self, instrument: &str) -> bool {
        self.entries.contains_key(instrument)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SentimentReading)> {
        self.entries.iter().map(|(id, reading)| (id.as_str(), reading))
    }

    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|id| id.as_str())
    }
}
