// src/utils/error.rs
use crate::region::Region;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Transport failures and body read failures

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found, 503 Service Unavailable

    #[error("Could not build HTTP client: {0}")]
    Client(String),
}

/// One or more regions could not be read from the page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("NEA website format has changed, failed to parse PSI for: {}", format_regions(.regions))]
pub struct ParseError {
    pub regions: Vec<Region>,
}

fn format_regions(regions: &[Region]) -> String {
    regions
        .iter()
        .map(|r| match r {
            Region::Invalid => "3-hour",
            other => other.name(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Failed to load PSI page: {0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Parse(#[from] ParseError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("{0}")]
    Refresh(#[from] RefreshError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
