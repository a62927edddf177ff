// src/lib.rs
//! Reads Singapore's Pollutant Standards Index (PSI) from the NEA haze page.
//!
//! ```no_run
//! use psi_reader::{Reading, ReadingConfig, Region};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reading = Reading::from_config(ReadingConfig::default())?;
//! reading.refresh().await?;
//! println!("North: {}", reading.get(Region::North));
//! # Ok(())
//! # }
//! ```
pub mod extractors;
pub mod nea;
pub mod reading;
pub mod region;
pub mod utils;

pub use nea::{HttpFetcher, PageFetcher, ReadingConfig};
pub use reading::{Reading, Snapshot};
pub use region::Region;
pub use utils::{AppError, FetchError, ParseError, RefreshError};
