// src/nea/mod.rs
pub mod client;
pub mod config;

pub use client::{HttpFetcher, PageFetcher};
pub use config::{ReadingConfig, DEFAULT_SOURCE_URL};
