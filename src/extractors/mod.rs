// src/extractors/mod.rs
pub mod psi;

// Re-export key extraction items for convenience
pub use psi::{extractor_for, pattern_for, Extractor};
