// src/region/mod.rs
use serde::Serialize;
use std::fmt;

/// Regions reported on the NEA PSI page.
///
/// `Invalid` doubles as the key for the island-wide 3-hour reading: any
/// unrecognised CLI token lands there, and that is the reading a user gets
/// when they don't name a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Region {
    North,
    South,
    East,
    West,
    Central,
    Overall,
    Invalid,
}

impl Region {
    /// Every cataloged region, in declaration order.
    pub const ALL: [Region; 7] = [
        Region::North,
        Region::South,
        Region::East,
        Region::West,
        Region::Central,
        Region::Overall,
        Region::Invalid,
    ];

    /// Maps a CLI token (letter or full word, any case) to a region.
    /// Anything unrecognised, including padded tokens, maps to `Invalid`.
    pub fn from_argument(token: &str) -> Region {
        match token.to_uppercase().as_str() {
            "N" | "NORTH" => Region::North,
            "S" | "SOUTH" => Region::South,
            "E" | "EAST" => Region::East,
            "W" | "WEST" => Region::West,
            "C" | "CENTRAL" => Region::Central,
            "O" | "OVERALL" => Region::Overall,
            _ => Region::Invalid,
        }
    }

    /// Label used on the page and in output.
    pub fn name(self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::West => "West",
            Region::Central => "Central",
            Region::Overall => "Overall",
            Region::Invalid => "Invalid",
        }
    }

    /// True for the five geographic regions.
    pub fn is_regional(self) -> bool {
        !matches!(self, Region::Overall | Region::Invalid)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
