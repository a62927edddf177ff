// src/extractors/psi.rs

// --- Imports ---
use crate::region::Region;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Pattern Fragments ---
// The NEA page has no stable ids or sections to select on, so every reading
// is located by the label text sitting next to it.
const THREE_HOUR_LABEL: &str = r"3-hr\s*PSI:\s*";
const OVERALL_LABEL: &str = r"24-hr\s*PSI:\s*";
const DIRECTION_LABEL: &str = r#"</span>\s*<span class="direction">"#;
// ASCII only: `\d` would also accept other scripts' digits.
const PSI_VALUE: &str = r"[0-9]+";
const PSI_RANGE: &str = r"[0-9]+\s*-\s*[0-9]+";

/// Signature shared by every extractor: page text in, reading out.
/// An empty string means the pattern did not match.
pub type Extractor = fn(&str) -> String;

// --- Regex Patterns (Lazy Static) ---
// Group 1 always holds the reading itself.
static THREE_HOUR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("{}({})", THREE_HOUR_LABEL, PSI_VALUE))
        .expect("Failed to compile THREE_HOUR_RE")
});

static OVERALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("{}({})", OVERALL_LABEL, PSI_RANGE))
        .expect("Failed to compile OVERALL_RE")
});

static NORTH_RE: Lazy<Regex> = Lazy::new(|| regional_regex(Region::North));
static SOUTH_RE: Lazy<Regex> = Lazy::new(|| regional_regex(Region::South));
static EAST_RE: Lazy<Regex> = Lazy::new(|| regional_regex(Region::East));
static WEST_RE: Lazy<Regex> = Lazy::new(|| regional_regex(Region::West));
static CENTRAL_RE: Lazy<Regex> = Lazy::new(|| regional_regex(Region::Central));

/// A reading followed by the closing tag and the direction label, e.g.
/// `67</span><span class="direction">North`.
fn regional_regex(region: Region) -> Regex {
    let pattern = format!("({}){}{}", PSI_VALUE, DIRECTION_LABEL, regex::escape(region.name()));
    Regex::new(&pattern).expect("Failed to compile regional PSI pattern")
}

/// The compiled pattern used for `region`. Group 1 captures the reading.
pub fn pattern_for(region: Region) -> &'static Regex {
    match region {
        Region::North => &*NORTH_RE,
        Region::South => &*SOUTH_RE,
        Region::East => &*EAST_RE,
        Region::West => &*WEST_RE,
        Region::Central => &*CENTRAL_RE,
        Region::Overall => &*OVERALL_RE,
        Region::Invalid => &*THREE_HOUR_RE,
    }
}

/// Returns the extractor for `region`.
/// `Invalid` parses the 3-hour reading, `Overall` the 24-hour range.
pub fn extractor_for(region: Region) -> Extractor {
    match region {
        Region::Invalid => three_hour,
        Region::Overall => overall,
        Region::North => north,
        Region::South => south,
        Region::East => east,
        Region::West => west,
        Region::Central => central,
    }
}

fn first_capture(re: &Regex, page_text: &str) -> String {
    re.captures(page_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn three_hour(page_text: &str) -> String {
    first_capture(&THREE_HOUR_RE, page_text)
}

fn overall(page_text: &str) -> String {
    first_capture(&OVERALL_RE, page_text)
}

fn north(page_text: &str) -> String {
    first_capture(&NORTH_RE, page_text)
}

fn south(page_text: &str) -> String {
    first_capture(&SOUTH_RE, page_text)
}

fn east(page_text: &str) -> String {
    first_capture(&EAST_RE, page_text)
}

fn west(page_text: &str) -> String {
    first_capture(&WEST_RE, page_text)
}

fn central(page_text: &str) -> String {
    first_capture(&CENTRAL_RE, page_text)
}
