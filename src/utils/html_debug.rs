// src/utils/html_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;
use crate::extractors;
use crate::region::Region;
use crate::utils::error::AppError;

/// Wraps every reading the extractors would pick up in a highlighted span.
/// Overlapping matches keep the earliest one.
pub fn annotate_page(page_text: &str) -> String {
    let mut highlights = Vec::new();

    for region in Region::ALL {
        let found = extractors::pattern_for(region)
            .captures(page_text)
            .and_then(|caps| caps.get(1));
        match found {
            Some(m) => highlights.push((m.start(), m.end(), region)),
            None => tracing::debug!("No match for {} to highlight", region),
        }
    }
    highlights.sort_by_key(|h| h.0);

    // Add debug styling in head
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-three-hour { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-overall { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-region { background-color: #90EE90; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    for (start, end, region) in highlights {
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&page_text[last_pos..start]);

        let css_class = match region {
            Region::Invalid => "highlight-three-hour",
            Region::Overall => "highlight-overall",
            _ => "highlight-region",
        };
        debug_html.push_str(&format!(
            "<span class=\"{}\" title=\"Position: {}-{}, Region: {}\">",
            css_class, start, end, region
        ));
        debug_html.push_str(&page_text[start..end]);
        debug_html.push_str("</span>");

        last_pos = end;
    }
    debug_html.push_str(&page_text[last_pos..]);

    debug_html.push_str("\n</body>\n</html>");
    debug_html
}

/// Saves the annotated page to `filename`.
pub fn save_debug_html<P: AsRef<Path>>(page_text: &str, filename: P) -> Result<(), AppError> {
    let path = filename.as_ref();
    let mut file = File::create(path)?;
    file.write_all(annotate_page(page_text).as_bytes())?;

    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}
