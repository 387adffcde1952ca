//! Utility functions for common operations.
//!
//! - **Text**: Unicode-aware width and truncation, control-character
//!   stripping, HTML-to-text for article descriptions
//! - **URLs**: validation of article links before opening them
//!
//! ```
//! use newsdesk::util::{display_width, html_to_text, truncate_to_width};
//!
//! assert_eq!(display_width("Hello 世界"), 10);
//! assert_eq!(html_to_text("<p>Hi &amp; bye</p>"), "Hi & bye");
//! assert_eq!(truncate_to_width("Long article title", 10), "Long ar...");
//! ```

mod text;
mod url_validator;

use chrono::{DateTime, Utc};

pub use text::{display_width, html_to_text, initials, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_article_url, UrlValidationError};

/// Longest search text accepted from the input box, in characters.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;

/// Date shown next to an article, e.g. "Mar 01, 2024". Missing dates print
/// as an empty string.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%b %d, %Y").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).single();
        assert_eq!(format_date(date), "Mar 01, 2024");
        assert_eq!(format_date(None), "");
    }
}
