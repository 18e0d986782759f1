pub mod availability;
pub mod price;

pub use availability::*;
pub use price::*;

use url::Url;

/// Collapse runs of whitespace and trim. Input is text `scraper` has already
/// entity-decoded, so no further decoding happens here.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve a possibly relative reference against `base`. Absolute references
/// come back unchanged.
pub fn resolve_url(base: &Url, reference: &str) -> Result<Url, url::ParseError> {
    match Url::parse(reference) {
        Ok(absolute) => Ok(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(reference),
        Err(e) => Err(e),
    }
}
