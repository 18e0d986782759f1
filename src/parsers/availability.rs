use crate::models::Availability;

/// Map the availability paragraph's text to a stock state. A listing without
/// the paragraph is `Unknown`.
pub fn parse_availability(text: Option<&str>) -> Availability {
    match text {
        Some(text) if text.to_lowercase().contains("in stock") => Availability::InStock,
        Some(_) => Availability::OutOfStock,
        None => Availability::Unknown,
    }
}
