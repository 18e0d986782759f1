use crate::export::ExportError;
use crate::models::BookListing;

/// Render records as a pretty-printed JSON array. Non-ASCII text is written
/// as UTF-8, not escaped.
pub fn to_json(records: &[BookListing]) -> Result<Vec<u8>, ExportError> {
    let mut out = serde_json::to_vec_pretty(records)?;
    out.push(b'\n');
    Ok(out)
}
