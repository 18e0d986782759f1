use crate::export::ExportError;
use crate::models::BookListing;

/// Column order of the CSV file; matches the field order of [`BookListing`].
pub const COLUMNS: [&str; 6] = ["title", "price", "rating", "availability", "product_url", "image_url"];

/// Render records as CSV with a header row. The header is written even when
/// there are no records.
pub fn to_csv(records: &[BookListing]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}
