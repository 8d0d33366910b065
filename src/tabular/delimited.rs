//! Delimited-text serialization.

use super::TabularRow;
use crate::error::EncodingError;

/// Serialize rows with a header line; fields are quoted as needed
pub(super) fn write(rows: &[TabularRow], delimiter: u8) -> Result<Vec<u8>, EncodingError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| EncodingError::Csv(e.into_error().into()))
}
