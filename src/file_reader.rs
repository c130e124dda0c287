use std::io::{self, BufRead as _};

use crate::model::csv::ExportedRow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads a CSV produced by the export serializer, skipping its byte-order
/// mark.
pub fn csv_stream<R: io::Read>(buffer: R) -> impl Iterator<Item = Result<ExportedRow, csv::Error>> {
    let mut buffer = io::BufReader::new(buffer);
    if buffer
        .fill_buf()
        .is_ok_and(|head| head.starts_with(UTF8_BOM))
    {
        buffer.consume(UTF8_BOM.len());
    }

    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(buffer);

    reader.into_deserialize::<ExportedRow>()
}
