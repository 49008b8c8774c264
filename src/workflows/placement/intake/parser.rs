use std::io::Read;

/// Header row plus data rows, cells aligned to headers. Column meaning is
/// resolved later by the normalizer; headers are kept verbatim (post-trim).
#[derive(Debug, Clone)]
pub(crate) struct RawTable {
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<Vec<String>>,
}

pub(crate) fn parse_table<R: Read>(reader: R) -> Result<RawTable, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(|header| header.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut row = record
            .iter()
            .map(|cell| cell.to_string())
            .collect::<Vec<_>>();
        // Flexible mode admits ragged rows; pad or drop trailing cells so
        // every row lines up with the header.
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}
