use crate::error::ParseError;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use engine_config::ParseOptions;
use model::outcome::RawRow;

/// CSV access over one upload's raw bytes. The bytes stay owned here for
/// the lifetime of the upload; every pass (header read, sampling, the full
/// row stream) builds a fresh cursor over them, so no pass consumes
/// another's position.
pub struct CsvRowReader {
    bytes: Vec<u8>,
    has_headers: bool,
    skip_rows: usize,
}

impl CsvRowReader {
    pub fn new(bytes: Vec<u8>, options: &ParseOptions) -> Self {
        CsvRowReader {
            bytes,
            has_headers: options.has_headers,
            skip_rows: options.skip_rows,
        }
    }

    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }

    /// Header cells, or synthesized `column_N` names when the file carries
    /// no header row.
    pub fn headers(&self) -> Result<Vec<String>, ParseError> {
        let mut records = self.raw_records();
        for _ in 0..self.skip_rows {
            if records.next().transpose()?.is_none() {
                return Ok(Vec::new());
            }
        }
        let first = match records.next().transpose()? {
            Some(record) => record,
            None => return Ok(Vec::new()),
        };
        if self.has_headers {
            Ok(first.iter().map(|cell| cell.trim().to_string()).collect())
        } else {
            Ok((1..=first.len()).map(|i| format!("column_{i}")).collect())
        }
    }

    /// First `cap` data rows, for content-shape classification.
    pub fn sample(&self, cap: usize) -> Result<Vec<RawRow>, ParseError> {
        let mut rows = Vec::with_capacity(cap);
        for row in self.rows()? {
            rows.push(row?);
            if rows.len() >= cap {
                break;
            }
        }
        Ok(rows)
    }

    /// Streamed data rows, header and skipped preamble excluded. Row
    /// indices are 1-based over data rows.
    pub fn rows(&self) -> Result<RowIter<'_>, ParseError> {
        let mut records = self.raw_records();
        let to_skip = self.skip_rows + usize::from(self.has_headers);
        for _ in 0..to_skip {
            if records.next().transpose()?.is_none() {
                break;
            }
        }
        Ok(RowIter { records, index: 0 })
    }

    fn raw_records(&self) -> StringRecordsIntoIter<&[u8]> {
        ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(self.bytes.as_slice())
            .into_records()
    }
}

pub struct RowIter<'a> {
    records: StringRecordsIntoIter<&'a [u8]>,
    index: usize,
}

impl Iterator for RowIter<'_> {
    type Item = Result<RawRow, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(ParseError::Csv(e))),
            };
            if is_blank(&record) {
                continue;
            }
            self.index += 1;
            let fields = record.iter().map(|cell| cell.to_string()).collect();
            return Some(Ok(RawRow::new(self.index, fields)));
        }
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}
