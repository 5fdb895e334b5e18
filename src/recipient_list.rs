use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

use crate::domain::{RecipientColumn, RecipientEmail, RecipientFieldError, RecipientFields, RecipientRecord};
use crate::errors::RecipientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Comma-separated rows under a header drawn from the known column set,
    /// or a single headerless column of addresses.
    Structured,
    /// One bare address per line, no header.
    Plain,
}

/// Streams validated recipients out of a recipient list, in file order.
pub struct RecipientReader<R: Read> {
    source: Source<R>,
    pending: Option<RecipientRecord>,
}

enum Source<R: Read> {
    Structured {
        records: csv::StringRecordsIntoIter<R>,
        columns: Vec<RecipientColumn>,
    },
    Plain {
        lines: Lines<BufReader<R>>,
        line: u64,
    },
}

impl RecipientReader<File> {
    pub fn open(path: &Path, mode: InputMode) -> Result<Self, RecipientError> {
        let file = File::open(path).map_err(|source| RecipientError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Self::new(file, mode)
    }
}

impl<R: Read> RecipientReader<R> {
    /// The header of a structured list is checked here, so a bad header
    /// fails before a single recipient is handed out.
    pub fn new(reader: R, mode: InputMode) -> Result<Self, RecipientError> {
        match mode {
            InputMode::Plain => Ok(Self {
                source: Source::Plain {
                    lines: BufReader::new(reader).lines(),
                    line: 0,
                },
                pending: None,
            }),
            InputMode::Structured => Self::structured(reader),
        }
    }

    fn structured(reader: R) -> Result<Self, RecipientError> {
        let mut records = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_records();

        let first = match records.next() {
            Some(first) => first?,
            None => {
                return Ok(Self {
                    source: Source::Structured {
                        records,
                        columns: Vec::new(),
                    },
                    pending: None,
                })
            }
        };

        if first.iter().any(|cell| cell == "email") {
            let columns = first
                .iter()
                .map(|cell| {
                    cell.parse::<RecipientColumn>()
                        .map_err(RecipientError::UnrecognizedField)
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self {
                source: Source::Structured { records, columns },
                pending: None,
            });
        }

        if first.len() == 1 && first[0].contains('@') {
            // Headerless address list: the first line is already a recipient
            let columns = vec![RecipientColumn::Email];
            let pending = parse_row(&columns, &first)?;
            return Ok(Self {
                source: Source::Structured { records, columns },
                pending: Some(pending),
            });
        }

        Err(RecipientError::InvalidHeader)
    }

    fn next_record(&mut self) -> Option<Result<RecipientRecord, RecipientError>> {
        if let Some(record) = self.pending.take() {
            return Some(Ok(record));
        }

        match &mut self.source {
            Source::Structured { records, columns } => {
                let row = match records.next()? {
                    Ok(row) => row,
                    Err(e) => return Some(Err(e.into())),
                };
                Some(parse_row(columns, &row))
            }
            Source::Plain { lines, line } => loop {
                let text = match lines.next()? {
                    Ok(text) => text,
                    Err(e) => return Some(Err(e.into())),
                };
                *line += 1;
                let address = text.trim();
                if address.is_empty() {
                    continue;
                }
                let record = RecipientEmail::parse(address.to_string())
                    .map(RecipientRecord::from_email)
                    .map_err(|e| RecipientError::InvalidInput {
                        line: *line,
                        source: RecipientFieldError::InvalidEmail(e),
                    });
                return Some(record);
            },
        }
    }
}

impl<R: Read> Iterator for RecipientReader<R> {
    type Item = Result<RecipientRecord, RecipientError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

/// Only non-empty cells contribute to the record.
fn parse_row(columns: &[RecipientColumn], row: &csv::StringRecord) -> Result<RecipientRecord, RecipientError> {
    let mut fields = RecipientFields::default();
    for (column, cell) in columns.iter().zip(row.iter()) {
        if !cell.is_empty() {
            fields.set(*column, cell.to_string());
        }
    }

    RecipientRecord::parse(fields).map_err(|source| RecipientError::InvalidInput {
        line: row.position().map(|p| p.line()).unwrap_or_default(),
        source,
    })
}
