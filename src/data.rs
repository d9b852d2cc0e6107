//! Whitespace-separated binary dataset ingestion: one row per line, first
//! column the class label, remaining columns boolean attributes.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;

#[derive(Debug)]
pub enum DataError {
    Io(io::Error),
    Parse { line: usize, token: String },
    NonBinaryAttribute { line: usize, column: usize },
    RaggedRow { line: usize, expected: usize, found: usize },
    Empty,
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Io(err) => write!(f, "I/O error: {err}"),
            DataError::Parse { line, token } => {
                write!(f, "parse error at line {line}: {token:?} is not an integer")
            }
            DataError::NonBinaryAttribute { line, column } => write!(
                f,
                "line {line}, column {column}: attribute values must be 0 or 1"
            ),
            DataError::RaggedRow { line, expected, found } => write!(
                f,
                "line {line} has {found} columns, expected {expected}"
            ),
            DataError::Empty => write!(f, "dataset file has no data rows"),
        }
    }
}

impl std::error::Error for DataError {}

impl From<io::Error> for DataError {
    fn from(err: io::Error) -> Self {
        DataError::Io(err)
    }
}

/// A parsed binary classification dataset: `rows[t][a]` is whether
/// transaction `t` has attribute `a` set, `labels[t]` is its class index.
#[derive(Debug)]
pub struct BinaryDataset {
    pub rows: Vec<Vec<bool>>,
    pub labels: Vec<usize>,
    pub num_classes: usize,
    pub num_attributes: usize,
}

impl BinaryDataset {
    pub fn read(path: &str) -> Result<Self, DataError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self, DataError> {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        let mut num_attributes = None;

        for (line_idx, line) in content.lines().enumerate() {
            let line_number = line_idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let label: usize = tokens[0]
                .parse()
                .map_err(|_| DataError::Parse { line: line_number, token: tokens[0].to_string() })?;

            let expected = *num_attributes.get_or_insert(tokens.len() - 1);
            if tokens.len() - 1 != expected {
                return Err(DataError::RaggedRow {
                    line: line_number,
                    expected,
                    found: tokens.len() - 1,
                });
            }

            let mut row = Vec::with_capacity(expected);
            for (col_idx, token) in tokens[1..].iter().enumerate() {
                match token.parse::<u8>() {
                    Ok(0) => row.push(false),
                    Ok(1) => row.push(true),
                    Ok(_) => {
                        return Err(DataError::NonBinaryAttribute {
                            line: line_number,
                            column: col_idx + 2,
                        })
                    }
                    Err(_) => {
                        return Err(DataError::Parse { line: line_number, token: token.to_string() })
                    }
                }
            }

            rows.push(row);
            labels.push(label);
        }

        if rows.is_empty() {
            return Err(DataError::Empty);
        }

        let num_classes = labels.iter().collect::<HashSet<_>>().len();
        Ok(Self {
            rows,
            labels,
            num_classes,
            num_attributes: num_attributes.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_and_boolean_attributes() {
        let dataset = BinaryDataset::parse("0 1 0 1\n0 0 1 1\n1 0 0 0\n1 0 1 0\n").unwrap();
        assert_eq!(dataset.num_attributes, 3);
        assert_eq!(dataset.num_classes, 2);
        assert_eq!(dataset.rows[0], vec![true, false, true]);
        assert_eq!(dataset.labels, vec![0, 0, 1, 1]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dataset = BinaryDataset::parse("0 1 0\n\n1 0 1\n").unwrap();
        assert_eq!(dataset.rows.len(), 2);
    }

    #[test]
    fn rejects_non_binary_attribute_values() {
        let err = BinaryDataset::parse("0 2 0\n").unwrap_err();
        assert!(matches!(err, DataError::NonBinaryAttribute { .. }));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = BinaryDataset::parse("0 1 0\n1 0\n").unwrap_err();
        assert!(matches!(err, DataError::RaggedRow { .. }));
    }

    #[test]
    fn empty_file_is_rejected() {
        let err = BinaryDataset::parse("\n\n").unwrap_err();
        assert!(matches!(err, DataError::Empty));
    }
}
