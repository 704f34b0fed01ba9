//! Flat-file Record Loader
//!
//! Reads the students and books of an institution from comma-delimited files.
//! Blank lines and lines starting with `#` are ignored.
//!
//! - Students: `username,password,first_name,last_name,email,phone`
//! - Books: `title,author,copies`

use super::types::{Book, Student};
use std::path::{Path, PathBuf};

const FIELD_SEPARATOR: char = ',';
const STUDENT_FIELDS: usize = 6;
const BOOK_FIELDS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

pub fn load_students(path: &Path, institution: &str) -> Result<Vec<Student>, LoadError> {
    records(path, STUDENT_FIELDS)?
        .into_iter()
        .map(|(_, fields)| {
            let mut fields = fields.into_iter();
            let mut next = || fields.next().unwrap_or_default();
            Ok(Student {
                username: next(),
                password: next(),
                institution: institution.to_string(),
                first_name: next(),
                last_name: next(),
                email: next(),
                phone: next(),
            })
        })
        .collect()
}

pub fn load_books(path: &Path) -> Result<Vec<(Book, u32)>, LoadError> {
    records(path, BOOK_FIELDS)?
        .into_iter()
        .map(|(line, fields)| {
            let copies = fields[2].parse::<u32>().map_err(|e| LoadError::Malformed {
                path: path.to_path_buf(),
                line,
                reason: format!("invalid copy count '{}': {}", fields[2], e),
            })?;
            Ok((Book::new(fields[0].clone(), fields[1].clone()), copies))
        })
        .collect()
}

/// Splits every meaningful line into exactly `expected` trimmed fields.
fn records(path: &Path, expected: usize) -> Result<Vec<(usize, Vec<String>)>, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rows = Vec::new();
    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<String> = line
            .split(FIELD_SEPARATOR)
            .map(|field| field.trim().to_string())
            .collect();

        if fields.len() != expected {
            return Err(LoadError::Malformed {
                path: path.to_path_buf(),
                line: idx + 1,
                reason: format!("expected {} fields, found {}", expected, fields.len()),
            });
        }

        rows.push((idx + 1, fields));
    }

    Ok(rows)
}
