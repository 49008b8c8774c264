mod normalizer;
mod parser;

pub use normalizer::NormalizeError;

use crate::workflows::placement::domain::{Site, Student};
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("failed to read placement input: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Reads raw CSV exports and yields canonical records. Column headings may
/// vary between exports; the normalizer resolves them against alias lists and
/// rejects the whole file when a required column cannot be found.
pub struct PlacementIntake;

impl PlacementIntake {
    pub fn students_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Student>, IntakeError> {
        let file = std::fs::File::open(path)?;
        Self::students_from_reader(file)
    }

    pub fn students_from_reader<R: Read>(reader: R) -> Result<Vec<Student>, IntakeError> {
        let table = parser::parse_table(reader)?;
        Ok(normalizer::normalize_students(&table)?)
    }

    pub fn sites_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Site>, IntakeError> {
        let file = std::fs::File::open(path)?;
        Self::sites_from_reader(file)
    }

    pub fn sites_from_reader<R: Read>(reader: R) -> Result<Vec<Site>, IntakeError> {
        let table = parser::parse_table(reader)?;
        Ok(normalizer::normalize_sites(&table)?)
    }
}
