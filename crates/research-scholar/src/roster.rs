//! Faculty roster import from the registrar's CSV export.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::registry::domain::{Designation, FacultyId, FacultyMember, SupervisionSummary};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read faculty roster: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid faculty roster CSV: {}", err),
            RosterImportError::InvalidRow { line, reason } => {
                write!(f, "faculty roster line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Employee Code")]
    employee_code: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Department")]
    department: String,
    #[serde(rename = "Designation")]
    designation: String,
    #[serde(rename = "PhD", deserialize_with = "yes_no")]
    is_phd: bool,
    #[serde(rename = "Publications", default)]
    publications: Option<u32>,
}

fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Ok(true),
        "no" | "n" | "false" | "0" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected yes/no for PhD, got '{other}'"
        ))),
    }
}

pub struct FacultyRosterImporter;

impl FacultyRosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<FacultyMember>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Rows with an unknown designation or a blank code are rejected rather than skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<FacultyMember>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut members = Vec::new();

        let headers = csv_reader.headers()?.clone();
        let mut record = csv::StringRecord::new();
        while csv_reader.read_record(&mut record)? {
            let line = record.position().map(|pos| pos.line()).unwrap_or_default();
            let row: RosterRow = record.deserialize(Some(&headers))?;

            if row.employee_code.is_empty() || row.name.is_empty() {
                return Err(RosterImportError::InvalidRow {
                    line,
                    reason: "employee code and name are required".to_string(),
                });
            }

            let designation = Designation::parse(&row.designation);
            if designation == Designation::Unrecognized {
                return Err(RosterImportError::InvalidRow {
                    line,
                    reason: format!("unknown designation '{}'", row.designation),
                });
            }

            members.push(FacultyMember {
                id: FacultyId(row.employee_code),
                name: row.name,
                department: row.department.to_ascii_uppercase(),
                designation,
                is_phd: row.is_phd,
                publications: row.publications.unwrap_or(0),
                summary: SupervisionSummary::from_load(Default::default(), designation),
            });
        }

        Ok(members)
    }
}
