//! Output encoders for operation reports.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{currency, Operation};
use crate::utils::date;

/// Column header of the tabular encoding. The second column carries the
/// operation type; the name is kept for existing consumers.
const CSV_HEADER: [&str; 4] = ["wallet_id", "operation_id", "amount", "date"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(LedgerError::InvalidExportFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation as it leaves the service: formatted amount, calendar date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportOperation {
    pub wallet_id: String,
    pub operation_type: String,
    pub amount: String,
    #[serde(serialize_with = "crate::utils::date::serialize")]
    pub date: NaiveDate,
}

impl From<&Operation> for ExportOperation {
    fn from(op: &Operation) -> Self {
        Self {
            wallet_id: op.wallet_id.to_string(),
            operation_type: op.operation_type.to_string(),
            amount: currency::format_amount(op.amount),
            date: op.created_at.date_naive(),
        }
    }
}

pub fn encode(format: ExportFormat, ops: &[ExportOperation]) -> LedgerResult<Vec<u8>> {
    match format {
        ExportFormat::Json => to_json(ops),
        ExportFormat::Csv => to_csv(ops),
    }
}

/// JSON array of objects; `[]` when empty.
pub fn to_json(ops: &[ExportOperation]) -> LedgerResult<Vec<u8>> {
    serde_json::to_vec(ops).map_err(|e| LedgerError::Encoding(e.to_string()))
}

/// Header plus one `\n`-terminated row per operation; no bytes at all when empty.
pub fn to_csv(ops: &[ExportOperation]) -> LedgerResult<Vec<u8>> {
    if ops.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for op in ops {
        writer
            .write_record([
                op.wallet_id.as_str(),
                op.operation_type.as_str(),
                op.amount.as_str(),
                date::format_date(op.date).as_str(),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| LedgerError::Encoding(e.to_string()))
}

fn csv_error(err: ::csv::Error) -> LedgerError {
    LedgerError::Encoding(err.to_string())
}
