pub mod attendance;
pub mod holiday;
pub mod leave_request;
pub mod role;

use derive_more::Display;

/// Why an upstream record was dropped at the ingestion boundary.
///
/// Only key fields reject a record. Bad timestamps are coerced to `None`.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum IngestError {
    #[display(fmt = "missing field `{}`", _0)]
    MissingField(&'static str),
    #[display(fmt = "invalid date `{}` in field `{}`", value, field)]
    InvalidDate { field: &'static str, value: String },
    #[display(fmt = "unknown leave type `{}`", _0)]
    UnknownLeaveType(String),
}

impl std::error::Error for IngestError {}

/// Convert a batch of raw records, logging and skipping the ones that fail.
pub fn ingest_all<R, T>(raw: Vec<R>, kind: &str) -> Vec<T>
where
    T: TryFrom<R, Error = IngestError>,
{
    let total = raw.len();
    let accepted: Vec<T> = raw
        .into_iter()
        .filter_map(|r| match T::try_from(r) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, kind, "Skipping upstream record");
                None
            }
        })
        .collect();

    if accepted.len() != total {
        tracing::debug!(kind, total, accepted = accepted.len(), "Ingested with rejects");
    }
    accepted
}

pub(crate) fn required(value: Option<String>, field: &'static str) -> Result<String, IngestError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(IngestError::MissingField(field))
}

pub(crate) fn required_date(
    value: Option<String>,
    field: &'static str,
) -> Result<chrono::NaiveDate, IngestError> {
    let value = required(value, field)?;
    crate::utils::datetime::parse_date(&value).ok_or(IngestError::InvalidDate { field, value })
}
