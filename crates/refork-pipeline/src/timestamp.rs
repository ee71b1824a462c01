//! Timestamp stamped into the license block.
//!
//! Runs are reproducible when `SOURCE_DATE_EPOCH` is set: the timestamp is
//! taken from it instead of the wall clock. An unusable value falls back to
//! the current time with a warning.

use std::env;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Environment variable overriding the wall clock.
pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

enum SourceDateError {
    Missing,
    InvalidInteger { raw: String },
    InvalidTimestamp { raw: String },
}

/// Timestamp for this run, formatted as RFC 3339 in UTC.
///
/// Warnings are collected so the caller decides how to emit them.
#[must_use]
pub fn license_timestamp(warnings: &mut Vec<String>) -> String {
    timestamp_from(env::var(SOURCE_DATE_EPOCH).ok(), OffsetDateTime::now_utc(), warnings)
}

pub(crate) fn timestamp_from(
    raw: Option<String>,
    now: OffsetDateTime,
    warnings: &mut Vec<String>,
) -> String {
    let value = match source_date_time(raw) {
        Ok(pinned) => pinned,
        Err(error) => {
            push_source_date_warning(warnings, &error);
            now
        }
    };
    value.format(&Rfc3339).unwrap_or_else(|_| {
        warnings.push(format!(
            "timestamp formatting failed; falling back to {FALLBACK_TIMESTAMP}"
        ));
        FALLBACK_TIMESTAMP.into()
    })
}

fn source_date_time(configured: Option<String>) -> Result<OffsetDateTime, SourceDateError> {
    let Some(raw) = configured else {
        return Err(SourceDateError::Missing);
    };
    let Ok(seconds) = raw.trim().parse::<i64>() else {
        return Err(SourceDateError::InvalidInteger { raw });
    };
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|_| SourceDateError::InvalidTimestamp { raw })
}

fn push_source_date_warning(warnings: &mut Vec<String>, error: &SourceDateError) {
    match error {
        SourceDateError::Missing => {}
        SourceDateError::InvalidInteger { raw } => warnings.push(format!(
            "Invalid {SOURCE_DATE_EPOCH} '{raw}'; expected integer seconds since Unix epoch; \
             using the current time"
        )),
        SourceDateError::InvalidTimestamp { raw } => warnings.push(format!(
            "Invalid {SOURCE_DATE_EPOCH} '{raw}'; not a valid Unix timestamp; using the \
             current time"
        )),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("timestamp")
    }

    #[test]
    fn source_date_epoch_pins_the_timestamp() {
        let mut warnings = Vec::new();
        let stamp = timestamp_from(Some(String::from("0")), now(), &mut warnings);
        assert_eq!(stamp, "1970-01-01T00:00:00Z");
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_value_uses_the_clock_silently() {
        let mut warnings = Vec::new();
        let stamp = timestamp_from(None, now(), &mut warnings);
        assert_eq!(stamp, "2023-11-14T22:13:20Z");
        assert!(warnings.is_empty());
    }

    #[rstest]
    #[case::not_a_number("yesterday", "expected integer seconds")]
    #[case::out_of_range("999999999999999999", "not a valid Unix timestamp")]
    fn invalid_values_warn_and_use_the_clock(#[case] raw: &str, #[case] message: &str) {
        let mut warnings = Vec::new();
        let stamp = timestamp_from(Some(raw.to_owned()), now(), &mut warnings);
        assert_eq!(stamp, "2023-11-14T22:13:20Z");
        assert_eq!(warnings.len(), 1);
        assert!(warnings.iter().any(|warning| warning.contains(message)));
    }
}
