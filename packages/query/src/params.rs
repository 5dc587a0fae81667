//! Caller parameter validation.
//!
//! Blank values are treated as absent. Anything else that does not parse
//! is rejected with a field-specific [`QueryError::Validation`]; nothing
//! is silently defaulted.

use std::num::IntErrorKind;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::QueryError;

/// Page used when the caller sends none.
pub const DEFAULT_PAGE: usize = 1;

/// Page size used when the caller sends none.
pub const DEFAULT_LIMIT: usize = 20;

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid regex"));

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("valid regex"));

/// Validated pagination, sort and projection options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Requested page (≥ 1, not yet clamped to the page count).
    pub page: usize,
    /// Requested limit (≥ 1, not yet capped).
    pub limit: usize,
    /// Raw sort specification.
    pub sort: Option<String>,
    /// Raw projection list.
    pub fields: Option<String>,
}

impl ListOptions {
    /// Validates raw list parameters.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] if `page` or `limit` is present
    /// but not a positive integer.
    pub fn parse(params: &crate::ListParams) -> Result<Self, QueryError> {
        Ok(Self {
            page: optional_positive_int("page", params.page.as_deref())?.unwrap_or(DEFAULT_PAGE),
            limit: optional_positive_int("limit", params.limit.as_deref())?
                .unwrap_or(DEFAULT_LIMIT),
            sort: non_blank(params.sort.as_deref()).map(String::from),
            fields: non_blank(params.fields.as_deref()).map(String::from),
        })
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: None,
            fields: None,
        }
    }
}

/// Returns the trimmed value, or `None` if it is absent or blank.
#[must_use]
pub fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Returns the trimmed value or a "`field` is required" error.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if the value is absent or blank.
pub fn required<'a>(field: &'static str, raw: Option<&'a str>) -> Result<&'a str, QueryError> {
    non_blank(raw).ok_or_else(|| QueryError::validation(field, format!("{field} is required")))
}

/// Parses an optional strictly positive integer.
///
/// Values too large for `usize` saturate to `usize::MAX` rather than
/// failing, so an oversized page or limit is clamped downstream.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if the value is present but not an
/// integer ≥ 1.
pub fn optional_positive_int(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<usize>, QueryError> {
    non_blank(raw)
        .map(|s| {
            let invalid = || {
                QueryError::validation(
                    field,
                    format!("{field} must be a positive integer, got '{s}'"),
                )
            };
            if !DIGITS_RE.is_match(s) {
                return Err(invalid());
            }
            match s.parse::<usize>() {
                Ok(0) => Err(invalid()),
                Ok(n) => Ok(n),
                // Too large to represent is still well formed; callers clamp it.
                Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(usize::MAX),
                Err(_) => Err(invalid()),
            }
        })
        .transpose()
}

/// Parses a required strictly positive integer.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if the value is absent or not an
/// integer ≥ 1.
pub fn required_positive_int(field: &'static str, raw: Option<&str>) -> Result<i64, QueryError> {
    let s = required(field, raw)?;
    match s.parse::<i64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(QueryError::validation(
            field,
            format!("{field} must be a positive integer, got '{s}'"),
        )),
    }
}

/// Parses a finite number.
fn number(field: &'static str, s: &str) -> Result<f64, QueryError> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            QueryError::validation(field, format!("{field} must be a number, got '{s}'"))
        })
}

/// Parses a required threshold that must be strictly positive.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if the value is absent, not numeric,
/// or ≤ 0.
pub fn required_positive_number(field: &'static str, raw: Option<&str>) -> Result<f64, QueryError> {
    let value = number(field, required(field, raw)?)?;
    if value <= 0.0 {
        return Err(QueryError::validation(
            field,
            format!("{field} must be greater than 0"),
        ));
    }
    Ok(value)
}

/// Parses an optional strictly positive number.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if the value is present but not
/// numeric or ≤ 0.
pub fn optional_positive_number(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<f64>, QueryError> {
    non_blank(raw)
        .map(|s| required_positive_number(field, Some(s)))
        .transpose()
}

/// Parses an optional number that must be ≥ 0.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if the value is present but not
/// numeric or negative.
pub fn optional_non_negative_number(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<f64>, QueryError> {
    non_blank(raw)
        .map(|s| {
            let value = number(field, s)?;
            if value < 0.0 {
                return Err(QueryError::validation(
                    field,
                    format!("{field} must not be negative"),
                ));
            }
            Ok(value)
        })
        .transpose()
}

/// Parses a required number within `[min, max]`.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if the value is absent, not numeric,
/// or out of range.
pub fn required_number_in_range(
    field: &'static str,
    raw: Option<&str>,
    min: f64,
    max: f64,
) -> Result<f64, QueryError> {
    let value = number(field, required(field, raw)?)?;
    if !(min..=max).contains(&value) {
        return Err(QueryError::validation(
            field,
            format!("{field} must be between {min} and {max}"),
        ));
    }
    Ok(value)
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if the value is absent, does not
/// match the pattern, or is not a real date (e.g. `2024-02-30`).
pub fn required_iso_date(field: &'static str, raw: Option<&str>) -> Result<NaiveDate, QueryError> {
    let s = required(field, raw)?;
    if !ISO_DATE_RE.is_match(s) {
        return Err(QueryError::validation(
            field,
            format!("{field} must use the YYYY-MM-DD format, got '{s}'"),
        ));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| QueryError::validation(field, format!("{field} is not a valid date: '{s}'")))
}

/// Parses a required four-digit year.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if the value is absent or not four
/// digits.
pub fn required_year(field: &'static str, raw: Option<&str>) -> Result<i32, QueryError> {
    let s = required(field, raw)?;
    if !YEAR_RE.is_match(s) {
        return Err(QueryError::validation(
            field,
            format!("{field} must be a four-digit year, got '{s}'"),
        ));
    }
    s.parse()
        .map_err(|_| QueryError::validation(field, format!("{field} is not a valid year")))
}

/// Parses a required month number, 1-12.
///
/// # Errors
///
/// Returns [`QueryError::Validation`] if the value is absent or not in
/// `1..=12`.
pub fn required_month(field: &'static str, raw: Option<&str>) -> Result<u32, QueryError> {
    let s = required(field, raw)?;
    match s.parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        _ => Err(QueryError::validation(
            field,
            format!("{field} must be an integer between 1 and 12, got '{s}'"),
        )),
    }
}
