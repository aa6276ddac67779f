//! Text-to-value conversion for numeric and temporal fields.

use time::format_description::{self, BorrowedFormatItem, OwnedFormatItem};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

use crate::host::{NumericKind, NumericValue, TemporalKind, TemporalValue};

const ISO_DATE_TIMES: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
];

const ISO_DATES: &[&[BorrowedFormatItem<'static>]] = &[format_description!("[year]-[month]-[day]")];

const ISO_TIMES: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[hour]:[minute]:[second].[subsecond]"),
    format_description!("[hour]:[minute]:[second]"),
    format_description!("[hour]:[minute]"),
];

/// Parses `raw` for a numeric field of the given kind.
///
/// Surrounding whitespace is ignored; decimals must be finite.
pub(crate) fn parse_numeric(kind: NumericKind, raw: &str) -> Option<NumericValue> {
    let text = raw.trim();
    match kind {
        NumericKind::Integer => text.parse().ok().map(NumericValue::Integer),
        NumericKind::Decimal => text
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(NumericValue::Decimal),
    }
}

/// Parses `raw` for a temporal field, trying ISO 8601 first and then the
/// field's own display format.
pub(crate) fn parse_temporal(
    kind: TemporalKind,
    raw: &str,
    display_format: Option<&str>,
) -> Option<TemporalValue> {
    let text = raw.trim();
    let display = display_format.and_then(|pattern| format_description::parse_owned::<2>(pattern).ok());
    match kind {
        TemporalKind::DateTime => parse_with(
            ISO_DATE_TIMES,
            display.as_ref(),
            |format| PrimitiveDateTime::parse(text, format).ok(),
            |format| PrimitiveDateTime::parse(text, format).ok(),
        )
        .map(TemporalValue::DateTime),
        TemporalKind::Date => parse_with(
            ISO_DATES,
            display.as_ref(),
            |format| Date::parse(text, format).ok(),
            |format| Date::parse(text, format).ok(),
        )
        .map(TemporalValue::Date),
        TemporalKind::Time => parse_with(
            ISO_TIMES,
            display.as_ref(),
            |format| Time::parse(text, format).ok(),
            |format| Time::parse(text, format).ok(),
        )
        .map(TemporalValue::Time),
    }
}

fn parse_with<T>(
    iso: &[&[BorrowedFormatItem<'static>]],
    display: Option<&OwnedFormatItem>,
    parse_iso: impl Fn(&[BorrowedFormatItem<'static>]) -> Option<T>,
    parse_display: impl FnOnce(&OwnedFormatItem) -> Option<T>,
) -> Option<T> {
    iso.iter()
        .find_map(|format| parse_iso(format))
        .or_else(|| display.and_then(parse_display))
}
