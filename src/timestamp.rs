//! Parsing and rendering of the naive date-times used in request and response bodies.
//!
//! Use with `#[serde(with = "crate::timestamp")]` on a [PrimitiveDateTime] field.

use serde::{Deserialize, Deserializer, Serializer, de};
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

const PARSE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
);
const RENDER_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const RENDER_FORMAT_WITH_MICROSECONDS: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]");

/// Parse a date-time such as "2024-01-01T00:00:00" or "2024-01-01T00:00:00.250".
pub fn parse(text: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(text, PARSE_FORMAT)
}

/// Render `date_time` as "YYYY-MM-DDTHH:MM:SS".
///
/// Microseconds are appended only when the sub-second part is non-zero.
pub fn render(date_time: &PrimitiveDateTime) -> Result<String, time::error::Format> {
    if date_time.nanosecond() == 0 {
        date_time.format(RENDER_FORMAT)
    } else {
        date_time.format(RENDER_FORMAT_WITH_MICROSECONDS)
    }
}

pub fn serialize<S>(date_time: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let text = render(date_time).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<PrimitiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse(&text).map_err(|error| de::Error::custom(format!("invalid timestamp \"{text}\": {error}")))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::{parse, render};

    #[test]
    fn parses_whole_seconds() {
        assert_eq!(
            parse("2024-01-01T00:00:00").unwrap(),
            datetime!(2024-01-01 00:00:00)
        );
    }

    #[test]
    fn parses_fractional_seconds() {
        assert_eq!(
            parse("2024-03-05T12:34:56.25").unwrap(),
            datetime!(2024-03-05 12:34:56.25)
        );
    }

    #[test]
    fn rejects_date_without_time() {
        assert!(parse("2024-01-01").is_err());
    }

    #[test]
    fn renders_without_fraction_when_whole_second() {
        assert_eq!(
            render(&datetime!(2024-01-01 09:08:07)).unwrap(),
            "2024-01-01T09:08:07"
        );
    }

    #[test]
    fn renders_microseconds_when_fraction_present() {
        assert_eq!(
            render(&datetime!(2024-01-01 09:08:07.5)).unwrap(),
            "2024-01-01T09:08:07.500000"
        );
    }
}
