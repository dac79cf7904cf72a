use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use super::types::{DATETIME_FORMAT, ParamType, ParamValue};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Scalar form of a parameter, ready for a quoter
#[derive(Debug, Clone, PartialEq)]
pub enum Literal<'a> {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(Cow<'a, str>),
    /// Serialized composite value; display only, never executable
    Blob(String)
}

/// Map a bound value to the literal form handed to the quoter.
///
/// Date/time values use `YYYY-MM-DD HH:MM:SS`. Strings declared as a
/// date/time type are normalized when they parse and kept verbatim when
/// they do not. Lists and objects become compact JSON.
pub fn coerce(value: &ParamValue, hint: Option<ParamType>) -> Literal<'_> {
    match value {
        ParamValue::Null => Literal::Null,
        ParamValue::Bool(b) => Literal::Bool(*b),
        ParamValue::Int(i) => Literal::Int(*i),
        ParamValue::UInt(u) => Literal::UInt(*u),
        ParamValue::Float(f) => Literal::Float(*f),
        ParamValue::Str(s) => match hint.and_then(|t| normalize_temporal(s, t)) {
            Some(normalized) => Literal::Text(Cow::Owned(normalized)),
            None => Literal::Text(Cow::Borrowed(s))
        },
        ParamValue::DateTime(dt) => {
            Literal::Text(Cow::Owned(dt.format(DATETIME_FORMAT).to_string()))
        }
        ParamValue::List(_) | ParamValue::Object(_) => Literal::Blob(value.to_json().to_string())
    }
}

fn normalize_temporal(text: &str, hint: ParamType) -> Option<String> {
    let text = text.trim();
    match hint {
        ParamType::DateTime => {
            parse_datetime(text).map(|dt| dt.format(DATETIME_FORMAT).to_string())
        }
        ParamType::Date => parse_datetime(text)
            .map(|dt| dt.date())
            .or_else(|| NaiveDate::parse_from_str(text, DATE_FORMAT).ok())
            .map(|d| d.format(DATE_FORMAT).to_string()),
        ParamType::Time => parse_datetime(text)
            .map(|dt| dt.time())
            .or_else(|| NaiveTime::parse_from_str(text, TIME_FORMAT).ok())
            .or_else(|| NaiveTime::parse_from_str(text, "%H:%M").ok())
            .map(|t| t.format(TIME_FORMAT).to_string()),
        _ => None
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_keeps_local_wall_clock() {
        let value = ParamValue::from("2024-03-01T08:30:00+02:00");
        assert_eq!(
            coerce(&value, Some(ParamType::DateTime)),
            Literal::Text(Cow::Borrowed("2024-03-01 08:30:00"))
        );
    }

    #[test]
    fn test_unparseable_date_kept_verbatim() {
        let value = ParamValue::from("next tuesday");
        assert_eq!(
            coerce(&value, Some(ParamType::Date)),
            Literal::Text(Cow::Borrowed("next tuesday"))
        );
    }
}
