use serde::{self, Deserialize, Deserializer, Serializer};
use time::{Date, OffsetDateTime, macros::format_description};

// Portal sample data writes plain ISO dates ("2024-01-15"), but exports and
// timestamps copied from the browser may carry a time component
pub fn parse_date(date_str: &str) -> Result<Date, String> {
    let date_str = date_str.trim();
    let format = format_description!("[year]-[month]-[day]");

    if let Ok(date) = Date::parse(date_str, &format) {
        return Ok(date);
    }

    // Full RFC3339 timestamp: keep the calendar date in its own offset
    let rfc3339 = time::format_description::well_known::Rfc3339;
    if let Ok(dt) = OffsetDateTime::parse(date_str, &rfc3339) {
        return Ok(dt.date());
    }

    // Anything else with a 'T' separator: take just the date part
    if let Some((date_part, _)) = date_str.split_once('T')
        && let Ok(date) = Date::parse(date_part, &format)
    {
        return Ok(date);
    }

    Err(format!("Failed to parse date '{date_str}': expected YYYY-MM-DD"))
}

// Serialization module for time::Date
pub mod iso_date_format {
    use super::{Date, Deserialize, Deserializer, Serializer, format_description, parse_date, serde};

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date
            .format(&format_description!("[year]-[month]-[day]"))
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let date_str = String::deserialize(deserializer)?;
        parse_date(&date_str).map_err(serde::de::Error::custom)
    }
}

// Optional date serialization module
pub mod iso_date_format_option {
    use super::{Date, Deserialize, Deserializer, Serializer, format_description, parse_date, serde};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => {
                let formatted = date
                    .format(&format_description!("[year]-[month]-[day]"))
                    .map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => parse_date(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
