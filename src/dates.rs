//! Spanish date formatting for bulletin pages.
//!
//! The API sends dates as `YYYY-MM-DD`, sometimes with a time part
//! (`2025-03-15T00:00:00` or RFC 3339). Only the calendar date matters here.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::error::{Error, Result};

/// Text used where a date cannot be parsed.
pub const INVALID_DATE: &str = "Fecha inválida";

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Parse an API date into a calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidDate(String::new()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt.date());
        }
    }

    Err(Error::InvalidDate(value.to_string()))
}

/// Spanish month name (lowercase) for a 1-based month.
pub fn month_name(month: u32) -> &'static str {
    MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

/// `15/03/2025`
pub fn format_short(value: &str) -> String {
    match parse_date(value) {
        Ok(d) => format!("{:02}/{:02}/{}", d.day(), d.month(), d.year()),
        Err(_) => INVALID_DATE.to_string(),
    }
}

/// `15 de marzo de 2025`
pub fn format_long(value: &str) -> String {
    match parse_date(value) {
        Ok(d) => long_date(d),
        Err(_) => INVALID_DATE.to_string(),
    }
}

/// `sábado, 15 de marzo de 2025`
pub fn format_with_weekday(value: &str) -> String {
    match parse_date(value) {
        Ok(d) => format!("{}, {}", weekday_name(d.weekday()), long_date(d)),
        Err(_) => INVALID_DATE.to_string(),
    }
}

/// Year of an API date, if parsable.
pub fn year_of(value: &str) -> Option<i32> {
    parse_date(value).ok().map(|d| d.year())
}

fn long_date(d: NaiveDate) -> String {
    format!("{} de {} de {}", d.day(), month_name(d.month()), d.year())
}

/// Roman numeral for a positive year (cover "AÑO MMXXV").
pub fn roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, symbol) in TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date() {
        let d = parse_date("2025-03-15").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2025, 3, 15));
    }

    #[test]
    fn test_parse_with_time() {
        assert_eq!(
            parse_date("2025-03-15T00:00:00").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        // The calendar date is kept as sent, no timezone shift.
        assert_eq!(
            parse_date("2025-03-15T23:30:00-03:00").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_invalid() {
        assert!(parse_date("").is_err());
        assert!(parse_date("ayer").is_err());
        assert_eq!(format_long("ayer"), INVALID_DATE);
    }

    #[test]
    fn test_formats() {
        assert_eq!(format_short("2025-03-05"), "05/03/2025");
        assert_eq!(format_long("2025-03-05"), "5 de marzo de 2025");
        assert_eq!(format_with_weekday("2025-03-15"), "sábado, 15 de marzo de 2025");
    }

    #[test]
    fn test_roman() {
        assert_eq!(roman(2025), "MMXXV");
        assert_eq!(roman(1999), "MCMXCIX");
        assert_eq!(roman(0), "");
    }
}
