//! Date parsing for report dates.

use chrono::NaiveDate;

use super::patterns::{DATE_DMY, DATE_YMD};

/// Parse a date-shaped token (`15.01.2024`, `15. 1. 24`, `15/01/2024`,
/// `2024-01-15`) into a calendar date.
pub fn parse_date(token: &str) -> Option<NaiveDate> {
    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact.trim_end_matches('.');

    if let Some(caps) = DATE_DMY.captures(compact) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3]);
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_YMD.captures(compact) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dmy() {
        assert_eq!(parse_date("15.01.2024"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("15. 1. 2024"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("3/2/2023"), NaiveDate::from_ymd_opt(2023, 2, 3));
    }

    #[test]
    fn test_parse_ymd() {
        assert_eq!(parse_date("2024-01-15"), NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(parse_date("1.2.24"), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(parse_date("1.2.85"), NaiveDate::from_ymd_opt(1985, 2, 1));
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(parse_date("32.01.2024"), None);
        assert_eq!(parse_date("15.13.2024"), None);
        assert_eq!(parse_date("not a date"), None);
    }
}
