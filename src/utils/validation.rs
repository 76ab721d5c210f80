//! Input validation for command arguments and configuration values

use crate::error::CliError;
use chrono::NaiveDate;

/// Validate that a URL is properly formatted
pub fn validate_url(url: &str) -> Result<(), CliError> {
    if url.is_empty() {
        return Err(CliError::InvalidArguments("URL cannot be empty".to_string()));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidArguments(format!(
            "Invalid URL '{}': URL must start with http:// or https://",
            url
        )));
    }

    Ok(())
}

/// Parse a `YYYY-MM-DD` date as Fiken expects it.
pub fn parse_date(value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        CliError::InvalidArguments(format!("Invalid date '{}': expected YYYY-MM-DD", value))
    })
}

/// Parse a kroner amount such as `1 250,50`, `1250.5` or `-99` into cents.
pub fn parse_amount(value: &str) -> Result<i64, CliError> {
    let invalid = || CliError::InvalidArguments(format!("Invalid amount '{}'", value));

    let cleaned: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (whole, fraction) = match digits.split_once([',', '.']) {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };
    if whole.is_empty()
        || fraction.len() > 2
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let kroner: i64 = whole.parse().map_err(|_| invalid())?;
    let ore: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    let cents = kroner
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(ore))
        .ok_or_else(invalid)?;
    Ok(if negative { -cents } else { cents })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_valid_urls() {
        assert!(validate_url("http://localhost:3000").is_ok());
        assert!(validate_url("https://api.fiken.no/api/v2").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_invalid_urls() {
        assert!(validate_url("").is_err());
        assert!(validate_url("localhost:3000").is_err());
        assert!(validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("29.02.2024").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1 250,50").unwrap(), 125050);
        assert_eq!(parse_amount("1250.5").unwrap(), 125050);
        assert_eq!(parse_amount("99").unwrap(), 9900);
        assert_eq!(parse_amount("-0,05").unwrap(), -5);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("12,345").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount(",50").is_err());
        assert!(parse_amount("1.2.3").is_err());
    }
}
