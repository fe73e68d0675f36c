use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ClassroomError, Result};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;
pub const NAME_MAX_LEN: usize = 100;
pub const TITLE_MAX_LEN: usize = 200;

pub fn validate_email(email: &str) -> std::result::Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_name(name: &str) -> std::result::Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name must not be empty");
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err("Name must be at most 100 characters");
    }
    Ok(())
}

/// 密码只校验长度，8 <= len <= 128
pub fn validate_password(password: &str) -> std::result::Result<(), &'static str> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err("Password must be at least 8 characters long");
    }
    if len > PASSWORD_MAX_LEN {
        return Err("Password must be at most 128 characters long");
    }
    Ok(())
}

pub fn validate_title(title: &str) -> std::result::Result<(), &'static str> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Title must not be empty");
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err("Title must be at most 200 characters");
    }
    Ok(())
}

/// 解析截止时间
///
/// 接受 RFC 3339（如 `2030-01-31T12:00:00Z`）或纯日期 `YYYY-MM-DD`，
/// 纯日期按当天 23:59:59 UTC 处理。
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ClassroomError::date_parse(format!(
            "Invalid due_date '{raw}', expected RFC 3339 or YYYY-MM-DD"
        ))
    })?;
    date.and_hms_opt(23, 59, 59)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ClassroomError::date_parse(format!("Invalid due_date '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_email() {
        assert!(validate_email("student@example.com").is_ok());
        assert!(validate_email("a.b+c@school.edu").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_name() {
        assert!(validate_name("Ada").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password(&"p".repeat(129)).is_err());
    }

    #[test]
    fn test_title() {
        assert!(validate_title("Algebra I").is_ok());
        assert!(validate_title("").is_err());
    }

    #[test]
    fn test_due_date_rfc3339() {
        let dt = parse_due_date("2030-05-01T08:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 6);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_due_date_plain_date() {
        let dt = parse_due_date("2030-05-01").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2030, 5, 1));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (23, 59, 59));
    }

    #[test]
    fn test_due_date_invalid() {
        let err = parse_due_date("next tuesday").unwrap_err();
        assert!(matches!(err, ClassroomError::DateParse(_)));
        assert!(parse_due_date("2030-13-01").is_err());
    }
}
