use once_cell::sync::Lazy;
use regex::Regex;

static UNIT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("Invalid unit id regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_unit_id(unit_id: &str) -> Result<(), &'static str> {
    // 单元 ID 长度校验：1 <= x <= 64
    if unit_id.is_empty() || unit_id.len() > 64 {
        return Err("Unit id length must be between 1 and 64 characters");
    }
    // 单元 ID 格式校验：只能包含字母、数字、下划线、点或连字符
    if !UNIT_ID_RE.is_match(unit_id) {
        return Err("Unit id must contain only letters, numbers, underscores, dots or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 评审窗口必须为正数，且不超过一年
pub fn validate_review_window(minutes: i64) -> Result<(), &'static str> {
    if minutes <= 0 {
        return Err("Review window must be a positive number of minutes");
    }
    if minutes > 60 * 24 * 366 {
        return Err("Review window must not exceed one year");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_unit_ids() {
        assert!(validate_unit_id("1").is_ok());
        assert!(validate_unit_id("unit-3").is_ok());
        assert!(validate_unit_id("assessment_2.a").is_ok());
    }

    #[test]
    fn test_invalid_unit_ids() {
        assert_eq!(
            validate_unit_id(""),
            Err("Unit id length must be between 1 and 64 characters")
        );
        assert!(validate_unit_id(&"x".repeat(65)).is_err());
        assert!(validate_unit_id("unit 3").is_err());
        assert!(validate_unit_id("unit:3").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("student@example.com").is_ok());
        assert!(validate_email("student@").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
    }

    #[test]
    fn test_review_window() {
        assert!(validate_review_window(30).is_ok());
        assert!(validate_review_window(0).is_err());
        assert!(validate_review_window(-5).is_err());
        assert!(validate_review_window(60 * 24 * 400).is_err());
    }
}
