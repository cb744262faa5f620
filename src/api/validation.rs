use super::ApiError;

/// Path ids must be positive integers.
pub fn parse_id(raw: &str) -> Result<i32, ApiError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::validation("Invalid id")),
    }
}

/// Rejects a missing or blank question. The question itself is returned untouched.
pub fn validate_question(query: Option<&str>) -> Result<&str, ApiError> {
    match query {
        Some(question) if !question.trim().is_empty() => Ok(question),
        _ => Err(ApiError::validation("Query parameter 'tanya' cannot be empty")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("1").unwrap(), 1);
        assert_eq!(parse_id("12345").unwrap(), 12345);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-1").is_err());
        assert!(parse_id("abc").is_err());
        assert!(parse_id("").is_err());
    }

    #[test]
    fn test_validate_question() {
        assert_eq!(validate_question(Some("  halo ")).unwrap(), "  halo ");
        assert!(validate_question(Some("   ")).is_err());
        assert!(validate_question(Some("")).is_err());
        assert!(validate_question(None).is_err());

        let long = "a".repeat(5000);
        assert_eq!(validate_question(Some(&long)).unwrap(), long);
    }
}
