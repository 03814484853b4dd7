/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Parse a positive integer from an environment-style string value, falling back to the default on anything else.
pub fn parse_positive_int(value: Option<String>, default: u64) -> u64 {
    value.and_then(|v| v.trim().parse::<u64>().ok()).filter(|n| *n > 0).unwrap_or(default)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn boolean_flags() {
        assert!(parse_boolean_flag(Some("yes".into()), false));
        assert!(!parse_boolean_flag(Some("off".into()), true));
        assert!(parse_boolean_flag(None, true));
        assert!(!parse_boolean_flag(Some("banana".into()), false));
    }

    #[test]
    fn positive_ints() {
        assert_eq!(parse_positive_int(Some("30".into()), 10), 30);
        assert_eq!(parse_positive_int(Some("0".into()), 10), 10);
        assert_eq!(parse_positive_int(Some("x".into()), 10), 10);
        assert_eq!(parse_positive_int(None, 10), 10);
    }
}
