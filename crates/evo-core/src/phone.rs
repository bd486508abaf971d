//! Brazilian phone number display.

/// Keep only ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Mask a phone number by digit count:
///
/// - 13: `+55 (11) 9 87654321`
/// - 12: `+55 (11) 87654321`
/// - 11: `(11) 9 87654321`
/// - 10: `(11) 87654321`
///
/// Any other length comes back as the bare digits.
pub fn format_phone(raw: &str) -> String {
    let d = digits_only(raw);
    match d.len() {
        13 => format!("+{} ({}) {} {}", &d[0..2], &d[2..4], &d[4..5], &d[5..]),
        12 => format!("+{} ({}) {}", &d[0..2], &d[2..4], &d[4..]),
        11 => format!("({}) {} {}", &d[0..2], &d[2..3], &d[3..]),
        10 => format!("({}) {}", &d[0..2], &d[2..]),
        _ => d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_by_length() {
        assert_eq!(format_phone("5511987654321"), "+55 (11) 9 87654321");
        assert_eq!(format_phone("+55 11 8765-4321"), "+55 (11) 87654321");
        assert_eq!(format_phone("(11) 98765-4321"), "(11) 9 87654321");
        assert_eq!(format_phone("1187654321"), "(11) 87654321");
        assert_eq!(format_phone("12-345"), "12345");
    }

    #[test]
    fn strips_mask() {
        assert_eq!(digits_only("+55 (11) 9 8765-4321"), "5511987654321");
    }
}
