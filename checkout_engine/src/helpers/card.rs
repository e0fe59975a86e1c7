/// Strip all whitespace from a card number as entered, leaving only the raw digits (or whatever
/// non-space characters the shopper typed; validation happens separately).
pub fn normalize_card_number(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// True if the normalized card number is exactly 16 digits.
pub fn is_valid_card_number(raw: &str) -> bool {
    let digits = normalize_card_number(raw);
    digits.len() == 16 && digits.chars().all(|c| c.is_ascii_digit())
}

/// True if the CVV is exactly 3 digits.
pub fn is_valid_cvv(cvv: &str) -> bool {
    cvv.len() == 3 && cvv.chars().all(|c| c.is_ascii_digit())
}

/// Re-group a card number into space-separated blocks of four for display, truncating anything
/// past 16 digits.
pub fn group_card_number(raw: &str) -> String {
    let mut grouped = String::with_capacity(19);
    for (i, c) in normalize_card_number(raw).chars().take(16).enumerate() {
        if i > 0 && i % 4 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    grouped
}

/// Normalize a typed expiry into `MM/YY`, dropping non-digits and truncating at four digits.
pub fn format_expiry(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() >= 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}
