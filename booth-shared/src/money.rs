/// Formats an amount in won with thousands separators, e.g. `12,000원`.
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-{}원", grouped)
    } else {
        format!("{}원", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_won() {
        assert_eq!(format_won(0), "0원");
        assert_eq!(format_won(500), "500원");
        assert_eq!(format_won(12000), "12,000원");
        assert_eq!(format_won(1234567), "1,234,567원");
        assert_eq!(format_won(-8000), "-8,000원");
    }
}
