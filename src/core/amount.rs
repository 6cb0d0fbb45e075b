//! 金額解析與千分位格式

/// 去掉逗號後必須是純數字 (最多一個小數點)
pub fn parse_amount(raw: &str) -> Option<f64> {
    let clean = raw.trim().replace(',', "");
    let digits = clean.replace('.', "");
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    clean.parse::<f64>().ok()
}

/// 四捨五入 (銀行家捨入) 到整數並加上千分位
pub fn format_amount(amount: f64) -> String {
    group_thousands(amount.round_ties_even() as u64)
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("4,500"), Some(4500.0));
        assert_eq!(parse_amount(" 1,23,456.50 "), Some(123456.5));
        assert_eq!(parse_amount("12a"), None);
        assert_eq!(parse_amount(","), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1000.0), "1,000");
        assert_eq!(format_amount(1234567.4), "1,234,567");
        assert_eq!(format_amount(2.5), "2");
        assert_eq!(format_amount(3.5), "4");
    }
}
