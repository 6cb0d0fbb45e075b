use crate::config::claim_config::ClaimConfig;
use crate::core::amount::group_thousands;
use crate::domain::model::ClaimSummary;
use regex::Regex;
use std::sync::LazyLock;

/// 擷取值遇到下一個欄位標籤就截斷
static STOP_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(Branch|Date|Note|Code|Signature|Time|No\.|Number|Claim|Policy|Name|Gender|Age|Address|Email|Mobile|Contact|Phone|Relationship|Occupation)\b",
    )
    .expect("valid stop label regex")
});
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)-\s+(\w)").expect("valid hyphen regex"));
static TRAILING_JUNK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(Nationality|Claimant|SPAARC.*|By submitting.*|NEFT mandate.*|insurance claim.*)$",
    )
    .expect("valid trailing junk regex")
});
static GROUPED_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(,\d{3})*(\.\d{1,2})?$").expect("valid amount regex"));
static PLAIN_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid amount regex"));

/// 表單上常見、但不是真正欄位值的字詞
const JUNK_VALUES: &[&str] = &[
    "of", "the", "of the", "name", "aadhar holder", "n", "claim", "-", "not mentioned", "rs",
    "no", "number", "date", "place", "contact", "address", "gender", "age", "mobile", "email",
    "phone", "details", "birth", "ion", "occu", "na", "nil",
];

/// 需要補上 `Rs.` 前綴的金額欄位 (小寫比對)
const MONEY_FIELDS: &[&str] = &[
    "estimated cost of repairs",
    "total repair cost",
    "repair estimate",
    "amount claimed",
    "claim amount",
    "sum insured",
    "approved amount",
    "depreciation amount",
];

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn clean_group(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    let value = match STOP_LABEL.find(&collapsed) {
        Some(label) => &collapsed[..label.start()],
        None => collapsed.as_str(),
    }
    .trim();

    let length = value.chars().count();
    if JUNK_VALUES.contains(&value.to_lowercase().as_str()) || length < 3 {
        return None;
    }
    if length < 5
        && !value.chars().any(|c| c.is_numeric())
        && !value.chars().any(|c| c.is_alphabetic())
    {
        return None;
    }
    Some(value.to_string())
}

/// 依序嘗試每個樣式，回傳第一個乾淨的值；找不到時回傳空字串
pub fn extract_field(text: &str, patterns: &[Regex]) -> String {
    for pattern in patterns {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };

        let accepted = caps
            .iter()
            .skip(1)
            .flatten()
            .filter(|group| !group.as_str().is_empty())
            .find_map(|group| clean_group(group.as_str()));

        // 沒有可用的群組時回傳整段比對結果
        return accepted.unwrap_or_else(|| collapse_whitespace(&caps[0]));
    }
    String::new()
}

fn normalize_money(value: String) -> String {
    if GROUPED_AMOUNT.is_match(&value) {
        format!("Rs. {}", value)
    } else if PLAIN_AMOUNT.is_match(&value) {
        match value.parse::<f64>() {
            Ok(amount) => format!("Rs. {}", group_thousands(amount.trunc() as u64)),
            Err(_) => value,
        }
    } else {
        value
    }
}

/// 以理賠類型的規則從一份文件抽出所有欄位
pub fn extract_summary(text: &str, config: &ClaimConfig) -> ClaimSummary {
    let mut summary = ClaimSummary::new();

    for rule in &config.fields {
        let value = extract_field(text, &rule.patterns);
        if value.trim().is_empty() {
            continue;
        }

        let value = HYPHEN_BREAK.replace_all(&value, "${1}${2}");
        let mut cleaned = TRAILING_JUNK.replace_all(&value, "").trim().to_string();
        if cleaned.is_empty() {
            continue;
        }

        if MONEY_FIELDS.contains(&rule.name.to_lowercase().as_str()) {
            cleaned = normalize_money(cleaned);
        }

        tracing::trace!("{} = {}", rule.name, cleaned);
        summary.set(rule.name.clone(), cleaned);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ClaimType;
    use regex::RegexBuilder;

    fn patterns(sources: &[&str]) -> Vec<Regex> {
        sources
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .dot_matches_new_line(true)
                    .build()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_value_is_cut_at_next_label() {
        let text = "Insured Name: Ravi   Kumar Policy No. 123";
        let value = extract_field(text, &patterns(&[r"insured name\s*:\s*(.+)"]));
        assert_eq!(value, "Ravi Kumar");
    }

    #[test]
    fn test_rejected_groups_return_whole_match() {
        let text = "Place: N\nLocation: Pune Highway";
        let value = extract_field(
            text,
            &patterns(&[r"place\s*:\s*(\w+)", r"location\s*:\s*([^\n]+)"]),
        );
        assert_eq!(value, "Place: N");
    }

    #[test]
    fn test_short_symbol_group_falls_back_to_match() {
        let text = "Remarks: ---- ";
        assert_eq!(
            extract_field(text, &patterns(&[r"remarks\s*:\s*(\S+)"])),
            "Remarks: ----"
        );
    }

    #[test]
    fn test_pattern_without_groups_returns_match() {
        let text = "Cashless   facility\navailed";
        assert_eq!(
            extract_field(text, &patterns(&[r"cashless\s+facility\s+availed"])),
            "Cashless facility availed"
        );
    }

    #[test]
    fn test_optional_group_is_skipped() {
        let text = "Mobile: 9876543210";
        let value = extract_field(
            text,
            &patterns(&[r"(phone\s*:\s*\d+)?mobile\s*:\s*(\d{10})"]),
        );
        assert_eq!(value, "9876543210");
    }

    #[test]
    fn test_no_match_is_empty() {
        assert_eq!(extract_field("nothing here", &patterns(&[r"policy\s*(\d+)"])), "");
    }

    #[test]
    fn test_money_fields_gain_rupee_prefix() {
        let config = ClaimConfig::from_json_str(
            r#"{"fields": {
                "Sum Insured": ["sum insured\\s*:\\s*([\\d,.]+)"],
                "Claim Amount": ["claim amount\\s*:\\s*([\\d,.]+)"],
                "Bill Number": ["bill no\\s*:\\s*(\\d+)"]
            }}"#,
            "inline",
        )
        .unwrap();
        let text = "Sum Insured: 5,00,000\nClaim Amount: 45000.75\nBill No: 12345";
        let summary = extract_summary(text, &config);

        // 印度式分位不符合三位一組，保持原樣
        assert_eq!(summary.get("Sum Insured"), Some("5,00,000"));
        assert_eq!(summary.get("Claim Amount"), Some("Rs. 45,000"));
        assert_eq!(summary.get("Bill Number"), Some("12345"));
    }

    #[test]
    fn test_grouped_amount_keeps_digits() {
        assert_eq!(normalize_money("1,250.50".to_string()), "Rs. 1,250.50");
        assert_eq!(normalize_money("999".to_string()), "Rs. 999");
        assert_eq!(normalize_money("Rs. 10".to_string()), "Rs. 10");
    }

    #[test]
    fn test_hyphen_breaks_and_trailing_junk() {
        let config = ClaimConfig::from_json_str(
            r#"{"fields": {
                "Cause of Accident": ["cause of accident\\s*:\\s*(.+?)\\n\\n"],
                "Hospital Name": ["hospital\\s*:\\s*([^\\n]+)"]
            }}"#,
            "inline",
        )
        .unwrap();
        let text = "Cause of Accident: Rear-end col-\nlision at signal\n\nHospital: City Care Nationality";
        let summary = extract_summary(text, &config);

        assert_eq!(
            summary.get("Cause of Accident"),
            Some("Rear-end collision at signal")
        );
        assert_eq!(summary.get("Hospital Name"), Some("City Care"));
    }

    #[test]
    fn test_builtin_vehicle_rules_on_sample_form() {
        let config = ClaimConfig::builtin(ClaimType::Vehicle).unwrap();
        let text = "MOTOR CLAIM FORM\nPolicy No: MTR/2023/004512\nVehicle Registration No: MH12AB1234\n";
        let summary = extract_summary(text, &config);
        assert_eq!(summary.get("Policy Number"), Some("MTR/2023/004512"));
    }
}
