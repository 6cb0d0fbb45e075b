use crate::config::claim_config::ClaimConfig;
use crate::core::line_items::{format_line_items, is_raw_block};
use crate::domain::model::{ClaimAnswers, ClaimSummary, ClaimType, ReportSection, YesNo};

/// 由審核人員回答填入、不會出現在分節清單中的欄位
pub const INTERACTIVE_FIELDS: &[&str] = &[
    "FIR Status",
    "Hospital Type Network",
    "Cashless Facility Availed",
    "Claim Type",
];

pub const KYC_WARNING: &str = "Please verify the KYC.";

fn strip_prefix_ci<'a>(field: &'a str, prefix: &str) -> Option<&'a str> {
    let head = field.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &field[prefix.len()..])
}

fn remove_ci(field: &str, tag: &str) -> String {
    let lower = field.to_ascii_lowercase();
    let tag = tag.to_ascii_lowercase();
    let mut result = String::with_capacity(field.len());
    let mut rest = 0;
    for (start, _) in lower.match_indices(&tag) {
        result.push_str(&field[rest..start]);
        rest = start + tag.len();
    }
    result.push_str(&field[rest..]);
    result
}

fn trim_label(label: &str) -> String {
    label
        .trim_matches(|c| c == ' ' || c == ':' || c == '-')
        .to_string()
}

/// 依分節標題縮短欄位名稱；`None` 表示不列出
pub fn shorten_label(heading: &str, field: &str) -> Option<String> {
    let heading_lower = heading.to_ascii_lowercase();
    let field_lower = field.to_ascii_lowercase();

    let stripped = |prefix: &str| strip_prefix_ci(field, prefix).map(trim_label);
    let removed = |tag: &str| trim_label(&remove_ci(field, tag));
    let contains = |tag: &str| field_lower.contains(&tag.to_ascii_lowercase());

    match heading_lower.as_str() {
        "life assured details" if stripped("Insured ").is_some() => stripped("Insured "),
        "bank & payout details" if stripped("Claimant ").is_some() => stripped("Claimant "),
        "claim submission details" if contains(" (Official)") || contains(" (Official Use)") => {
            Some(trim_label(&remove_ci(
                &remove_ci(field, " (Official Use)"),
                " (Official)",
            )))
        }
        "death certificate details" if contains(" (Death Certificate)") => {
            Some(removed("(Death Certificate)"))
        }
        "kyc details" if contains(" (KYC)") => Some(removed("(KYC)")),
        "kyc information" if contains("(KYC)") => Some(removed("(KYC)")),
        "policy details" if field_lower == "policy number" => Some("Policy No.".to_string()),
        "claimant details" if stripped("Claimant ").is_some() => stripped("Claimant "),
        "driver details" if stripped("Driver ").is_some() => {
            if field_lower.contains("driving") {
                Some(field.to_string())
            } else {
                stripped("Driver ")
            }
        }
        "garage details" if stripped("Garage ").is_some() => stripped("Garage "),
        "other insurance details" if stripped("Other Insurance - ").is_some() => {
            stripped("Other Insurance - ")
        }
        "interest holder details" if stripped("Interest Holder - ").is_some() => {
            stripped("Interest Holder - ")
        }
        "discharge voucher" if contains("(Discharge Voucher)") => {
            Some(removed("(Discharge Voucher)"))
        }
        "satisfaction note" if contains("(Satisfaction Note)") => {
            Some(removed("(Satisfaction Note)"))
        }
        "primary insured details" if stripped("Primary Insured ").is_some() => {
            stripped("Primary Insured ")
        }
        "insured person hospitalized details"
            if stripped("Insured Person Hospitalized ").is_some() =>
        {
            stripped("Insured Person Hospitalized ")
        }
        _ => {
            let prefix = format!("{} ", heading_lower.replace(" details", "").trim());
            match strip_prefix_ci(field, &prefix) {
                Some(rest) if !heading.is_empty() => Some(trim_label(rest)),
                _ if INTERACTIVE_FIELDS.contains(&field) => None,
                _ => Some(field.to_string()),
            }
        }
    }
}

/// 依設定的分節順序產生摘要內容
pub fn build_sections(summary: &ClaimSummary, config: &ClaimConfig) -> Vec<ReportSection> {
    let mut sections = Vec::new();

    for section in &config.summary_sections {
        let mut lines = Vec::new();
        for field in &section.fields {
            let value = summary.get(field).unwrap_or_default().trim();
            if value.is_empty() {
                continue;
            }
            let Some(label) = shorten_label(&section.section_title, field) else {
                continue;
            };

            if is_raw_block(field) {
                lines.push(format!("### {}\n{}", label, format_line_items(value)));
            } else {
                lines.push(format!("- {}: {}", label, value));
            }
        }

        if !lines.is_empty() {
            sections.push(ReportSection {
                title: section.section_title.clone(),
                lines,
            });
        }
    }

    sections
}

pub fn render_body(sections: &[ReportSection]) -> String {
    sections
        .iter()
        .map(|section| format!("\n### {}\n{}\n", section.title, section.lines.join("\n")))
        .collect()
}

/// 報告開頭的問答行
pub fn build_preamble(
    claim_type: ClaimType,
    answers: &ClaimAnswers,
    summary: &ClaimSummary,
) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Could you please confirm whether the policy has been assigned?: {}",
            answers.policy_assigned
        ),
        format!(
            "Could you please let us know whether the KYC verification has been completed?: {}",
            answers.kyc_verified
        ),
    ];

    if let Some(fir) = summary.get("FIR Status") {
        lines.push(format!("FIR/Affidavit Status: {}", fir));
    }

    if claim_type == ClaimType::Health {
        if let Some(network) = summary.get("Hospital Type Network") {
            lines.push(format!("Is the hospital type network?: {}", network));
        }
        if let Some(cashless) = summary.get("Cashless Facility Availed") {
            lines.push(format!(
                "Do you wish to avail the cashless facility?: {}",
                cashless
            ));
        }
        if let Some(kind) = summary.get("Claim Type") {
            lines.push(format!("Claim Type: {}", kind));
        }
    }

    lines
}

pub fn answer_warnings(answers: &ClaimAnswers) -> Vec<String> {
    match answers.kyc_verified {
        YesNo::No => vec![KYC_WARNING.to_string()],
        YesNo::Yes => Vec::new(),
    }
}
