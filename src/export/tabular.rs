use crate::domain::model::SummaryReport;
use crate::utils::error::{Result, SummarizerError};

pub fn render_json(report: &SummaryReport) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(report)?)
}

/// 每個摘要欄位一列
pub fn render_csv(report: &SummaryReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["field", "value"])?;
    for (field, value) in report.summary.iter() {
        writer.write_record([field, value])?;
    }
    writer
        .into_inner()
        .map_err(|e| SummarizerError::ExportError {
            format: "CSV".to_string(),
            message: e.to_string(),
        })
}

/// 純文字版本去掉 Markdown 標題記號
pub fn render_plain_text(text: &str) -> String {
    text.lines()
        .map(|line| line.strip_prefix("### ").unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ClaimAnswers, ClaimSummary, ClaimType, ReportSection};
    use chrono::{TimeZone, Utc};

    fn report() -> SummaryReport {
        let mut summary = ClaimSummary::new();
        summary.set("Policy Number", "POL12345");
        summary.set("Garage Address", "12, MG Road, Pune");
        SummaryReport {
            claim_type: ClaimType::Vehicle,
            generated_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap(),
            answers: ClaimAnswers::default(),
            preamble: vec![],
            sections: vec![ReportSection {
                title: "Policy Details".to_string(),
                lines: vec!["- Policy No.: POL12345".to_string()],
            }],
            body: String::new(),
            summary,
            sources: vec![],
            failures: vec![],
            warnings: vec!["Please verify the KYC.".to_string()],
        }
    }

    #[test]
    fn test_csv_quotes_values_with_commas() {
        let csv = String::from_utf8(render_csv(&report()).unwrap()).unwrap();
        assert_eq!(
            csv,
            "field,value\nPolicy Number,POL12345\nGarage Address,\"12, MG Road, Pune\"\n"
        );
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value =
            serde_json::from_slice(&render_json(&report()).unwrap()).unwrap();
        assert_eq!(json["claim_type"], "vehicle");
        assert_eq!(json["generated_at"], "2024-03-01T10:30:00Z");
        assert_eq!(json["answers"]["kyc_verified"], "yes");
        assert_eq!(json["summary"]["Policy Number"], "POL12345");
        assert_eq!(json["sections"][0]["title"], "Policy Details");
        assert_eq!(json["warnings"][0], "Please verify the KYC.");

        let keys: Vec<_> = json["summary"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Policy Number", "Garage Address"]);
    }

    #[test]
    fn test_plain_text_drops_heading_marks() {
        assert_eq!(
            render_plain_text("Q: Yes\n\n### Policy Details\n- Policy No.: 1\n"),
            "Q: Yes\n\nPolicy Details\n- Policy No.: 1\n"
        );
    }
}
