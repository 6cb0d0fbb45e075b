//! 帳單、估價單、藥品明細等原始區塊的整理

use crate::core::amount::{format_amount, parse_amount};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// 欄位名稱包含這些字樣時視為原始區塊
pub const RAW_BLOCK_MARKERS: &[&str] = &[
    "Bill Breakup Details Raw",
    "Medication Details Raw",
    "Repair Items Raw",
    "Loss Details Raw",
    "Cost Details Raw",
];

pub fn is_raw_block(field: &str) -> bool {
    RAW_BLOCK_MARKERS.iter().any(|marker| field.contains(marker))
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid line item regex")
}

static CONTINUATION_END: LazyLock<Regex> = LazyLock::new(|| regex(r"[(,:\-]$"));
static QUOTE_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| regex(r#""\s*\n\s*""#));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| regex(r"\s{2,}"));

static BILL_ITEM: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"(?is)(\d+)\s*.*?\s*"([^"]*?)".*?([\d,]+(?:\.\d{1,2})?)\b"#));
static REPAIR_TOTAL: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)Total Repair Cost[:\s₹Rs.]*[\d,]+"));
static MOTOR_REPAIR: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(\d+)\s+([A-Za-z0-9(),\s/\\.&-]+?)\s+(\d+)\s+([\d,]+)"));
static PHARMACY_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(\d+)\s+(Tab\.|Cap\.|Syp\.|Inj\.|Oint\.|Cream\.)\s+([A-Za-z0-9\s.\-]+?)\s+\d+\s+\d+\s+([\d,]+(?:\.\d{1,2})?)")
});
static SIMPLE_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| regex(r"([A-Za-z0-9\s,()/\-]+?)\s*:\s*Rs\.?\s*([\d,]+(?:\.\d{1,2})?)"));
static MEDICINE_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(Tab\.|Cap\.|Syp\.|Inj\.|Oint\.|Cream\.)\s+([A-Za-z0-9\s.\-]+):\s*Rs\.?\s*([\d,]+(?:\.\d{1,2})?)")
});

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str().trim())
}

/// 把每筆符合的項目轉成一行，金額合計大於零時加上總計行
fn render_items<'t>(
    items: &[Captures<'t>],
    amount_group: usize,
    line: impl Fn(&Captures<'t>, &str) -> String,
    total_line: impl Fn(&str) -> String,
) -> String {
    let mut formatted = String::new();
    let mut total = 0.0;

    for caps in items {
        if let Some(amount) = parse_amount(group(caps, amount_group)) {
            formatted.push_str(&line(caps, &format_amount(amount)));
            formatted.push('\n');
            total += amount;
        }
    }

    if total > 0.0 {
        formatted.push_str(&total_line(&format_amount(total)));
    }
    formatted
}

/// 斷行的描述接回同一行
fn rejoin_wrapped_lines(block: &str) -> String {
    let mut fixed = Vec::new();
    let mut buffer = String::new();

    for line in block.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if buffer.is_empty() {
            buffer = line.to_string();
        } else if CONTINUATION_END.is_match(&buffer) || buffer.split_whitespace().count() < 3 {
            buffer.push(' ');
            buffer.push_str(line);
        } else {
            fixed.push(std::mem::replace(&mut buffer, line.to_string()));
        }
    }
    if !buffer.is_empty() {
        fixed.push(buffer);
    }

    fixed.join("\n")
}

pub fn format_line_items(block: &str) -> String {
    if block.is_empty() {
        return String::new();
    }

    let joined = rejoin_wrapped_lines(block).replace("Replace- ment", "Replacement");
    let joined = QUOTE_CONTINUATION.replace_all(&joined, " ").into_owned();
    let collapsed = WHITESPACE_RUN.replace_all(&joined, " ").trim().to_string();

    let bills: Vec<_> = BILL_ITEM.captures_iter(&collapsed).collect();
    if !bills.is_empty() {
        return render_items(
            &bills,
            3,
            |caps, amount| format!("- {}: Rs. {}", group(caps, 2), amount),
            |total| format!("- Total: Rs. {}", total),
        );
    }

    let without_total = REPAIR_TOTAL.replace_all(&collapsed, "").into_owned();

    // 藥品表格也符合維修項目的樣式，要先試
    let pharmacy: Vec<_> = PHARMACY_ITEM.captures_iter(&without_total).collect();
    if !pharmacy.is_empty() {
        return render_items(
            &pharmacy,
            4,
            |caps, amount| {
                format!(
                    "{}. {} {} - Rs. {}",
                    group(caps, 1),
                    group(caps, 2),
                    group(caps, 3),
                    amount
                )
            },
            |total| format!("Total: Rs. {}", total),
        );
    }

    let repairs: Vec<_> = MOTOR_REPAIR.captures_iter(&without_total).collect();
    if !repairs.is_empty() {
        return render_items(
            &repairs,
            4,
            |caps, amount| {
                format!(
                    "{}. {} - Qty: {}, Cost: Rs. {}",
                    group(caps, 1),
                    group(caps, 2),
                    group(caps, 3),
                    amount
                )
            },
            |total| format!("\nTotal Repair Cost: Rs. {}", total),
        );
    }

    let simple: Vec<_> = SIMPLE_AMOUNT.captures_iter(&without_total).collect();
    if !simple.is_empty() {
        return render_items(
            &simple,
            2,
            |caps, amount| format!("- {}: Rs. {}", group(caps, 1), amount),
            |total| format!("- Total: Rs. {}", total),
        );
    }

    let medicines: Vec<_> = MEDICINE_AMOUNT.captures_iter(&without_total).collect();
    if !medicines.is_empty() {
        return render_items(
            &medicines,
            3,
            |caps, amount| format!("• {} {} - ₹{}", group(caps, 1), group(caps, 2), amount),
            |total| format!("Total: ₹{}", total),
        );
    }

    let raw = without_total.trim().replace(['\n', '\r'], " ");
    if raw.is_empty() {
        String::new()
    } else {
        format!("- {}", raw)
    }
}
