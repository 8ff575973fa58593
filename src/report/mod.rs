mod xlsx;

pub use xlsx::export_xlsx;

use log::warn;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::project::ProjectRecord;

/// One project in the report. Every figure is read from the stored record;
/// nothing is recomputed here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub project_no: String,
    pub project_name: String,
    pub project_date: String,
    pub supplier_final_invoice: Decimal,
    pub supplier_paid: Decimal,
    pub buyer_received: Decimal,
    pub profit: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    pub profit_percentage: String,
}

impl From<&ProjectRecord> for ReportRow {
    fn from(record: &ProjectRecord) -> Self {
        Self {
            project_no: record.project_no.clone(),
            project_name: record.project_name.clone(),
            project_date: record.project_date.to_string(),
            supplier_final_invoice: record.supplier.proforma_invoice.final_invoice_amount,
            supplier_paid: record.supplier.payment_total,
            buyer_received: record.buyer.payment_total,
            profit: record.costing.profit,
            total_expenses: record.costing.total_expenses,
            net_profit: record.costing.net_profit,
            profit_percentage: record.costing.profit_percentage.clone(),
        }
    }
}

/// Trailing aggregate row: sums of the money columns. Percentages are not
/// additive and are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTotals {
    pub projects: usize,
    pub supplier_final_invoice: Decimal,
    pub supplier_paid: Decimal,
    pub buyer_received: Decimal,
    pub profit: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
}

/// Running column sum. Stored records are not guaranteed to be in range
/// (`projects.toml` may be edited by hand), so an overflowing sum saturates.
fn add(total: Decimal, value: Decimal) -> Decimal {
    total.checked_add(value).unwrap_or_else(|| {
        warn!("Report total overflowed adding {value}; saturating");
        total.saturating_add(value)
    })
}

impl ReportTotals {
    pub fn from_rows(rows: &[ReportRow]) -> Self {
        rows.iter().fold(Self::default(), |acc, row| Self {
            projects: acc.projects + 1,
            supplier_final_invoice: add(acc.supplier_final_invoice, row.supplier_final_invoice),
            supplier_paid: add(acc.supplier_paid, row.supplier_paid),
            buyer_received: add(acc.buyer_received, row.buyer_received),
            profit: add(acc.profit, row.profit),
            total_expenses: add(acc.total_expenses, row.total_expenses),
            net_profit: add(acc.net_profit, row.net_profit),
        })
    }
}

/// Rows for `records` plus their aggregate.
pub fn build_report(records: &[ProjectRecord]) -> (Vec<ReportRow>, ReportTotals) {
    let rows: Vec<ReportRow> = records.iter().map(ReportRow::from).collect();
    let totals = ReportTotals::from_rows(&rows);
    (rows, totals)
}

pub fn format_grouped_int(value: i128) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimal places and thousands separators,
/// e.g. `-$1,250.50`.
pub fn format_money(value: Decimal, currency_symbol: &str) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let grouped = format_grouped_int(whole.parse::<i128>().unwrap_or(0));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{currency_symbol}{grouped}.{frac}")
}

/// Percentage text as stored, with a trailing `%`.
pub fn format_percentage(stored: &str) -> String {
    format!("{stored}%")
}
