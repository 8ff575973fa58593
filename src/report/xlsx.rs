//! Spreadsheet export of computed project records.
//!
//! Two sheets: a one-row-per-project summary with a trailing TOTAL row, and
//! a detail sheet laying out each project's supplier, buyer and costing
//! blocks as label/value pairs.

use chrono::Local;
use log::info;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

use super::{build_report, ReportRow, ReportTotals};
use crate::config::Config;
use crate::error::Result;
use crate::project::ProjectRecord;

const SUMMARY_HEADERS: [&str; 10] = [
    "Project No",
    "Project Name",
    "Date",
    "Supplier Final Invoice",
    "Supplier Paid",
    "Buyer Received",
    "Profit",
    "Total Expenses",
    "Net Profit",
    "Profit %",
];

const LAST_COL: u16 = SUMMARY_HEADERS.len() as u16 - 1;

/// Row of the summary sheet holding the column headers.
const HEADER_ROW: u32 = 3;

const NET_GAIN_FILL: u32 = 0x10B981;
const NET_LOSS_FILL: u32 = 0xEF4444;

/// Background of the NET PROFIT cell: green for zero or a gain, red for a loss.
fn net_profit_fill(net_profit: Decimal) -> u32 {
    if net_profit >= Decimal::ZERO {
        NET_GAIN_FILL
    } else {
        NET_LOSS_FILL
    }
}

/// Cell formats shared by both sheets.
struct Styles {
    title: Format,
    subtitle: Format,
    header: Format,
    text: Format,
    money: Format,
    total_label: Format,
    total_money: Format,
    project_header: Format,
    section: Format,
    label: Format,
    net_profit_gain: Format,
    net_profit_loss: Format,
}

impl Styles {
    fn new(currency_symbol: &str) -> Self {
        let pattern = money_pattern(currency_symbol);
        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(18.0)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(0x667EEA))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            subtitle: Format::new()
                .set_italic()
                .set_font_size(11.0)
                .set_align(FormatAlign::Center),
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xE6FFFA))
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
            money: Format::new()
                .set_border(FormatBorder::Thin)
                .set_num_format(&pattern),
            total_label: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xFDE68A))
                .set_border(FormatBorder::Medium),
            total_money: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xFDE68A))
                .set_border(FormatBorder::Medium)
                .set_num_format(&pattern),
            project_header: Format::new()
                .set_bold()
                .set_font_size(14.0)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(0x4A5568)),
            section: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xBEE3F8)),
            label: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xF0FFF4))
                .set_border(FormatBorder::Thin),
            net_profit_gain: Format::new()
                .set_bold()
                .set_font_size(14.0)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(NET_GAIN_FILL))
                .set_border(FormatBorder::Thick)
                .set_num_format(&pattern),
            net_profit_loss: Format::new()
                .set_bold()
                .set_font_size(14.0)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(NET_LOSS_FILL))
                .set_border(FormatBorder::Thick)
                .set_num_format(&pattern),
        }
    }
}

/// Excel number format for money, negatives in red.
fn money_pattern(currency_symbol: &str) -> String {
    let symbol = currency_symbol.replace('"', "");
    let pos = format!("\"{symbol}\"#,##0.00");
    format!("{pos};[Red]-{pos}")
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Write the projects report to `path`. Returns the number of project rows.
pub fn export_xlsx(records: &[ProjectRecord], config: &Config, path: &Path) -> Result<usize> {
    let styles = Styles::new(&config.report.currency_symbol);
    let (rows, totals) = build_report(records);

    let mut workbook = Workbook::new();

    let summary = workbook.add_worksheet();
    summary.set_name("Projects Report")?;
    write_summary_sheet(summary, &config.report.title, &rows, &totals, &styles)?;

    let details = workbook.add_worksheet();
    details.set_name("Project Details")?;
    write_details_sheet(details, records, &styles)?;

    workbook.save(path)?;
    info!("Exported {} projects to {}", rows.len(), path.display());
    Ok(rows.len())
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    title: &str,
    rows: &[ReportRow],
    totals: &ReportTotals,
    styles: &Styles,
) -> Result<()> {
    sheet.set_column_width(0, 15.0)?;
    sheet.set_column_width(1, 24.0)?;
    sheet.set_column_width(2, 12.0)?;
    for col in 3..=LAST_COL {
        sheet.set_column_width(col, 18.0)?;
    }

    sheet.merge_range(0, 0, 0, LAST_COL, title, &styles.title)?;
    sheet.set_row_height(0, 35.0)?;
    let generated = format!("Generated on: {}", Local::now().format("%Y-%m-%d %H:%M"));
    sheet.merge_range(1, 0, 1, LAST_COL, &generated, &styles.subtitle)?;

    let header_row = HEADER_ROW;
    for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(header_row, col as u16, *header, &styles.header)?;
    }

    let mut row = header_row + 1;
    for r in rows {
        sheet.write_string_with_format(row, 0, &r.project_no, &styles.text)?;
        sheet.write_string_with_format(row, 1, &r.project_name, &styles.text)?;
        sheet.write_string_with_format(row, 2, &r.project_date, &styles.text)?;
        let amounts = [
            r.supplier_final_invoice,
            r.supplier_paid,
            r.buyer_received,
            r.profit,
            r.total_expenses,
            r.net_profit,
        ];
        for (offset, amount) in amounts.into_iter().enumerate() {
            sheet.write_number_with_format(row, 3 + offset as u16, to_f64(amount), &styles.money)?;
        }
        sheet.write_string_with_format(
            row,
            LAST_COL,
            format!("{}%", r.profit_percentage),
            &styles.text,
        )?;
        row += 1;
    }

    sheet.merge_range(
        row,
        0,
        row,
        2,
        &format!("TOTAL ({} projects)", totals.projects),
        &styles.total_label,
    )?;
    let sums = [
        totals.supplier_final_invoice,
        totals.supplier_paid,
        totals.buyer_received,
        totals.profit,
        totals.total_expenses,
        totals.net_profit,
    ];
    for (offset, amount) in sums.into_iter().enumerate() {
        sheet.write_number_with_format(row, 3 + offset as u16, to_f64(amount), &styles.total_money)?;
    }
    sheet.write_blank(row, LAST_COL, &styles.total_label)?;

    sheet.set_freeze_panes(header_row + 1, 0)?;
    Ok(())
}

/// A label/value pair in the detail sheet.
enum Cell<'a> {
    Text(&'a str),
    Money(Decimal),
}

fn write_pairs(
    sheet: &mut Worksheet,
    row: &mut u32,
    pairs: &[(&str, Cell<'_>)],
    styles: &Styles,
) -> Result<()> {
    for chunk in pairs.chunks(2) {
        for (idx, (label, value)) in chunk.iter().enumerate() {
            let col = (idx * 2) as u16;
            sheet.write_string_with_format(*row, col, *label, &styles.label)?;
            match value {
                Cell::Text(text) => {
                    sheet.write_string_with_format(*row, col + 1, *text, &styles.text)?;
                }
                Cell::Money(amount) => {
                    sheet.write_number_with_format(*row, col + 1, to_f64(*amount), &styles.money)?;
                }
            }
        }
        *row += 1;
    }
    Ok(())
}

fn write_section(sheet: &mut Worksheet, row: &mut u32, title: &str, styles: &Styles) -> Result<()> {
    sheet.merge_range(*row, 0, *row, 3, title, &styles.section)?;
    *row += 1;
    Ok(())
}

fn text_or_na(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("N/A")
}

fn write_details_sheet(sheet: &mut Worksheet, records: &[ProjectRecord], styles: &Styles) -> Result<()> {
    for col in 0..4u16 {
        sheet.set_column_width(col, 22.0)?;
    }

    let mut row: u32 = 0;
    for record in records {
        let title = format!("PROJECT: {} ({})", record.project_name, record.project_no);
        sheet.merge_range(row, 0, row, 3, &title, &styles.project_header)?;
        sheet.set_row_height(row, 25.0)?;
        row += 1;
        let date = record.project_date.to_string();
        write_pairs(sheet, &mut row, &[("Date", Cell::Text(&date))], styles)?;
        row += 1;

        let s = &record.supplier;
        write_section(sheet, &mut row, "SUPPLIER - Proforma Invoice", styles)?;
        write_pairs(
            sheet,
            &mut row,
            &[
                ("Supplier Name", Cell::Text(text_or_na(&s.proforma_invoice.supplier_name))),
                ("Invoice Number", Cell::Text(text_or_na(&s.proforma_invoice.invoice_number))),
                ("Invoice Amount", Cell::Money(s.proforma_invoice.invoice_amount)),
                ("Credit Note", Cell::Money(s.proforma_invoice.credit_note)),
                ("Final Invoice", Cell::Money(s.proforma_invoice.final_invoice_amount)),
            ],
            styles,
        )?;
        write_section(sheet, &mut row, "SUPPLIER - Advance Payment", styles)?;
        write_pairs(
            sheet,
            &mut row,
            &[
                ("Loan Amount", Cell::Money(s.advance_payment.loan_amount)),
                ("TWL Contribution", Cell::Money(s.advance_payment.twl_contribution)),
                ("Total Payment", Cell::Money(s.advance_payment.total_payment)),
                ("Balance Amount", Cell::Money(s.advance_payment.balance_amount)),
            ],
            styles,
        )?;
        write_section(sheet, &mut row, "SUPPLIER - Balance Payment", styles)?;
        write_pairs(
            sheet,
            &mut row,
            &[
                ("Amount", Cell::Money(s.balance_payment.amount)),
                ("TWL Contribution", Cell::Money(s.balance_payment.twl_contribution)),
                ("Total Payment", Cell::Money(s.balance_payment.total_payment)),
            ],
            styles,
        )?;
        write_section(sheet, &mut row, "SUPPLIER - Summary", styles)?;
        write_pairs(
            sheet,
            &mut row,
            &[
                ("Total Amount", Cell::Money(s.summary.total_amount)),
                ("Cancel Amount", Cell::Money(s.summary.cancel_amount)),
                ("Balance Payment", Cell::Money(s.summary.balance_payment)),
            ],
            styles,
        )?;
        row += 1;

        let b = &record.buyer;
        write_section(sheet, &mut row, "BUYER - Proforma Invoice", styles)?;
        write_pairs(
            sheet,
            &mut row,
            &[
                ("Buyer Name", Cell::Text(text_or_na(&b.proforma_invoice.buyer_name))),
                ("Invoice No", Cell::Text(text_or_na(&b.proforma_invoice.invoice_no))),
                ("Invoice Amount", Cell::Money(b.proforma_invoice.invoice_amount)),
                ("Credit Note", Cell::Money(b.proforma_invoice.credit_note)),
                ("Final Invoice", Cell::Money(b.proforma_invoice.final_invoice_amount)),
            ],
            styles,
        )?;
        write_section(sheet, &mut row, "BUYER - Payments", styles)?;
        write_pairs(
            sheet,
            &mut row,
            &[
                ("Advance Amount", Cell::Money(b.advance_payment.amount)),
                ("Balance Amount", Cell::Money(b.balance_payment.amount)),
                ("Balance TWL Contribution", Cell::Money(b.balance_payment.twl_contribution)),
                ("Balance Total Payment", Cell::Money(b.balance_payment.total_payment)),
            ],
            styles,
        )?;
        write_section(sheet, &mut row, "BUYER - Summary", styles)?;
        write_pairs(
            sheet,
            &mut row,
            &[
                ("Total Received", Cell::Money(b.summary.total_received)),
                ("Cancel", Cell::Money(b.summary.cancel_amount)),
                ("Balance Received", Cell::Money(b.summary.balance_received)),
            ],
            styles,
        )?;
        row += 1;

        let c = &record.costing;
        let pct = format!("{}%", c.profit_percentage);
        write_section(sheet, &mut row, "COSTING & PROFITABILITY", styles)?;
        write_pairs(
            sheet,
            &mut row,
            &[
                ("Supplier Invoice Amount", Cell::Money(c.supplier_invoice_amount)),
                ("TWL Invoice Amount", Cell::Money(c.twl_invoice_amount)),
                ("PROFIT", Cell::Money(c.profit)),
                ("Profit %", Cell::Text(&pct)),
            ],
            styles,
        )?;
        write_section(sheet, &mut row, "EXPENSES BREAKDOWN", styles)?;
        let e = &c.expenses;
        write_pairs(
            sheet,
            &mut row,
            &[
                ("In Going", Cell::Money(e.in_going)),
                ("Out Going", Cell::Money(e.out_going)),
                ("CAL Charges", Cell::Money(e.cal_charges)),
                ("Other", Cell::Money(e.other)),
                ("Foreign Bank Charges", Cell::Money(e.foreign_bank_charges)),
                ("Loan Interest", Cell::Money(e.loan_interest)),
                ("Freight Charges", Cell::Money(e.freight_charges)),
                ("TOTAL EXPENSES", Cell::Money(c.total_expenses)),
            ],
            styles,
        )?;
        if let Some(notes) = c.notes.as_deref().filter(|n| !n.is_empty()) {
            write_pairs(sheet, &mut row, &[("Notes", Cell::Text(notes))], styles)?;
        }

        let net_format = if net_profit_fill(c.net_profit) == NET_GAIN_FILL {
            &styles.net_profit_gain
        } else {
            &styles.net_profit_loss
        };
        sheet.write_string_with_format(row, 0, "NET PROFIT", net_format)?;
        sheet.write_number_with_format(row, 1, to_f64(c.net_profit), net_format)?;
        sheet.set_row_height(row, 30.0)?;

        // Spacer between projects
        row += 4;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{preview, ProjectInput};
    use calamine::{open_workbook_auto, Data, Range, Reader};
    use tempfile::TempDir;

    fn test_config() -> Config {
        toml::from_str(crate::config::CONFIG_TEMPLATE).unwrap()
    }

    #[test]
    fn money_pattern_quotes_symbol() {
        assert_eq!(money_pattern("$"), "\"$\"#,##0.00;[Red]-\"$\"#,##0.00");
    }

    fn record(no: &str, supplier_paid: &str, buyer_received: &str, expenses: &str) -> ProjectRecord {
        let input = ProjectInput::from_assignments(&[
            format!("project_no={no}"),
            "project_name=Sugar".to_string(),
            format!("supplier.advance_payment.loan_amount={supplier_paid}"),
            format!("buyer.advance_payment.amount={buyer_received}"),
            format!("costing.expenses.other={expenses}"),
        ])
        .unwrap();
        preview(&input)
    }

    fn text(range: &Range<Data>, row: u32, col: u32) -> String {
        match range.get_value((row, col)) {
            Some(Data::String(s)) => s.clone(),
            other => panic!("expected text at ({row}, {col}), got {other:?}"),
        }
    }

    fn number(range: &Range<Data>, row: u32, col: u32) -> f64 {
        match range.get_value((row, col)) {
            Some(Data::Float(n)) => *n,
            other => panic!("expected number at ({row}, {col}), got {other:?}"),
        }
    }

    #[test]
    fn net_profit_fill_follows_sign() {
        assert_eq!(net_profit_fill(Decimal::new(150, 0)), NET_GAIN_FILL);
        assert_eq!(net_profit_fill(Decimal::ZERO), NET_GAIN_FILL);
        assert_eq!(net_profit_fill(Decimal::new(-1, 2)), NET_LOSS_FILL);
    }

    #[test]
    fn summary_sheet_has_rows_and_totals() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        let records = vec![record("A", "1000", "1200", "50"), record("B", "500", "400", "0")];
        let config = test_config();

        let written = export_xlsx(&records, &config, &path).unwrap();
        assert_eq!(written, 2);

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec!["Projects Report".to_string(), "Project Details".to_string()]
        );
        let range = workbook.worksheet_range("Projects Report").unwrap();

        assert_eq!(text(&range, 0, 0), config.report.title);
        assert!(text(&range, 1, 0).starts_with("Generated on: "));
        for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
            assert_eq!(text(&range, HEADER_ROW, col as u32), *header);
        }

        // Project rows: supplier paid, buyer received, profit, expenses, net, pct
        let first = HEADER_ROW + 1;
        assert_eq!(text(&range, first, 0), "A");
        assert_eq!(number(&range, first, 4), 1000.0);
        assert_eq!(number(&range, first, 5), 1200.0);
        assert_eq!(number(&range, first, 6), 200.0);
        assert_eq!(number(&range, first, 7), 50.0);
        assert_eq!(number(&range, first, 8), 150.0);
        assert_eq!(text(&range, first, 9), "20.00%");
        assert_eq!(text(&range, first + 1, 0), "B");
        assert_eq!(number(&range, first + 1, 6), -100.0);
        assert_eq!(text(&range, first + 1, 9), "-20.00%");

        let total = first + 2;
        assert_eq!(text(&range, total, 0), "TOTAL (2 projects)");
        assert_eq!(number(&range, total, 4), 1500.0);
        assert_eq!(number(&range, total, 5), 1600.0);
        assert_eq!(number(&range, total, 6), 100.0);
        assert_eq!(number(&range, total, 7), 50.0);
        assert_eq!(number(&range, total, 8), 50.0);
    }

    #[test]
    fn details_sheet_has_net_profit_per_project() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        let records = vec![record("A", "1000", "1200", "50"), record("B", "500", "400", "0")];
        export_xlsx(&records, &test_config(), &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range("Project Details").unwrap();

        assert_eq!(text(&range, 0, 0), "PROJECT: Sugar (A)");
        let net: Vec<f64> = range
            .cells()
            .filter(|(_, _, cell)| matches!(cell, Data::String(s) if s == "NET PROFIT"))
            .map(|(row, col, _)| match range.get((row, col + 1)) {
                Some(Data::Float(n)) => *n,
                other => panic!("expected net profit value, got {other:?}"),
            })
            .collect();
        assert_eq!(net, vec![150.0, -100.0]);
    }

    #[test]
    fn exports_empty_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.xlsx");
        assert_eq!(export_xlsx(&[], &test_config(), &path).unwrap(), 0);
        assert!(path.exists());
    }
}
