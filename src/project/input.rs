use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::amount;
use crate::error::{LedgerError, Result};

/// Raw, client-editable fields of a project. Used for creates, partial
/// updates and previews alike; every field is optional.
///
/// Derived figures are deliberately absent: a `final_invoice_amount` or
/// `profit` sent by a client is dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectInput {
    pub project_name: Option<String>,
    pub project_no: Option<String>,
    pub project_date: Option<NaiveDate>,
    pub supplier: SupplierInput,
    pub buyer: BuyerInput,
    pub costing: CostingInput,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SupplierInput {
    pub proforma_invoice: SupplierProformaInput,
    pub advance_payment: SupplierAdvanceInput,
    pub balance_payment: BalancePaymentInput,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SupplierProformaInput {
    pub supplier_name: Option<String>,
    pub invoice_number: Option<String>,
    #[serde(deserialize_with = "amount::lenient")]
    pub invoice_amount: Option<Decimal>,
    #[serde(deserialize_with = "amount::lenient")]
    pub credit_note: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SupplierAdvanceInput {
    #[serde(deserialize_with = "amount::lenient")]
    pub loan_amount: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    pub reference: Option<String>,
    #[serde(deserialize_with = "amount::lenient")]
    pub twl_contribution: Option<Decimal>,
}

/// Balance payment block, shared by supplier and buyer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BalancePaymentInput {
    #[serde(deserialize_with = "amount::lenient")]
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub reference: Option<String>,
    #[serde(deserialize_with = "amount::lenient")]
    pub twl_contribution: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuyerInput {
    pub proforma_invoice: BuyerProformaInput,
    pub advance_payment: BuyerAdvanceInput,
    pub balance_payment: BalancePaymentInput,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuyerProformaInput {
    pub buyer_name: Option<String>,
    pub invoice_no: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    #[serde(deserialize_with = "amount::lenient")]
    pub invoice_amount: Option<Decimal>,
    #[serde(deserialize_with = "amount::lenient")]
    pub credit_note: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuyerAdvanceInput {
    #[serde(deserialize_with = "amount::lenient")]
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CostingInput {
    #[serde(deserialize_with = "amount::lenient")]
    pub supplier_invoice_amount: Option<Decimal>,
    #[serde(deserialize_with = "amount::lenient")]
    pub twl_invoice_amount: Option<Decimal>,
    pub expenses: ExpensesInput,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExpensesInput {
    #[serde(deserialize_with = "amount::lenient")]
    pub in_going: Option<Decimal>,
    #[serde(deserialize_with = "amount::lenient")]
    pub out_going: Option<Decimal>,
    #[serde(deserialize_with = "amount::lenient")]
    pub cal_charges: Option<Decimal>,
    #[serde(deserialize_with = "amount::lenient")]
    pub other: Option<Decimal>,
    #[serde(deserialize_with = "amount::lenient")]
    pub foreign_bank_charges: Option<Decimal>,
    #[serde(deserialize_with = "amount::lenient")]
    pub loan_interest: Option<Decimal>,
    #[serde(deserialize_with = "amount::lenient")]
    pub freight_charges: Option<Decimal>,
}

/// Overlay `patch` onto `base`: every field the patch carries wins.
fn overlay<T>(base: &mut Option<T>, patch: Option<T>) {
    if patch.is_some() {
        *base = patch;
    }
}

impl ProjectInput {
    /// Merge a partial update onto this input, field by field.
    pub fn merge(&mut self, patch: ProjectInput) {
        overlay(&mut self.project_name, patch.project_name);
        overlay(&mut self.project_no, patch.project_no);
        overlay(&mut self.project_date, patch.project_date);
        self.supplier.merge(patch.supplier);
        self.buyer.merge(patch.buyer);
        self.costing.merge(patch.costing);
    }

    /// Load input from a `.json` file, or TOML for any other extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|reason| LedgerError::InputParse {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Build input from `path=value` assignments such as
    /// `supplier.advance_payment.loan_amount=500`.
    pub fn from_assignments(assignments: &[String]) -> Result<Self> {
        let mut root = toml::Table::new();

        for assignment in assignments {
            let (path, value) = parse_assignment(assignment)?;
            insert_path(&mut root, &path, value)
                .map_err(|_| LedgerError::InvalidAssignment(assignment.clone()))?;
        }

        toml::Value::Table(root)
            .try_into()
            .map_err(|e: toml::de::Error| LedgerError::InvalidFields(e.message().to_string()))
    }

    /// Combine an optional file with `--set` assignments; assignments win.
    pub fn from_sources(file: Option<&Path>, assignments: &[String]) -> Result<Self> {
        let mut input = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if !assignments.is_empty() {
            input.merge(Self::from_assignments(assignments)?);
        }
        Ok(input)
    }
}

impl SupplierInput {
    fn merge(&mut self, patch: SupplierInput) {
        let pi = patch.proforma_invoice;
        overlay(&mut self.proforma_invoice.supplier_name, pi.supplier_name);
        overlay(&mut self.proforma_invoice.invoice_number, pi.invoice_number);
        overlay(&mut self.proforma_invoice.invoice_amount, pi.invoice_amount);
        overlay(&mut self.proforma_invoice.credit_note, pi.credit_note);

        let adv = patch.advance_payment;
        overlay(&mut self.advance_payment.loan_amount, adv.loan_amount);
        overlay(&mut self.advance_payment.payment_date, adv.payment_date);
        overlay(&mut self.advance_payment.reference, adv.reference);
        overlay(&mut self.advance_payment.twl_contribution, adv.twl_contribution);

        self.balance_payment.merge(patch.balance_payment);
    }
}

impl BuyerInput {
    fn merge(&mut self, patch: BuyerInput) {
        let pi = patch.proforma_invoice;
        overlay(&mut self.proforma_invoice.buyer_name, pi.buyer_name);
        overlay(&mut self.proforma_invoice.invoice_no, pi.invoice_no);
        overlay(&mut self.proforma_invoice.invoice_date, pi.invoice_date);
        overlay(&mut self.proforma_invoice.invoice_amount, pi.invoice_amount);
        overlay(&mut self.proforma_invoice.credit_note, pi.credit_note);

        let adv = patch.advance_payment;
        overlay(&mut self.advance_payment.amount, adv.amount);
        overlay(&mut self.advance_payment.date, adv.date);
        overlay(&mut self.advance_payment.reference, adv.reference);

        self.balance_payment.merge(patch.balance_payment);
    }
}

impl BalancePaymentInput {
    fn merge(&mut self, patch: BalancePaymentInput) {
        overlay(&mut self.amount, patch.amount);
        overlay(&mut self.date, patch.date);
        overlay(&mut self.reference, patch.reference);
        overlay(&mut self.twl_contribution, patch.twl_contribution);
    }
}

impl CostingInput {
    fn merge(&mut self, patch: CostingInput) {
        overlay(&mut self.supplier_invoice_amount, patch.supplier_invoice_amount);
        overlay(&mut self.twl_invoice_amount, patch.twl_invoice_amount);
        overlay(&mut self.notes, patch.notes);

        let e = patch.expenses;
        overlay(&mut self.expenses.in_going, e.in_going);
        overlay(&mut self.expenses.out_going, e.out_going);
        overlay(&mut self.expenses.cal_charges, e.cal_charges);
        overlay(&mut self.expenses.other, e.other);
        overlay(&mut self.expenses.foreign_bank_charges, e.foreign_bank_charges);
        overlay(&mut self.expenses.loan_interest, e.loan_interest);
        overlay(&mut self.expenses.freight_charges, e.freight_charges);
    }
}

/// Split "a.b.c=value" into (["a", "b", "c"], "value")
fn parse_assignment(input: &str) -> Result<(Vec<&str>, &str)> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| LedgerError::InvalidAssignment(input.to_string()))?;

    let path: Vec<&str> = key.trim().split('.').map(str::trim).collect();
    if path.iter().any(|segment| segment.is_empty()) {
        return Err(LedgerError::InvalidAssignment(input.to_string()));
    }

    Ok((path, value.trim()))
}

/// Insert a string leaf into a nested table, creating intermediate tables.
/// Fails when a path walks through an existing non-table value.
fn insert_path(table: &mut toml::Table, path: &[&str], value: &str) -> std::result::Result<(), ()> {
    let (last, parents) = path.split_last().ok_or(())?;
    let mut current = table;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        current = entry.as_table_mut().ok_or(())?;
    }
    current.insert(last.to_string(), toml::Value::String(value.to_string()));
    Ok(())
}
