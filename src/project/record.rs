use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculator::{derive, LedgerFigures, LedgerInputs};
use super::input::{
    BalancePaymentInput, BuyerAdvanceInput, BuyerInput, BuyerProformaInput, CostingInput,
    ExpensesInput, ProjectInput, SupplierAdvanceInput, SupplierInput, SupplierProformaInput,
};

/// A fully computed project as stored and reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_name: String,
    pub project_no: String,
    pub project_date: NaiveDate,
    #[serde(default)]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub supplier: Supplier,
    pub buyer: Buyer,
    pub costing: Costing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub proforma_invoice: SupplierProforma,
    pub advance_payment: SupplierAdvance,
    pub balance_payment: BalancePayment,
    pub summary: SupplierSummary,
    pub payment_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierProforma {
    pub supplier_name: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_amount: Decimal,
    pub credit_note: Decimal,
    pub final_invoice_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierAdvance {
    pub loan_amount: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub reference: Option<String>,
    pub twl_contribution: Decimal,
    pub total_payment: Decimal,
    pub balance_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePayment {
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub reference: Option<String>,
    pub twl_contribution: Decimal,
    pub total_payment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierSummary {
    pub total_amount: Decimal,
    pub cancel_amount: Decimal,
    pub balance_payment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buyer {
    pub proforma_invoice: BuyerProforma,
    pub advance_payment: BuyerAdvance,
    pub balance_payment: BalancePayment,
    pub summary: BuyerSummary,
    pub payment_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerProforma {
    pub buyer_name: Option<String>,
    pub invoice_no: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub invoice_amount: Decimal,
    pub credit_note: Decimal,
    pub final_invoice_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerAdvance {
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerSummary {
    pub total_received: Decimal,
    pub cancel_amount: Decimal,
    pub balance_received: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Costing {
    pub supplier_invoice_amount: Decimal,
    pub twl_invoice_amount: Decimal,
    pub profit: Decimal,
    pub expenses: ExpenseItems,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    /// Fixed-point text, e.g. "12.50", or "0" when nothing was paid out.
    pub profit_percentage: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItems {
    pub in_going: Decimal,
    pub out_going: Decimal,
    pub cal_charges: Decimal,
    pub other: Decimal,
    pub foreign_bank_charges: Decimal,
    pub loan_interest: Decimal,
    pub freight_charges: Decimal,
}

/// Identity fields that must be present before a record can exist.
#[derive(Debug, Clone)]
pub struct Identity {
    pub project_name: String,
    pub project_no: String,
    pub project_date: NaiveDate,
}

/// Bookkeeping set by the service, never by input.
#[derive(Debug, Clone)]
pub struct RecordMeta {
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// Compute every derived figure from `input` and assemble the record.
    pub fn build(identity: Identity, input: &ProjectInput, meta: RecordMeta) -> Self {
        let inputs = LedgerInputs::from(input);
        let figures = derive(&inputs);
        Self::assemble(identity, input, &inputs, &figures, meta)
    }

    fn assemble(
        identity: Identity,
        input: &ProjectInput,
        raw: &LedgerInputs,
        fig: &LedgerFigures,
        meta: RecordMeta,
    ) -> Self {
        let s = &input.supplier;
        let b = &input.buyer;
        let c = &input.costing;

        Self {
            project_name: identity.project_name,
            project_no: identity.project_no,
            project_date: identity.project_date,
            supplier: Supplier {
                proforma_invoice: SupplierProforma {
                    supplier_name: s.proforma_invoice.supplier_name.clone(),
                    invoice_number: s.proforma_invoice.invoice_number.clone(),
                    invoice_amount: raw.supplier_invoice_amount,
                    credit_note: raw.supplier_credit_note,
                    final_invoice_amount: fig.supplier_final_invoice,
                },
                advance_payment: SupplierAdvance {
                    loan_amount: raw.supplier_loan_amount,
                    payment_date: s.advance_payment.payment_date,
                    reference: s.advance_payment.reference.clone(),
                    twl_contribution: raw.supplier_advance_twl,
                    total_payment: fig.supplier_advance_total,
                    balance_amount: fig.supplier_advance_balance,
                },
                balance_payment: BalancePayment {
                    amount: raw.supplier_balance_amount,
                    date: s.balance_payment.date,
                    reference: s.balance_payment.reference.clone(),
                    twl_contribution: raw.supplier_balance_twl,
                    total_payment: fig.supplier_balance_total,
                },
                summary: SupplierSummary {
                    total_amount: fig.supplier_summary_total,
                    cancel_amount: fig.supplier_cancel_amount,
                    balance_payment: fig.supplier_summary_balance,
                },
                payment_total: fig.supplier_payment_total,
            },
            buyer: Buyer {
                proforma_invoice: BuyerProforma {
                    buyer_name: b.proforma_invoice.buyer_name.clone(),
                    invoice_no: b.proforma_invoice.invoice_no.clone(),
                    invoice_date: b.proforma_invoice.invoice_date,
                    invoice_amount: raw.buyer_invoice_amount,
                    credit_note: raw.buyer_credit_note,
                    final_invoice_amount: fig.buyer_final_invoice,
                },
                advance_payment: BuyerAdvance {
                    amount: raw.buyer_advance_amount,
                    date: b.advance_payment.date,
                    reference: b.advance_payment.reference.clone(),
                },
                balance_payment: BalancePayment {
                    amount: raw.buyer_balance_amount,
                    date: b.balance_payment.date,
                    reference: b.balance_payment.reference.clone(),
                    twl_contribution: raw.buyer_balance_twl,
                    total_payment: fig.buyer_balance_total,
                },
                summary: BuyerSummary {
                    total_received: fig.buyer_payment_total,
                    cancel_amount: fig.buyer_cancel_amount,
                    balance_received: fig.buyer_balance_received,
                },
                payment_total: fig.buyer_payment_total,
            },
            costing: Costing {
                supplier_invoice_amount: raw.costing_supplier_invoice_amount,
                twl_invoice_amount: raw.costing_twl_invoice_amount,
                profit: fig.profit,
                expenses: ExpenseItems {
                    in_going: raw.expenses.in_going,
                    out_going: raw.expenses.out_going,
                    cal_charges: raw.expenses.cal_charges,
                    other: raw.expenses.other,
                    foreign_bank_charges: raw.expenses.foreign_bank_charges,
                    loan_interest: raw.expenses.loan_interest,
                    freight_charges: raw.expenses.freight_charges,
                },
                total_expenses: fig.total_expenses,
                net_profit: fig.net_profit,
                profit_percentage: fig.profit_percentage.clone(),
                notes: c.notes.clone(),
            },
            created_by: meta.created_by,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }

    /// The raw fields of this record, with every derived figure dropped.
    /// Feeding this back through [`ProjectRecord::build`] is how updates
    /// recompute against the stored state.
    pub fn to_input(&self) -> ProjectInput {
        let s = &self.supplier;
        let b = &self.buyer;
        let c = &self.costing;

        ProjectInput {
            project_name: Some(self.project_name.clone()),
            project_no: Some(self.project_no.clone()),
            project_date: Some(self.project_date),
            supplier: SupplierInput {
                proforma_invoice: SupplierProformaInput {
                    supplier_name: s.proforma_invoice.supplier_name.clone(),
                    invoice_number: s.proforma_invoice.invoice_number.clone(),
                    invoice_amount: Some(s.proforma_invoice.invoice_amount),
                    credit_note: Some(s.proforma_invoice.credit_note),
                },
                advance_payment: SupplierAdvanceInput {
                    loan_amount: Some(s.advance_payment.loan_amount),
                    payment_date: s.advance_payment.payment_date,
                    reference: s.advance_payment.reference.clone(),
                    twl_contribution: Some(s.advance_payment.twl_contribution),
                },
                balance_payment: s.balance_payment.to_input(),
            },
            buyer: BuyerInput {
                proforma_invoice: BuyerProformaInput {
                    buyer_name: b.proforma_invoice.buyer_name.clone(),
                    invoice_no: b.proforma_invoice.invoice_no.clone(),
                    invoice_date: b.proforma_invoice.invoice_date,
                    invoice_amount: Some(b.proforma_invoice.invoice_amount),
                    credit_note: Some(b.proforma_invoice.credit_note),
                },
                advance_payment: BuyerAdvanceInput {
                    amount: Some(b.advance_payment.amount),
                    date: b.advance_payment.date,
                    reference: b.advance_payment.reference.clone(),
                },
                balance_payment: b.balance_payment.to_input(),
            },
            costing: CostingInput {
                supplier_invoice_amount: Some(c.supplier_invoice_amount),
                twl_invoice_amount: Some(c.twl_invoice_amount),
                expenses: ExpensesInput {
                    in_going: Some(c.expenses.in_going),
                    out_going: Some(c.expenses.out_going),
                    cal_charges: Some(c.expenses.cal_charges),
                    other: Some(c.expenses.other),
                    foreign_bank_charges: Some(c.expenses.foreign_bank_charges),
                    loan_interest: Some(c.expenses.loan_interest),
                    freight_charges: Some(c.expenses.freight_charges),
                },
                notes: c.notes.clone(),
            },
        }
    }

    /// Recompute the derived figures in place from this record's raw fields.
    pub fn recompute(&mut self) {
        let identity = Identity {
            project_name: self.project_name.clone(),
            project_no: self.project_no.clone(),
            project_date: self.project_date,
        };
        let meta = RecordMeta {
            created_by: self.created_by.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        *self = Self::build(identity, &self.to_input(), meta);
    }
}

impl BalancePayment {
    fn to_input(&self) -> BalancePaymentInput {
        BalancePaymentInput {
            amount: Some(self.amount),
            date: self.date,
            reference: self.reference.clone(),
            twl_contribution: Some(self.twl_contribution),
        }
    }
}
