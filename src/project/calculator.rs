//! Derived financial figures for a project.
//!
//! [`derive`] is a pure function over [`LedgerInputs`]; it runs on every
//! create, update and preview, and nothing it produces is ever taken from
//! client input.

use rust_decimal::{Decimal, RoundingStrategy};

use super::amount::bound;
use super::input::ProjectInput;

/// Every raw monetary input of a project, with absent values already zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerInputs {
    pub supplier_invoice_amount: Decimal,
    pub supplier_credit_note: Decimal,
    pub supplier_loan_amount: Decimal,
    pub supplier_advance_twl: Decimal,
    pub supplier_balance_amount: Decimal,
    pub supplier_balance_twl: Decimal,

    pub buyer_invoice_amount: Decimal,
    pub buyer_credit_note: Decimal,
    pub buyer_advance_amount: Decimal,
    pub buyer_balance_amount: Decimal,
    pub buyer_balance_twl: Decimal,

    pub costing_supplier_invoice_amount: Decimal,
    pub costing_twl_invoice_amount: Decimal,
    pub expenses: Expenses,
}

/// The seven itemised costing expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expenses {
    pub in_going: Decimal,
    pub out_going: Decimal,
    pub cal_charges: Decimal,
    pub other: Decimal,
    pub foreign_bank_charges: Decimal,
    pub loan_interest: Decimal,
    pub freight_charges: Decimal,
}

impl Expenses {
    pub fn total(&self) -> Decimal {
        self.in_going
            + self.out_going
            + self.cal_charges
            + self.other
            + self.foreign_bank_charges
            + self.loan_interest
            + self.freight_charges
    }
}

impl LedgerInputs {
    /// Every amount passed through [`bound`].
    pub fn bounded(&self) -> Self {
        let e = &self.expenses;
        Self {
            supplier_invoice_amount: bound(self.supplier_invoice_amount),
            supplier_credit_note: bound(self.supplier_credit_note),
            supplier_loan_amount: bound(self.supplier_loan_amount),
            supplier_advance_twl: bound(self.supplier_advance_twl),
            supplier_balance_amount: bound(self.supplier_balance_amount),
            supplier_balance_twl: bound(self.supplier_balance_twl),

            buyer_invoice_amount: bound(self.buyer_invoice_amount),
            buyer_credit_note: bound(self.buyer_credit_note),
            buyer_advance_amount: bound(self.buyer_advance_amount),
            buyer_balance_amount: bound(self.buyer_balance_amount),
            buyer_balance_twl: bound(self.buyer_balance_twl),

            costing_supplier_invoice_amount: bound(self.costing_supplier_invoice_amount),
            costing_twl_invoice_amount: bound(self.costing_twl_invoice_amount),
            expenses: Expenses {
                in_going: bound(e.in_going),
                out_going: bound(e.out_going),
                cal_charges: bound(e.cal_charges),
                other: bound(e.other),
                foreign_bank_charges: bound(e.foreign_bank_charges),
                loan_interest: bound(e.loan_interest),
                freight_charges: bound(e.freight_charges),
            },
        }
    }
}

impl From<&ProjectInput> for LedgerInputs {
    fn from(input: &ProjectInput) -> Self {
        let zero = |v: Option<Decimal>| bound(v.unwrap_or(Decimal::ZERO));
        let s = &input.supplier;
        let b = &input.buyer;
        let c = &input.costing;
        let e = &c.expenses;

        Self {
            supplier_invoice_amount: zero(s.proforma_invoice.invoice_amount),
            supplier_credit_note: zero(s.proforma_invoice.credit_note),
            supplier_loan_amount: zero(s.advance_payment.loan_amount),
            supplier_advance_twl: zero(s.advance_payment.twl_contribution),
            supplier_balance_amount: zero(s.balance_payment.amount),
            supplier_balance_twl: zero(s.balance_payment.twl_contribution),

            buyer_invoice_amount: zero(b.proforma_invoice.invoice_amount),
            buyer_credit_note: zero(b.proforma_invoice.credit_note),
            buyer_advance_amount: zero(b.advance_payment.amount),
            buyer_balance_amount: zero(b.balance_payment.amount),
            buyer_balance_twl: zero(b.balance_payment.twl_contribution),

            costing_supplier_invoice_amount: zero(c.supplier_invoice_amount),
            costing_twl_invoice_amount: zero(c.twl_invoice_amount),
            expenses: Expenses {
                in_going: zero(e.in_going),
                out_going: zero(e.out_going),
                cal_charges: zero(e.cal_charges),
                other: zero(e.other),
                foreign_bank_charges: zero(e.foreign_bank_charges),
                loan_interest: zero(e.loan_interest),
                freight_charges: zero(e.freight_charges),
            },
        }
    }
}

/// Every derived figure of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFigures {
    pub supplier_final_invoice: Decimal,
    pub supplier_advance_total: Decimal,
    pub supplier_advance_balance: Decimal,
    pub supplier_balance_total: Decimal,
    pub supplier_summary_total: Decimal,
    pub supplier_cancel_amount: Decimal,
    pub supplier_summary_balance: Decimal,
    pub supplier_payment_total: Decimal,

    pub buyer_final_invoice: Decimal,
    pub buyer_balance_total: Decimal,
    pub buyer_payment_total: Decimal,
    pub buyer_cancel_amount: Decimal,
    pub buyer_balance_received: Decimal,

    pub total_expenses: Decimal,
    pub profit: Decimal,
    pub profit_percentage: String,
    pub net_profit: Decimal,
}

/// Compute all derived figures. Each step only reads raw inputs or figures
/// computed before it.
///
/// Inputs are bounded first, so no step can overflow. Inputs built from a
/// [`ProjectInput`] are already bounded and pass through unchanged.
pub fn derive(inputs: &LedgerInputs) -> LedgerFigures {
    let inputs = &inputs.bounded();

    // Supplier
    let supplier_final_invoice = inputs.supplier_invoice_amount - inputs.supplier_credit_note;
    let supplier_advance_total = inputs.supplier_loan_amount + inputs.supplier_advance_twl;
    let supplier_advance_balance = supplier_final_invoice - supplier_advance_total;
    let supplier_balance_total = inputs.supplier_balance_amount + inputs.supplier_balance_twl;
    let supplier_summary_total = supplier_advance_total + supplier_balance_total;
    let supplier_cancel_amount = inputs.supplier_credit_note - supplier_summary_total;
    let supplier_summary_balance = supplier_final_invoice - supplier_summary_total;
    let supplier_payment_total = supplier_summary_total;

    // Buyer
    let buyer_balance_total = inputs.buyer_balance_amount + inputs.buyer_balance_twl;
    let buyer_payment_total = inputs.buyer_advance_amount + buyer_balance_total;
    let buyer_final_invoice = inputs.buyer_invoice_amount - inputs.buyer_credit_note;
    let buyer_cancel_amount = inputs.buyer_credit_note - buyer_payment_total;
    let buyer_balance_received = buyer_final_invoice - buyer_payment_total;

    // Costing
    let total_expenses = inputs.expenses.total();
    let profit = buyer_payment_total - supplier_payment_total;
    let profit_percentage = profit_percentage(profit, supplier_payment_total);
    let net_profit = profit - total_expenses;

    LedgerFigures {
        supplier_final_invoice,
        supplier_advance_total,
        supplier_advance_balance,
        supplier_balance_total,
        supplier_summary_total,
        supplier_cancel_amount,
        supplier_summary_balance,
        supplier_payment_total,
        buyer_final_invoice,
        buyer_balance_total,
        buyer_payment_total,
        buyer_cancel_amount,
        buyer_balance_received,
        total_expenses,
        profit,
        profit_percentage,
        net_profit,
    }
}

/// Profit as a percentage of what was paid to the supplier, fixed to two
/// decimals. Exactly `"0"` when nothing was paid.
pub fn profit_percentage(profit: Decimal, supplier_payment_total: Decimal) -> String {
    if supplier_payment_total.is_zero() {
        return "0".to_string();
    }
    let ratio = profit
        .checked_div(supplier_payment_total)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED));
    match ratio {
        Some(pct) => format!(
            "{:.2}",
            pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        ),
        // Out of range; same silent zero as unparseable input
        None => "0".to_string(),
    }
}
