//! Property-based tests for the project ledger calculator.
//!
//! Invariants verified:
//! - final invoice is invoice amount minus credit note, negatives included
//! - the supplier summary total is the sum of both payment totals
//! - profit percentage is exactly "0" whenever nothing was paid to the supplier
//! - net profit is profit minus the seven expenses
//! - recomputing a stored record from its own raw fields changes nothing
//! - any representable `Decimal`, as typed input or raw calculator input,
//!   is bounded and never makes the calculator panic

use ledger::project::amount::{parse_amount, AMOUNT_SCALE, MAX_AMOUNT};
use ledger::project::{derive, preview, Expenses, LedgerInputs, ProjectInput};
use proptest::{prelude::*, test_runner::TestCaseError};
use rust_decimal::Decimal;

// ── Helpers
// ───────────────────────────────────────────────────────────────────

/// Signed amounts with cent precision, up to ±10 000 000.00.
fn amount_strat() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..=1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Any `Decimal` at all: full 96-bit mantissa, either sign, scale 0 to 28.
fn any_decimal_strat() -> impl Strategy<Value = Decimal> {
    (any::<u32>(), any::<u32>(), any::<u32>(), any::<bool>(), 0u32..=28)
        .prop_map(|(lo, mid, hi, negative, scale)| Decimal::from_parts(lo, mid, hi, negative, scale))
}

/// Extreme and ordinary amounts mixed, so sums cross the range limit.
fn wide_amount_strat() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        amount_strat(),
        any_decimal_strat(),
        Just(Decimal::MAX),
        Just(Decimal::MIN),
        Just(Decimal::new(1, 28)),
    ]
}

fn inputs_strat() -> impl Strategy<Value = LedgerInputs> {
    prop::collection::vec(amount_strat(), 20).prop_map(inputs_from)
}

fn wide_inputs_strat() -> impl Strategy<Value = LedgerInputs> {
    prop::collection::vec(wide_amount_strat(), 20).prop_map(inputs_from)
}

fn inputs_from(v: Vec<Decimal>) -> LedgerInputs {
    LedgerInputs {
        supplier_invoice_amount: v[0],
        supplier_credit_note: v[1],
        supplier_loan_amount: v[2],
        supplier_advance_twl: v[3],
        supplier_balance_amount: v[4],
        supplier_balance_twl: v[5],
        buyer_invoice_amount: v[6],
        buyer_credit_note: v[7],
        buyer_advance_amount: v[8],
        buyer_balance_amount: v[9],
        buyer_balance_twl: v[10],
        costing_supplier_invoice_amount: v[11],
        costing_twl_invoice_amount: v[12],
        expenses: Expenses {
            in_going: v[13],
            out_going: v[14],
            cal_charges: v[15],
            other: v[16],
            foreign_bank_charges: v[17],
            loan_interest: v[18],
            freight_charges: v[19],
        },
    }
}

const AMOUNT_PATHS: [&str; 20] = [
    "supplier.proforma_invoice.invoice_amount",
    "supplier.proforma_invoice.credit_note",
    "supplier.advance_payment.loan_amount",
    "supplier.advance_payment.twl_contribution",
    "supplier.balance_payment.amount",
    "supplier.balance_payment.twl_contribution",
    "buyer.proforma_invoice.invoice_amount",
    "buyer.proforma_invoice.credit_note",
    "buyer.advance_payment.amount",
    "buyer.balance_payment.amount",
    "buyer.balance_payment.twl_contribution",
    "costing.supplier_invoice_amount",
    "costing.twl_invoice_amount",
    "costing.expenses.in_going",
    "costing.expenses.out_going",
    "costing.expenses.cal_charges",
    "costing.expenses.other",
    "costing.expenses.foreign_bank_charges",
    "costing.expenses.loan_interest",
    "costing.expenses.freight_charges",
];

// ── All property tests
// ────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn final_invoice_is_amount_minus_credit(inputs in inputs_strat()) {
        let fig = derive(&inputs);
        prop_assert_eq!(
            fig.supplier_final_invoice,
            inputs.supplier_invoice_amount - inputs.supplier_credit_note
        );
        prop_assert_eq!(
            fig.buyer_final_invoice,
            inputs.buyer_invoice_amount - inputs.buyer_credit_note
        );
    }

    #[test]
    fn summary_total_sums_both_payments(inputs in inputs_strat()) {
        let fig = derive(&inputs);
        prop_assert_eq!(
            fig.supplier_summary_total,
            inputs.supplier_loan_amount
                + inputs.supplier_advance_twl
                + inputs.supplier_balance_amount
                + inputs.supplier_balance_twl
        );
        prop_assert_eq!(fig.supplier_payment_total, fig.supplier_summary_total);
    }

    #[test]
    fn profit_is_received_minus_paid(inputs in inputs_strat()) {
        let fig = derive(&inputs);
        prop_assert_eq!(fig.profit, fig.buyer_payment_total - fig.supplier_payment_total);
        prop_assert_eq!(fig.net_profit, fig.profit - inputs.expenses.total());
        prop_assert_eq!(fig.total_expenses, inputs.expenses.total());
    }

    #[test]
    fn nothing_paid_means_zero_percentage(mut inputs in inputs_strat()) {
        inputs.supplier_loan_amount = Decimal::ZERO;
        inputs.supplier_advance_twl = Decimal::ZERO;
        inputs.supplier_balance_amount = Decimal::ZERO;
        inputs.supplier_balance_twl = Decimal::ZERO;
        prop_assert_eq!(derive(&inputs).profit_percentage, "0");
    }

    #[test]
    fn percentage_has_two_decimals(inputs in inputs_strat()) {
        let fig = derive(&inputs);
        prop_assume!(!fig.supplier_payment_total.is_zero());
        let (_, frac) = fig
            .profit_percentage
            .split_once('.')
            .ok_or_else(|| TestCaseError::fail("no decimal point"))?;
        prop_assert_eq!(frac.len(), 2);
    }

    #[test]
    fn parsed_amounts_are_bounded(value in any_decimal_strat()) {
        let parsed = parse_amount(&value.to_string());
        prop_assert!(parsed.abs() <= MAX_AMOUNT);
        prop_assert!(parsed.scale() <= AMOUNT_SCALE);
    }

    #[test]
    fn derive_never_panics(inputs in wide_inputs_strat()) {
        let fig = derive(&inputs);
        let bounded = inputs.bounded();
        prop_assert_eq!(
            fig.supplier_summary_total,
            bounded.supplier_loan_amount
                + bounded.supplier_advance_twl
                + bounded.supplier_balance_amount
                + bounded.supplier_balance_twl
        );
        prop_assert_eq!(fig.net_profit, fig.profit - bounded.expenses.total());
    }

    #[test]
    fn preview_never_panics(amounts in prop::collection::vec(wide_amount_strat(), 20)) {
        let assignments: Vec<String> = AMOUNT_PATHS
            .iter()
            .zip(&amounts)
            .map(|(path, amount)| format!("{path}={amount}"))
            .collect();
        let input = ProjectInput::from_assignments(&assignments)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let record = preview(&input);
        prop_assert!(record.supplier.proforma_invoice.invoice_amount.abs() <= MAX_AMOUNT);
        prop_assert!(record.costing.expenses.freight_charges.scale() <= AMOUNT_SCALE);
    }

    #[test]
    fn recompute_is_idempotent(amounts in prop::collection::vec(amount_strat(), 20)) {
        let assignments: Vec<String> = AMOUNT_PATHS
            .iter()
            .zip(&amounts)
            .map(|(path, amount)| format!("{path}={amount}"))
            .collect();
        let input = ProjectInput::from_assignments(&assignments)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let record = preview(&input);
        let mut again = record.clone();
        again.recompute();
        prop_assert_eq!(again, record);
    }
}
