pub mod amount;
pub mod calculator;
mod input;
mod record;
mod service;

pub use calculator::{derive, profit_percentage, Expenses, LedgerFigures, LedgerInputs};
pub use input::{
    BalancePaymentInput, BuyerAdvanceInput, BuyerInput, BuyerProformaInput, CostingInput,
    ExpensesInput, ProjectInput, SupplierAdvanceInput, SupplierInput, SupplierProformaInput,
};
pub use record::{
    BalancePayment, Buyer, BuyerAdvance, BuyerProforma, BuyerSummary, Costing, ExpenseItems,
    Identity, ProjectRecord, RecordMeta, Supplier, SupplierAdvance, SupplierProforma,
    SupplierSummary,
};
pub use service::{preview, ProjectService};
