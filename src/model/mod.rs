//! Types that represent the core data model, such as `Bill` and `BillForm`,
//! plus the display formatting applied to raw bill values.
mod bill;
mod form;
pub mod format;

pub use bill::{Bill, BillStatus, ExpenseType};
pub use form::BillForm;
