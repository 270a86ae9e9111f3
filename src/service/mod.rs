//! Request validation and the operations behind each route.

mod accounts;
mod catalog;
mod hierarchy;
mod validation;

pub use accounts::AccountService;
pub use catalog::CatalogService;
pub use hierarchy::{ensure_acyclic, MAX_DEPTH};
pub use validation::{Format, RequestValidator, Rules, ValidationRule};
