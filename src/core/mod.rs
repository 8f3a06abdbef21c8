//! Core DTE types, validation and monetary arithmetic.
//!
//! This module provides the document model (invoices, dispatch guides,
//! credit and debit notes), RUT handling, IVA computation and the field
//! rules a document must satisfy before it can be numbered.

mod builder;
mod error;
mod money;
pub mod rut;
mod types;
mod validation;
mod words;

pub use builder::*;
pub use error::*;
pub use money::{
    IVA_RATE, MAX_AMOUNT, MAX_DECIMALS, format_amount, net_from_total, round_pesos, tax_amount,
    total,
};
pub(crate) use money::wire_decimal;
pub use rut::{Rut, RutError};
pub use types::*;
pub use validation::*;
pub use words::amount_in_words;
