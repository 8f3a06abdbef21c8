//! # dte
//!
//! Chilean electronic tax documents (Documentos Tributarios Electrónicos):
//! RUT check digits, CAF folio allocation, IVA arithmetic and rendering to
//! the SII `DTE` XML format.
//!
//! Quantities, prices and rates are [`rust_decimal::Decimal`]; amounts are
//! whole pesos (`i64`). Totals are always derived from the detail lines.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use dte::caf::{FolioAllocator, FolioRange};
//! use dte::core::*;
//! use dte::dte::DocumentBuilder;
//! use rust_decimal_macros::dec;
//!
//! let date = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
//! let allocator = FolioAllocator::new();
//! allocator
//!     .load(FolioRange::new(DocumentType::Invoice, 1, 500, date, "<AUTORIZACION/>").unwrap())
//!     .unwrap();
//!
//! let issuer = PartyBuilder::new("77117239-3".parse().unwrap(), "Comercial Andes SpA")
//!     .business_activity("Venta al por mayor")
//!     .street("Av. Providencia 1234")
//!     .commune("Providencia")
//!     .build();
//! let receiver = PartyBuilder::new("76086428-5".parse().unwrap(), "Cliente Ltda.")
//!     .street("Calle Falsa 456")
//!     .commune("Santiago")
//!     .build();
//!
//! let invoice = Document::invoice(date, issuer)
//!     .receiver(receiver)
//!     .add_line(LineBuilder::new("Resma carta", dec!(2), dec!(3900)).build())
//!     .add_line(LineBuilder::new("Archivador", dec!(1), dec!(1000)).build());
//!
//! let rendered = DocumentBuilder::new(&allocator).build(&invoice).unwrap();
//! assert_eq!(rendered.folio(), 1);
//! assert_eq!(rendered.totals().tax_amount, 1672);
//! assert_eq!(rendered.totals().total, 10472);
//! ```
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`core`] | Document model, RUT, IVA and rounding, validation |
//! | [`caf`] | CAF parsing and the folio allocator |
//! | [`dte`](mod@dte) | Issue pipeline and XML rendering |
//! | [`config`] | Engine settings (TOML with the `config` feature) |

pub mod caf;
pub mod config;
pub mod core;
pub mod dte;

// Re-export core types at crate root for convenience
pub use crate::caf::{FolioAllocator, FolioRange};
pub use crate::config::EngineConfig;
pub use crate::core::*;
pub use crate::dte::{DocumentBuilder, RenderedDocument};
