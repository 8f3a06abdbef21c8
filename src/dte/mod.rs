//! SII wire format.
//!
//! [`DocumentBuilder`] runs the full issue pipeline and produces a
//! [`RenderedDocument`]: the `DTE` XML in schema order, ready for an
//! external signer.

mod engine;
mod render;
pub mod xml_utils;

pub use engine::DocumentBuilder;
pub use render::{RenderedDocument, SII_NS, document_id, to_dte_xml};
