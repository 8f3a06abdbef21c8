//! CAF (Código de Autorización de Folios) handling.
//!
//! The SII authorizes each issuer to use a block of folio numbers per
//! document type. [`FolioRange`] holds one such block; [`FolioAllocator`]
//! hands folios out of the loaded blocks, never issuing the same folio
//! twice.

mod allocator;
mod range;

pub use allocator::{
    CafInfo, ClaimedFolio, DEFAULT_LOW_STOCK_THRESHOLD, FolioAllocator, FolioState, RangeInfo,
};
pub use range::{FolioRange, MAX_FOLIO};
