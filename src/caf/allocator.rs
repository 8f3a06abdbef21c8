use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::NaiveDate;
use serde::Serialize;

use super::range::FolioRange;
use crate::core::{DocumentType, DteError};

/// Default number of remaining folios below which a warning is logged.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u64 = 10;

/// Availability of folios for one document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FolioState {
    /// No range has ever been loaded.
    Unloaded,
    /// At least one folio can still be claimed.
    Loaded { remaining: u64 },
    /// Every loaded folio has been claimed.
    Exhausted,
}

/// A folio taken from the allocator, together with the range it came from.
#[derive(Debug, Clone)]
pub struct ClaimedFolio {
    pub document_type: DocumentType,
    pub folio: u64,
    pub range: FolioRange,
}

/// Summary of the ranges loaded for one document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CafInfo {
    pub document_type: DocumentType,
    pub ranges: Vec<RangeInfo>,
    pub total: u64,
    pub claimed: u64,
    pub remaining: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeInfo {
    pub start: u64,
    pub end: u64,
    pub authorized_at: NaiveDate,
    pub remaining: u64,
}

#[derive(Debug, Default)]
struct TypeLedger {
    /// Sorted by authorization date, then by first folio.
    ranges: Vec<FolioRange>,
    claimed: BTreeSet<u64>,
}

impl TypeLedger {
    fn insert(&mut self, range: FolioRange) -> Result<(), DteError> {
        if let Some(existing) = self.ranges.iter().find(|r| r.overlaps(&range)) {
            return Err(DteError::RangeOverlap {
                document_type: range.document_type(),
                existing_start: existing.start(),
                existing_end: existing.end(),
                incoming_start: range.start(),
                incoming_end: range.end(),
            });
        }
        let key = (range.authorized_at(), range.start());
        let at = self
            .ranges
            .partition_point(|r| (r.authorized_at(), r.start()) < key);
        self.ranges.insert(at, range);
        Ok(())
    }

    /// Lowest unclaimed folio of the oldest range that still has one.
    fn next_unclaimed(&self) -> Option<(usize, u64)> {
        self.ranges.iter().enumerate().find_map(|(idx, range)| {
            let mut candidate = range.start();
            for &used in self.claimed.range(range.start()..=range.end()) {
                if used != candidate {
                    break;
                }
                candidate += 1;
            }
            (candidate <= range.end()).then_some((idx, candidate))
        })
    }

    fn range_remaining(&self, range: &FolioRange) -> u64 {
        range.len() - self.claimed.range(range.start()..=range.end()).count() as u64
    }

    fn total(&self) -> u64 {
        self.ranges.iter().map(FolioRange::len).sum()
    }

    fn remaining(&self) -> u64 {
        // Only folios inside a loaded range are ever recorded.
        self.total() - self.claimed.len() as u64
    }

    fn range_for(&self, folio: u64) -> Option<&FolioRange> {
        self.ranges.iter().find(|r| r.contains(folio))
    }
}

/// Issues folios from loaded CAF ranges.
///
/// Each document type has its own ledger behind its own mutex, so claims
/// for different types never wait on each other. A folio handed out by
/// [`next_folio`](Self::next_folio) is never handed out again, even if the
/// document it was meant for is later discarded.
///
/// ```
/// use dte::caf::{FolioAllocator, FolioRange};
/// use dte::core::DocumentType;
/// use chrono::NaiveDate;
///
/// let allocator = FolioAllocator::new();
/// let authorized = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
/// allocator
///     .load(FolioRange::new(DocumentType::Invoice, 1, 3, authorized, "<AUTORIZACION/>").unwrap())
///     .unwrap();
///
/// assert_eq!(allocator.next_folio(DocumentType::Invoice).unwrap(), 1);
/// assert_eq!(allocator.next_folio(DocumentType::Invoice).unwrap(), 2);
/// assert_eq!(allocator.folios_remaining(DocumentType::Invoice), 1);
/// ```
#[derive(Debug)]
pub struct FolioAllocator {
    ledgers: RwLock<HashMap<DocumentType, Arc<Mutex<TypeLedger>>>>,
    low_stock_threshold: u64,
}

impl Default for FolioAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl FolioAllocator {
    pub fn new() -> Self {
        Self {
            ledgers: RwLock::new(HashMap::new()),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    /// Warn once a type has this many folios or fewer left.
    pub fn with_low_stock_threshold(mut self, threshold: u64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    /// Register a range. Fails if it shares any folio with a range already
    /// loaded for the same type.
    pub fn load(&self, range: FolioRange) -> Result<(), DteError> {
        let document_type = range.document_type();
        let (start, end) = (range.start(), range.end());
        let ledger = {
            let mut map = self
                .ledgers
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(document_type).or_default())
        };
        let mut ledger = lock(&ledger);
        ledger.insert(range)?;
        tracing::info!(
            document_type = %document_type,
            start,
            end,
            remaining = ledger.remaining(),
            "folio range loaded"
        );
        Ok(())
    }

    /// Parse and register an SII authorization file's contents.
    pub fn load_caf_xml(&self, xml: &str) -> Result<DocumentType, DteError> {
        let range = FolioRange::from_caf_xml(xml)?;
        let document_type = range.document_type();
        self.load(range)?;
        Ok(document_type)
    }

    /// Read and register one authorization file.
    pub fn load_caf_file(&self, path: impl AsRef<Path>) -> Result<DocumentType, DteError> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)?;
        self.load_caf_xml(&xml).map_err(|e| match e {
            DteError::Caf(msg) => DteError::Caf(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Register every `*.xml` file in a directory, in file-name order.
    ///
    /// Stops at the first file that fails; files loaded before it stay
    /// loaded. Returns the number of files loaded.
    pub fn load_caf_dir(&self, dir: impl AsRef<Path>) -> Result<usize, DteError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            let is_xml = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
            if path.is_file() && is_xml {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            self.load_caf_file(path)?;
        }
        tracing::debug!(dir = %dir.as_ref().display(), files = paths.len(), "CAF directory loaded");
        Ok(paths.len())
    }

    /// Claim the next folio for a type.
    ///
    /// Ranges are drained oldest authorization first; within a range the
    /// lowest unclaimed folio is returned.
    pub fn next_folio(&self, document_type: DocumentType) -> Result<u64, DteError> {
        self.claim(document_type).map(|claimed| claimed.folio)
    }

    /// Like [`next_folio`](Self::next_folio), also returning the range
    /// the folio belongs to.
    pub fn claim(&self, document_type: DocumentType) -> Result<ClaimedFolio, DteError> {
        let ledger = self
            .ledger(document_type)
            .ok_or(DteError::CafNotLoaded { document_type })?;
        let mut ledger = lock(&ledger);

        let Some((idx, folio)) = ledger.next_unclaimed() else {
            tracing::warn!(document_type = %document_type, "no folios left");
            return Err(DteError::FoliosExhausted { document_type });
        };
        ledger.claimed.insert(folio);
        let range = ledger.ranges[idx].clone();
        let remaining = ledger.remaining();
        drop(ledger);

        tracing::debug!(document_type = %document_type, folio, remaining, "folio claimed");
        if remaining <= self.low_stock_threshold {
            tracing::warn!(
                document_type = %document_type,
                remaining,
                threshold = self.low_stock_threshold,
                "folio stock running low, request a new CAF"
            );
        }

        Ok(ClaimedFolio {
            document_type,
            folio,
            range,
        })
    }

    /// Record a folio as used without handing it out, e.g. one issued by
    /// a previous process. Returns `false` if it was already claimed.
    pub fn mark_claimed(&self, document_type: DocumentType, folio: u64) -> Result<bool, DteError> {
        let ledger = self
            .ledger(document_type)
            .ok_or(DteError::CafNotLoaded { document_type })?;
        let mut ledger = lock(&ledger);
        if ledger.range_for(folio).is_none() {
            return Err(DteError::Caf(format!(
                "folio {folio} is outside every range loaded for document type {document_type}"
            )));
        }
        Ok(ledger.claimed.insert(folio))
    }

    pub fn is_claimed(&self, document_type: DocumentType, folio: u64) -> bool {
        let Some(ledger) = self.ledger(document_type) else {
            return false;
        };
        lock(&ledger).claimed.contains(&folio)
    }

    /// Unclaimed folios across all ranges of a type; 0 if none are loaded.
    pub fn folios_remaining(&self, document_type: DocumentType) -> u64 {
        let Some(ledger) = self.ledger(document_type) else {
            return 0;
        };
        lock(&ledger).remaining()
    }

    pub fn state(&self, document_type: DocumentType) -> FolioState {
        if self.ledger(document_type).is_none() {
            return FolioState::Unloaded;
        }
        match self.folios_remaining(document_type) {
            0 => FolioState::Exhausted,
            remaining => FolioState::Loaded { remaining },
        }
    }

    /// Range-by-range summary for a type, or `None` if nothing is loaded.
    pub fn caf_info(&self, document_type: DocumentType) -> Option<CafInfo> {
        let ledger = self.ledger(document_type)?;
        let ledger = lock(&ledger);
        let ranges = ledger
            .ranges
            .iter()
            .map(|r| RangeInfo {
                start: r.start(),
                end: r.end(),
                authorized_at: r.authorized_at(),
                remaining: ledger.range_remaining(r),
            })
            .collect();
        Some(CafInfo {
            document_type,
            ranges,
            total: ledger.total(),
            claimed: ledger.claimed.len() as u64,
            remaining: ledger.remaining(),
        })
    }

    /// Authorization file covering `folio`, if one is loaded.
    pub fn authorization_blob(&self, document_type: DocumentType, folio: u64) -> Option<Arc<str>> {
        let ledger = self.ledger(document_type)?;
        let ledger = lock(&ledger);
        ledger.range_for(folio).map(|r| Arc::clone(r.blob()))
    }

    /// Types with at least one loaded range, in code order.
    pub fn loaded_types(&self) -> Vec<DocumentType> {
        let map = self.ledgers.read().unwrap_or_else(PoisonError::into_inner);
        let mut types: Vec<DocumentType> = map.keys().copied().collect();
        types.sort();
        types
    }

    fn ledger(&self, document_type: DocumentType) -> Option<Arc<Mutex<TypeLedger>>> {
        self.ledgers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&document_type)
            .cloned()
    }
}

// A panic while holding a ledger cannot leave it half-updated: every
// mutation is a single insert.
fn lock(ledger: &Mutex<TypeLedger>) -> MutexGuard<'_, TypeLedger> {
    ledger.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(document_type: DocumentType, start: u64, end: u64) -> FolioRange {
        FolioRange::new(document_type, start, end, date(2025, 1, 1), "caf").unwrap()
    }

    #[test]
    fn sequential_then_exhausted() {
        let alloc = FolioAllocator::new();
        alloc.load(range(DocumentType::Invoice, 1, 5)).unwrap();
        for expected in 1..=5 {
            assert_eq!(alloc.next_folio(DocumentType::Invoice).unwrap(), expected);
        }
        assert!(matches!(
            alloc.next_folio(DocumentType::Invoice),
            Err(DteError::FoliosExhausted {
                document_type: DocumentType::Invoice
            })
        ));
        assert_eq!(alloc.state(DocumentType::Invoice), FolioState::Exhausted);
    }

    #[test]
    fn unloaded_type() {
        let alloc = FolioAllocator::new();
        assert_eq!(alloc.state(DocumentType::CreditNote), FolioState::Unloaded);
        assert_eq!(alloc.folios_remaining(DocumentType::CreditNote), 0);
        assert!(matches!(
            alloc.next_folio(DocumentType::CreditNote),
            Err(DteError::CafNotLoaded { .. })
        ));
        assert!(alloc.caf_info(DocumentType::CreditNote).is_none());
    }

    #[test]
    fn overlapping_range_rejected() {
        let alloc = FolioAllocator::new();
        alloc.load(range(DocumentType::Invoice, 1, 100)).unwrap();
        let err = alloc.load(range(DocumentType::Invoice, 50, 150)).unwrap_err();
        assert!(matches!(
            err,
            DteError::RangeOverlap {
                existing_start: 1,
                existing_end: 100,
                incoming_start: 50,
                incoming_end: 150,
                ..
            }
        ));
        // Same folios for another type are fine.
        alloc.load(range(DocumentType::CreditNote, 50, 150)).unwrap();
        assert_eq!(alloc.folios_remaining(DocumentType::Invoice), 100);
    }

    #[test]
    fn oldest_authorization_drains_first() {
        let alloc = FolioAllocator::new();
        let newer =
            FolioRange::new(DocumentType::Invoice, 1, 2, date(2025, 6, 1), "newer").unwrap();
        let older =
            FolioRange::new(DocumentType::Invoice, 500, 501, date(2025, 1, 1), "older").unwrap();
        alloc.load(newer).unwrap();
        alloc.load(older).unwrap();

        let folios: Vec<u64> = (0..4)
            .map(|_| alloc.next_folio(DocumentType::Invoice).unwrap())
            .collect();
        assert_eq!(folios, vec![500, 501, 1, 2]);
    }

    #[test]
    fn claim_carries_range_blob() {
        let alloc = FolioAllocator::new();
        alloc
            .load(FolioRange::new(DocumentType::DispatchGuide, 10, 20, date(2025, 1, 1), "blob-52").unwrap())
            .unwrap();
        let claimed = alloc.claim(DocumentType::DispatchGuide).unwrap();
        assert_eq!(claimed.folio, 10);
        assert_eq!(claimed.range.blob().as_ref(), "blob-52");
        assert_eq!(
            alloc
                .authorization_blob(DocumentType::DispatchGuide, 15)
                .as_deref(),
            Some("blob-52")
        );
        assert!(alloc.authorization_blob(DocumentType::DispatchGuide, 21).is_none());
    }

    #[test]
    fn mark_claimed_skips_folio() {
        let alloc = FolioAllocator::new();
        alloc.load(range(DocumentType::Invoice, 1, 5)).unwrap();
        assert!(alloc.mark_claimed(DocumentType::Invoice, 1).unwrap());
        assert!(alloc.mark_claimed(DocumentType::Invoice, 3).unwrap());
        assert!(!alloc.mark_claimed(DocumentType::Invoice, 3).unwrap());
        assert!(alloc.mark_claimed(DocumentType::Invoice, 99).is_err());

        assert_eq!(alloc.next_folio(DocumentType::Invoice).unwrap(), 2);
        assert_eq!(alloc.next_folio(DocumentType::Invoice).unwrap(), 4);
        assert!(alloc.is_claimed(DocumentType::Invoice, 4));
        assert_eq!(alloc.folios_remaining(DocumentType::Invoice), 1);
    }

    #[test]
    fn caf_info_reports_per_range() {
        let alloc = FolioAllocator::new();
        alloc.load(range(DocumentType::Invoice, 1, 10)).unwrap();
        alloc.load(range(DocumentType::Invoice, 101, 110)).unwrap();
        alloc.next_folio(DocumentType::Invoice).unwrap();

        let info = alloc.caf_info(DocumentType::Invoice).unwrap();
        assert_eq!(info.total, 20);
        assert_eq!(info.claimed, 1);
        assert_eq!(info.remaining, 19);
        assert_eq!(info.ranges.len(), 2);
        assert_eq!(info.ranges[0].remaining, 9);
        assert_eq!(info.ranges[1].remaining, 10);
    }

    #[test]
    fn loaded_types_sorted() {
        let alloc = FolioAllocator::new();
        alloc.load(range(DocumentType::CreditNote, 1, 1)).unwrap();
        alloc.load(range(DocumentType::Invoice, 1, 1)).unwrap();
        assert_eq!(
            alloc.loaded_types(),
            vec![DocumentType::Invoice, DocumentType::CreditNote]
        );
    }
}
