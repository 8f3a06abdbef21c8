use std::sync::Arc;

use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::{DocumentType, DteError, Rut};

/// Highest folio number the SII schema can carry (10 digits).
pub const MAX_FOLIO: u64 = 9_999_999_999;

/// One authorized folio range (CAF) for a document type.
///
/// Immutable once constructed. The authorization blob is the CAF file as
/// received from the SII; it is stored and forwarded, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolioRange {
    document_type: DocumentType,
    start: u64,
    end: u64,
    authorized_at: NaiveDate,
    issuer: Option<Rut>,
    issuer_name: Option<String>,
    blob: Arc<str>,
}

impl FolioRange {
    /// Create a range from its parts.
    pub fn new(
        document_type: DocumentType,
        start: u64,
        end: u64,
        authorized_at: NaiveDate,
        blob: impl Into<Arc<str>>,
    ) -> Result<Self, DteError> {
        if start == 0 {
            return Err(DteError::Caf(format!(
                "range for document type {document_type} must start at 1 or above"
            )));
        }
        if start > end {
            return Err(DteError::Caf(format!(
                "range start {start} is after range end {end} for document type {document_type}"
            )));
        }
        if end > MAX_FOLIO {
            return Err(DteError::Caf(format!(
                "range end {end} exceeds the maximum folio {MAX_FOLIO}"
            )));
        }
        Ok(Self {
            document_type,
            start,
            end,
            authorized_at,
            issuer: None,
            issuer_name: None,
            blob: blob.into(),
        })
    }

    /// Record the issuer the range was granted to.
    pub fn with_issuer(mut self, rut: Rut, name: Option<String>) -> Self {
        self.issuer = Some(rut);
        self.issuer_name = name;
        self
    }

    /// Parse an SII authorization file (`AUTORIZACION/CAF/DA`).
    ///
    /// Reads TD (document type), RNG/D and RNG/H (range), FA (authorization
    /// date), RE and RS (issuer). The whole input is kept as the blob.
    pub fn from_caf_xml(xml: &str) -> Result<Self, DteError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut parsed = ParsedCaf::default();
        let mut path: Vec<String> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let name = std::str::from_utf8(e.name().as_ref())
                        .unwrap_or("")
                        .to_string();
                    path.push(name);
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().unwrap_or_default().to_string();
                    if !text.is_empty() {
                        parsed.handle_text(&path, &text);
                    }
                }
                Ok(Event::End(_)) => {
                    path.pop();
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(DteError::Caf(format!(
                        "malformed CAF XML at position {}: {e}",
                        reader.buffer_position()
                    )));
                }
                _ => {}
            }
        }

        parsed.into_range(xml)
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    /// First authorized folio.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last authorized folio (inclusive).
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of folios in the range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false: a range holds at least one folio.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, folio: u64) -> bool {
        (self.start..=self.end).contains(&folio)
    }

    /// Whether two ranges share at least one folio.
    pub fn overlaps(&self, other: &FolioRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn authorized_at(&self) -> NaiveDate {
        self.authorized_at
    }

    pub fn issuer(&self) -> Option<Rut> {
        self.issuer
    }

    pub fn issuer_name(&self) -> Option<&str> {
        self.issuer_name.as_deref()
    }

    /// The authorization file, verbatim.
    pub fn blob(&self) -> &Arc<str> {
        &self.blob
    }
}

#[derive(Default)]
struct ParsedCaf {
    document_type: Option<String>,
    start: Option<String>,
    end: Option<String>,
    authorized_at: Option<String>,
    issuer: Option<String>,
    issuer_name: Option<String>,
}

impl ParsedCaf {
    fn handle_text(&mut self, path: &[String], text: &str) {
        // Only fields under DA belong to the authorization data; the
        // signature and key blocks are passed through untouched.
        if !path.iter().any(|p| p == "DA") {
            return;
        }
        let Some(current) = path.last() else {
            return;
        };
        let parent = path.len().checked_sub(2).map(|i| path[i].as_str());

        match (parent, current.as_str()) {
            (_, "TD") => self.document_type = Some(text.to_string()),
            (Some("RNG"), "D") => self.start = Some(text.to_string()),
            (Some("RNG"), "H") => self.end = Some(text.to_string()),
            (_, "FA") => self.authorized_at = Some(text.to_string()),
            (_, "RE") => self.issuer = Some(text.to_string()),
            (_, "RS") => self.issuer_name = Some(text.to_string()),
            _ => {}
        }
    }

    fn into_range(self, xml: &str) -> Result<FolioRange, DteError> {
        let code = required(self.document_type, "TD")?;
        let code: u16 = code
            .parse()
            .map_err(|_| DteError::Caf(format!("TD '{code}' is not a number")))?;
        let document_type = DocumentType::from_code(code)
            .ok_or_else(|| DteError::Caf(format!("unsupported document type {code}")))?;

        let start = parse_folio(required(self.start, "RNG/D")?, "RNG/D")?;
        let end = parse_folio(required(self.end, "RNG/H")?, "RNG/H")?;

        let fa = required(self.authorized_at, "FA")?;
        let authorized_at = NaiveDate::parse_from_str(&fa, "%Y-%m-%d")
            .map_err(|e| DteError::Caf(format!("FA '{fa}' is not a date: {e}")))?;

        let mut range = FolioRange::new(document_type, start, end, authorized_at, xml)?;
        if let Some(re) = self.issuer {
            range = range.with_issuer(Rut::parse(&re)?, self.issuer_name);
        }
        Ok(range)
    }
}

fn required(value: Option<String>, element: &str) -> Result<String, DteError> {
    value.ok_or_else(|| DteError::Caf(format!("missing element {element}")))
}

fn parse_folio(text: String, element: &str) -> Result<u64, DteError> {
    text.parse()
        .map_err(|_| DteError::Caf(format!("{element} '{text}' is not a folio number")))
}
