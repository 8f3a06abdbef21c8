//! Writing SII `DTE` documents.
//!
//! The SII schema is element-only: no mixed content, attributes only on
//! `DTE` and `Documento`. Amounts are whole pesos, dates are `YYYY-MM-DD`,
//! RUTs use the compact `12345678-K` form and the file is declared
//! ISO-8859-1.

use chrono::NaiveDate;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::fmt::Display;
use std::io::Cursor;

use crate::core::{DteError, Rut, wire_decimal};

pub type XmlResult = Result<String, DteError>;

/// Encoding named in the XML declaration; SII only accepts Latin-1.
pub const XML_ENCODING: &str = "ISO-8859-1";

/// `FchEmis`, `FchVenc` and `FchRef` format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn write_failed(e: std::io::Error) -> DteError {
    DteError::Xml(format!("writing DTE failed: {e}"))
}

/// Element writer for one DTE, indented by two spaces.
///
/// Every method returns `&mut Self` so a block reads top to bottom in
/// schema order.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    /// Starts the buffer with the Latin-1 XML declaration.
    pub fn new() -> Result<Self, DteError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some(XML_ENCODING), None)))
            .map_err(write_failed)?;
        Ok(Self { writer })
    }

    /// The document as text. Characters are not yet transcoded; see
    /// [`to_latin1`].
    pub fn into_string(self) -> Result<String, DteError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| DteError::Xml(format!("DTE is not UTF-8: {e}")))
    }

    fn event(&mut self, event: Event<'_>) -> Result<&mut Self, DteError> {
        self.writer.write_event(event).map_err(write_failed)?;
        Ok(self)
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, DteError> {
        self.event(Event::Start(BytesStart::new(name)))
    }

    /// Opening tag with attributes, for `DTE version` and `Documento ID`.
    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, DteError> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(elem))
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, DteError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, DteError> {
        self.start_element(name)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end_element(name)
    }

    /// Skipped entirely when `text` is `None`; SII rejects empty elements.
    pub fn optional_element(
        &mut self,
        name: &str,
        text: Option<&str>,
    ) -> Result<&mut Self, DteError> {
        match text {
            Some(text) => self.text_element(name, text),
            None => Ok(self),
        }
    }

    /// Numeric codes and counters: `TipoDTE`, `Folio`, `NroLinDet`, `CodRef`.
    pub fn code_element(&mut self, name: &str, code: impl Display) -> Result<&mut Self, DteError> {
        self.text_element(name, &code.to_string())
    }

    /// Whole-peso amount (`MntNeto`, `MontoItem`, ...).
    pub fn amount_element(&mut self, name: &str, amount: i64) -> Result<&mut Self, DteError> {
        self.code_element(name, amount)
    }

    /// Quantity, price or percentage; see [`format_decimal`].
    pub fn decimal_element(&mut self, name: &str, value: Decimal) -> Result<&mut Self, DteError> {
        self.text_element(name, &format_decimal(value))
    }

    pub fn date_element(&mut self, name: &str, date: NaiveDate) -> Result<&mut Self, DteError> {
        self.code_element(name, date.format(DATE_FORMAT))
    }

    /// RUT in the compact wire form.
    pub fn rut_element(&mut self, name: &str, rut: Rut) -> Result<&mut Self, DteError> {
        self.code_element(name, rut)
    }
}

/// Plain decimal notation with no trailing zeros, rounded to
/// [`MAX_DECIMALS`](crate::core::MAX_DECIMALS) fractional digits.
pub fn format_decimal(d: Decimal) -> String {
    wire_decimal(d).normalize().to_string()
}

/// Transcode to ISO-8859-1 bytes.
///
/// Fails on the first character above U+00FF. Validated documents never
/// contain one.
pub fn to_latin1(text: &str) -> Result<Vec<u8>, DteError> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| {
                DteError::Xml(format!(
                    "character '{c}' (U+{:04X}) cannot be encoded as {XML_ENCODING}",
                    u32::from(c)
                ))
            })
        })
        .collect()
}
