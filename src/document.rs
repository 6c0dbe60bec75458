//! Handshake reply parsing
//!
//! The server answers a connect request with a small XML document:
//!
//! ```xml
//! <connection id="hN4tVzq8RbGkY2mPwXc7Ja"/>
//! ```
//!
//! Parsing goes through the [`DocumentParser`] trait so a context can swap in a
//! different document format without touching the handshake.

use std::collections::HashMap;
use std::ops::Range;

use crate::error::ProtocolError;

/// Root element of a parsed reply.
///
/// Names are qualified names as written in the document, so a prefixed
/// `<x:connection>` is reported as `x:connection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootElement {
    pub name: String,
    pub attributes: HashMap<String, String>,
}

impl RootElement {
    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Parses a reply body down to its root element
pub trait DocumentParser: Send + Sync {
    fn parse_root(&self, body: &str) -> Result<RootElement, ProtocolError>;
}

/// Default [`DocumentParser`] backed by `roxmltree`
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDocumentParser;

impl DocumentParser for XmlDocumentParser {
    fn parse_root(&self, body: &str) -> Result<RootElement, ProtocolError> {
        let doc = roxmltree::Document::parse(body)
            .map_err(|e| ProtocolError::MalformedDocument(e.to_string()))?;

        let root = doc.root_element();
        let name = element_qname(body, root.range())
            .unwrap_or_else(|| root.tag_name().name())
            .to_string();
        let attributes = root
            .attributes()
            .map(|a| {
                let qname = body.get(a.range_qname()).unwrap_or_else(|| a.name());
                (qname.to_string(), a.value().to_string())
            })
            .collect();

        Ok(RootElement { name, attributes })
    }
}

/// Qualified tag name of the element starting at `range`
fn element_qname(body: &str, range: Range<usize>) -> Option<&str> {
    let tag = body.get(range)?.strip_prefix('<')?;
    let end = tag
        .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
        .unwrap_or(tag.len());
    Some(&tag[..end])
}
