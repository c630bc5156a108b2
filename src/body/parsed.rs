//! Body payload decoding.
//!
//! A request body is dispatched on its declared MIME type into a closed set
//! of variants: JSON, XML, form-encoded, or opaque text. Unrecognized types
//! and undecodable payloads fall back to [`ParsedBody::Opaque`] rather than
//! failing the caller; the body bytes are normalized to UTF-8 first when the
//! declared charset differs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Charset assumed when a request declares none.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// A decoded request body.
///
/// Serializable, so decoded payloads can be re-emitted or logged as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParsedBody {
    /// `application/json` and `*+json` payloads.
    Json(Value),
    /// `text/xml`, `application/xml`, and `*+xml` payloads.
    Xml(XmlNode),
    /// `application/x-www-form-urlencoded` payloads, decoded pairs in
    /// submission order.
    Form(Vec<(String, String)>),
    /// Everything else: the body text as-is.
    Opaque(String),
}

/// Decode body bytes according to the declared MIME type and charset.
pub fn parse_body(body_type: Option<&str>, charset: &str, bytes: &[u8]) -> ParsedBody {
    let text = to_utf8(bytes, charset);

    let Some(body_type) = body_type else {
        return ParsedBody::Opaque(text);
    };

    if body_type == "application/json" || body_type.ends_with("+json") {
        return match serde_json::from_str(&text) {
            Ok(value) => ParsedBody::Json(value),
            Err(error) => {
                tracing::warn!(error = %error, "undecodable JSON body, treating as opaque");
                ParsedBody::Opaque(text)
            }
        };
    }

    if body_type == "text/xml" || body_type == "application/xml" || body_type.ends_with("+xml") {
        return match XmlNode::parse(&text) {
            Some(root) => ParsedBody::Xml(root),
            None => {
                tracing::warn!("undecodable XML body, treating as opaque");
                ParsedBody::Opaque(text)
            }
        };
    }

    if body_type == "application/x-www-form-urlencoded" {
        let pairs = url::form_urlencoded::parse(text.as_bytes())
            .into_owned()
            .collect();
        return ParsedBody::Form(pairs);
    }

    ParsedBody::Opaque(text)
}

/// Re-encode body bytes to UTF-8 from the declared charset.
///
/// ISO-8859-1 (and its aliases) maps byte-for-codepoint; US-ASCII and UTF-8
/// pass through. Anything else decodes lossily with a warning.
fn to_utf8(bytes: &[u8], charset: &str) -> String {
    match charset.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" | "us-ascii" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => {
            bytes.iter().map(|&byte| byte as char).collect()
        }
        other => {
            tracing::warn!(charset = %other, "unsupported charset, decoding lossily as UTF-8");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// One element of an XML document tree.
///
/// The parser underneath covers elements, attributes, and character data,
/// which is the shape dispatching needs; it skips prologs, comments, and
/// doctype declarations. Namespaces are not resolved; prefixed names are
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub text: String,
}

impl XmlNode {
    /// Parse a document and return its root element, or `None` when the
    /// input is not well-formed enough to produce one.
    pub fn parse(input: &str) -> Option<XmlNode> {
        let mut parser = XmlParser {
            chars: input.chars().collect(),
            pos: 0,
        };
        parser.skip_misc();
        let root = parser.parse_element()?;
        parser.skip_misc();
        // Trailing garbage after the root makes the document malformed.
        if parser.pos < parser.chars.len() {
            return None;
        }
        Some(root)
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }
}

struct XmlParser {
    chars: Vec<char>,
    pos: usize,
}

impl XmlParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        prefix
            .chars()
            .enumerate()
            .all(|(offset, expected)| self.chars.get(self.pos + offset) == Some(&expected))
    }

    fn skip_until(&mut self, terminator: &str) {
        while self.pos < self.chars.len() && !self.starts_with(terminator) {
            self.pos += 1;
        }
        self.pos = (self.pos + terminator.chars().count()).min(self.chars.len());
    }

    /// Skip whitespace, XML prologs, comments, and doctype declarations.
    fn skip_misc(&mut self) {
        loop {
            while self.peek().is_some_and(|ch| ch.is_whitespace()) {
                self.pos += 1;
            }
            if self.starts_with("<?") {
                self.skip_until("?>");
            } else if self.starts_with("<!--") {
                self.skip_until("-->");
            } else if self.starts_with("<!") {
                self.skip_until(">");
            } else {
                return;
            }
        }
    }

    fn parse_name(&mut self) -> Option<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | ':' | '.'))
        {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attributes(&mut self) -> Option<Vec<(String, String)>> {
        let mut attributes = Vec::new();
        loop {
            while self.peek().is_some_and(|ch| ch.is_whitespace()) {
                self.pos += 1;
            }
            match self.peek() {
                Some('>') | Some('/') => return Some(attributes),
                Some(_) => {}
                None => return None,
            }

            let name = self.parse_name()?;
            if self.peek() != Some('=') {
                return None;
            }
            self.pos += 1;

            let quote = self.peek()?;
            if quote != '"' && quote != '\'' {
                return None;
            }
            self.pos += 1;

            let start = self.pos;
            while self.peek().is_some_and(|ch| ch != quote) {
                self.pos += 1;
            }
            self.peek()?;
            let value: String = self.chars[start..self.pos].iter().collect();
            self.pos += 1;

            attributes.push((name, decode_entities(&value)));
        }
    }

    fn parse_element(&mut self) -> Option<XmlNode> {
        if self.peek() != Some('<') {
            return None;
        }
        self.pos += 1;

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        // Self-closing element.
        if self.starts_with("/>") {
            self.pos += 2;
            return Some(XmlNode {
                name,
                attributes,
                children: Vec::new(),
                text: String::new(),
            });
        }

        if self.peek() != Some('>') {
            return None;
        }
        self.pos += 1;

        let mut children = Vec::new();
        let mut text = String::new();

        loop {
            if self.starts_with("</") {
                self.pos += 2;
                let closing = self.parse_name()?;
                if closing != name || self.peek() != Some('>') {
                    return None;
                }
                self.pos += 1;
                return Some(XmlNode {
                    name,
                    attributes,
                    children,
                    text: decode_entities(text.trim()),
                });
            }

            if self.starts_with("<!--") {
                self.skip_until("-->");
                continue;
            }

            match self.peek() {
                Some('<') => children.push(self.parse_element()?),
                Some(ch) => {
                    text.push(ch);
                    self.pos += 1;
                }
                None => return None,
            }
        }
    }
}

/// Decode the five predefined XML entities.
fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
