//! XML parser implementation

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Pos, Result};
use crate::xml::cursor::Cursor;
use crate::xml::model::{Content, Document, Element};
use crate::xml::name::{is_valid_name, is_xml_char};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parser limits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Deepest element nesting accepted; the root element is at depth 1
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_depth: 500 }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser
    pub const fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config { max_depth: 500 })
    }

    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        self.cursor.consume_bytes(BOM);

        let (version, encoding) = if self.at_declaration() {
            self.parse_declaration()?
        } else {
            (None, None)
        };

        let prolog = self.parse_misc(true)?;
        if self.cursor.is_eof() {
            return Err(self.error_here("missing root element"));
        }
        let root = self.parse_element()?;
        let epilog = self.parse_misc(false)?;

        if !self.cursor.is_eof() {
            return Err(self.error_here("content after root element"));
        }

        Ok(Document {
            version,
            encoding,
            prolog,
            root,
            epilog,
        })
    }

    fn at_declaration(&self) -> bool {
        self.cursor.starts_with(b"<?xml")
            && matches!(
                self.cursor.peek(5),
                Some(b' ' | b'\t' | b'\r' | b'\n' | b'?')
            )
    }

    fn parse_declaration(&mut self) -> Result<(Option<String>, Option<String>)> {
        self.cursor.advance_by(5);
        let mut version = None;
        let mut encoding = None;

        loop {
            self.cursor.skip_whitespace();
            if self.cursor.consume_bytes(b"?>") {
                break;
            }
            if self.cursor.is_eof() {
                return Err(self.error_here("unterminated xml declaration"));
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            match name.as_str() {
                "version" => version = Some(value),
                "encoding" => encoding = Some(value),
                "standalone" => {}
                _ => return Err(self.error_here("unknown xml declaration field")),
            }
        }

        if version.is_none() {
            return Err(self.error_here("xml declaration without version"));
        }
        Ok((version, encoding))
    }

    /// Comments, processing instructions and (before the root) a DOCTYPE.
    /// Returns the comments.
    fn parse_misc(&mut self, before_root: bool) -> Result<Vec<String>> {
        let mut comments = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.consume_bytes(b"<!--") {
                comments.push(self.parse_comment_body()?);
            } else if self.cursor.consume_bytes(b"<?") {
                self.skip_until(b"?>")?;
            } else if before_root && self.cursor.starts_with(b"<!DOCTYPE") {
                self.skip_doctype()?;
            } else {
                return Ok(comments);
            }
        }
    }

    /// The root element and its content. Open ancestors are kept on an
    /// explicit stack so nesting depth never grows the call stack.
    fn parse_element(&mut self) -> Result<Element> {
        self.check_depth(1)?;
        let (mut current, closed) = self.parse_start_tag()?;
        if closed {
            return Ok(current);
        }
        let mut open: Vec<Element> = Vec::new();

        loop {
            if self.cursor.consume_bytes(b"</") {
                self.parse_end_tag(&current.name)?;
                match open.pop() {
                    Some(mut parent) => {
                        parent.children.push(Content::Element(current));
                        current = parent;
                    }
                    None => return Ok(current),
                }
                continue;
            }

            if self.cursor.consume_bytes(b"<!--") {
                let text = self.parse_comment_body()?;
                current.children.push(Content::Comment(text));
                continue;
            }

            if self.cursor.consume_bytes(b"<![CDATA[") {
                let start = self.cursor.pos();
                self.skip_until(b"]]>")?;
                let raw = self.cursor.slice_from(start);
                let body = raw.get(..raw.len().saturating_sub(3)).unwrap_or_default();
                let text = self.bytes_to_string(body)?;
                self.check_chars(&text)?;
                current.children.push(Content::CData(text));
                continue;
            }

            if self.cursor.consume_bytes(b"<?") {
                self.skip_until(b"?>")?;
                continue;
            }

            if self.cursor.current() == Some(b'<') {
                self.check_depth(open.len() + 2)?;
                let (child, closed) = self.parse_start_tag()?;
                if closed {
                    current.children.push(Content::Element(child));
                } else {
                    open.push(std::mem::replace(&mut current, child));
                }
                continue;
            }

            if self.cursor.is_eof() {
                return Err(self.error_here(&format!("unterminated element <{}>", current.name)));
            }

            if let Some(text) = self.parse_text()? {
                current.children.push(Content::Text(text));
            }
        }
    }

    fn check_chars(&self, text: &str) -> Result<()> {
        match text.chars().find(|&c| !is_xml_char(c)) {
            Some(c) => Err(self.error_here(&format!(
                "invalid character U+{:04X}",
                u32::from(c)
            ))),
            None => Ok(()),
        }
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(Error::recursion(self.config.max_depth));
        }
        Ok(())
    }

    /// `<name attrs>` or `<name attrs/>`; the flag is true for the latter
    fn parse_start_tag(&mut self) -> Result<(Element, bool)> {
        self.expect_byte(b'<')?;
        if self.cursor.current() == Some(b'/') {
            return Err(self.error_here("unexpected closing tag"));
        }

        let name = self.parse_name()?;
        let mut element = Element::new(name);
        self.parse_attributes(&mut element)?;

        if self.cursor.consume_bytes(b"/>") {
            return Ok((element, true));
        }
        self.expect_byte(b'>')?;
        Ok((element, false))
    }

    /// Cursor just past `</`
    fn parse_end_tag(&mut self, open_name: &str) -> Result<()> {
        let close_pos = self.cursor.position();
        let close_name = self.parse_name()?;
        if close_name != open_name {
            return Err(Error::at(
                ErrorKind::MalformedXml,
                close_pos,
                &format!("closing tag </{close_name}> does not match <{open_name}>"),
            ));
        }
        self.cursor.skip_whitespace();
        self.expect_byte(b'>')
    }

    fn parse_attributes(&mut self, element: &mut Element) -> Result<()> {
        let mut attrs = IndexMap::new();

        loop {
            let had_space = matches!(
                self.cursor.current(),
                Some(b' ' | b'\t' | b'\r' | b'\n')
            );
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>') => break,
                Some(_) if !had_space => {
                    return Err(self.error_here("expected whitespace before attribute"));
                }
                Some(_) => {}
                None => return Err(self.error_here("unexpected end of input")),
            }

            let name_pos = self.cursor.position();
            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            let duplicate = match namespace_prefix(&name) {
                Some(prefix) => element
                    .namespaces
                    .insert(prefix.to_string(), value)
                    .is_some(),
                None => attrs.insert(name.clone(), value).is_some(),
            };
            if duplicate {
                return Err(Error::at(
                    ErrorKind::MalformedXml,
                    name_pos,
                    &format!("duplicate attribute \"{name}\""),
                ));
            }
        }

        element.attributes = attrs;
        Ok(())
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = self.bytes_to_string(raw)?;
                self.check_chars(&text)?;
                let text = text.replace(['\t', '\n', '\r'], " ");
                return decode_entities(&text)
                    .map_err(|detail| Error::at(ErrorKind::MalformedXml, start_pos, &detail));
            }
            if b == b'<' {
                return Err(self.error_here("'<' in attribute value"));
            }
            self.cursor.advance();
        }

        Err(self.error_here("unterminated attribute value"))
    }

    fn parse_text(&mut self) -> Result<Option<String>> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = self.bytes_to_string(raw)?;
        self.check_chars(&text)?;
        let text = decode_entities(&text)
            .map_err(|detail| Error::at(ErrorKind::MalformedXml, start_pos, &detail))?;

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }

    /// Cursor just past `<!--`
    fn parse_comment_body(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        self.skip_until(b"-->")?;
        let raw = self.cursor.slice_from(start);
        let body = raw.get(..raw.len().saturating_sub(3)).unwrap_or_default();
        let text = self.bytes_to_string(body)?;
        self.check_chars(&text)?;
        if text.contains("--") || text.ends_with('-') {
            return Err(Error::at(
                ErrorKind::MalformedXml,
                start_pos,
                "'--' inside comment",
            ));
        }
        Ok(text)
    }

    fn parse_name(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();

        while let Some(b) = self.cursor.current() {
            if b >= 0x80 || b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'-' | b'.') {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let name = self.bytes_to_string(self.cursor.slice_from(start))?;
        if !is_valid_name(&name) {
            let detail = if name.is_empty() {
                "expected name".to_string()
            } else {
                format!("invalid name \"{name}\"")
            };
            return Err(Error::at(ErrorKind::MalformedXml, start_pos, &detail));
        }
        Ok(name)
    }

    fn skip_doctype(&mut self) -> Result<()> {
        let mut subset_depth = 0usize;
        let mut quote = None;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => subset_depth += 1,
                (None, b']') => subset_depth = subset_depth.saturating_sub(1),
                (None, b'>') if subset_depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_here("unterminated DOCTYPE"))
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        while self.cursor.current().is_some() {
            if self.cursor.consume_bytes(pattern) {
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(self.error_here("unterminated markup"))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            Err(self.error_here(&format!("expected '{}'", char::from(expected))))
        }
    }

    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| self.error_here("invalid utf-8"))
    }

    fn error_here(&self, message: &str) -> Error {
        error_at(self.cursor.position(), message)
    }
}

fn error_at(pos: Pos, message: &str) -> Error {
    Error::at(ErrorKind::MalformedXml, pos, message)
}

/// `xmlns` -> `""`, `xmlns:p` -> `"p"`
fn namespace_prefix(name: &str) -> Option<&str> {
    if name == "xmlns" {
        Some("")
    } else {
        name.strip_prefix("xmlns:")
    }
}

fn decode_entities(input: &str) -> std::result::Result<String, String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        result.push_str(rest.get(..amp).unwrap_or_default());
        let after = rest.get(amp + 1..).unwrap_or_default();
        let Some(semi) = after.find(';') else {
            return Err("unterminated entity reference".to_string());
        };
        let entity = after.get(..semi).unwrap_or_default();

        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(ch) => result.push(ch),
            None => return Err(format!("undefined entity \"&{entity};\"")),
        }
        rest = after.get(semi + 1..).unwrap_or_default();
    }
    result.push_str(rest);

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let (digits, radix) = match entity.strip_prefix("#x") {
        Some(hex) => (hex, 16),
        None => (entity.strip_prefix('#')?, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .filter(|&c| is_xml_char(c))
}
