//! Streaming XML writer used by the encoder and by encode hooks.
//!
//! Start tags stay open until the first child, text or end, so attributes can
//! be added right after [`XmlWriter::start_element`]. An element that receives
//! nothing is written as an empty tag (`<name/>`).

use std::borrow::Cow;

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;

use crate::error::{Error, Result};
use crate::xml::name::is_valid_name;

const CDATA_END: &str = "]]>";

/// Streaming writer over an in-memory buffer
pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
    started: bool,
}

impl std::fmt::Debug for XmlWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlWriter")
            .field("open", &self.open)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl XmlWriter {
    /// Writer indenting nested elements with `indent`; an empty string disables
    /// indentation. Indentation repeats the first byte of `indent` once per byte.
    pub fn new(indent: &str) -> Self {
        let writer = match indent.as_bytes().first() {
            Some(&byte) => Writer::new_with_indent(Vec::new(), byte, indent.len()),
            None => Writer::new(Vec::new()),
        };
        Self {
            writer,
            pending: None,
            open: Vec::new(),
            started: false,
        }
    }

    /// Writes the XML declaration; must come before anything else
    pub fn start_document(&mut self, version: &str) -> Result<()> {
        if self.started {
            return Err(Error::invalid_input(
                "xml declaration must be the first thing written",
            ));
        }
        self.started = true;
        self.writer
            .write_event(Event::Decl(BytesDecl::new(version, Some("UTF-8"), None)))?;
        Ok(())
    }

    /// Opens `name`; attributes may follow until content is written
    pub fn start_element(&mut self, name: &str) -> Result<()> {
        if !is_valid_name(name) {
            return Err(Error::invalid_name(name));
        }
        self.flush_pending()?;
        self.started = true;
        self.pending = Some(BytesStart::new(name.to_string()));
        self.open.push(name.to_string());
        Ok(())
    }

    /// Adds an attribute to the element just opened
    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        if !is_valid_name(name) {
            return Err(Error::invalid_name(name));
        }
        let Some(start) = self.pending.as_mut() else {
            return Err(Error::invalid_input(format!(
                "attribute \"{name}\" written outside a start tag"
            )));
        };
        let value = escape_attribute(value);
        start.push_attribute(Attribute {
            key: QName(name.as_bytes()),
            value: Cow::Owned(value.into_bytes()),
        });
        Ok(())
    }

    /// Declares a namespace on the element just opened; an empty prefix
    /// declares the default namespace
    pub fn write_namespace(&mut self, prefix: &str, uri: &str) -> Result<()> {
        if prefix.is_empty() {
            self.write_attribute("xmlns", uri)
        } else {
            self.write_attribute(&format!("xmlns:{prefix}"), uri)
        }
    }

    /// Escaped text content
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.flush_pending()?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// CDATA section; a `]]>` inside `text` splits it across two sections
    pub fn write_cdata(&mut self, text: &str) -> Result<()> {
        self.flush_pending()?;
        let mut rest = text;
        while let Some(at) = rest.find(CDATA_END) {
            let (head, tail) = rest.split_at(at + 2);
            self.writer.write_event(Event::CData(BytesCData::new(head)))?;
            rest = tail;
        }
        self.writer.write_event(Event::CData(BytesCData::new(rest)))?;
        Ok(())
    }

    pub fn write_comment(&mut self, text: &str) -> Result<()> {
        if text.contains("--") || text.ends_with('-') {
            return Err(Error::invalid_input(format!(
                "comment {text:?} contains \"--\" or ends with '-'"
            )));
        }
        self.flush_pending()?;
        self.started = true;
        self.writer
            .write_event(Event::Comment(BytesText::from_escaped(text)))?;
        Ok(())
    }

    /// `<name>text</name>`
    pub fn write_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start_element(name)?;
        self.write_text(text)?;
        self.end_element()
    }

    /// Closes the innermost open element
    pub fn end_element(&mut self) -> Result<()> {
        let Some(name) = self.open.pop() else {
            return Err(Error::invalid_input("end_element without an open element"));
        };
        match self.pending.take() {
            Some(start) => self.writer.write_event(Event::Empty(start))?,
            None => self.writer.write_event(Event::End(BytesEnd::new(name)))?,
        }
        Ok(())
    }

    /// Document text; every element must be closed
    pub fn finish(self) -> Result<String> {
        if let Some(name) = self.open.last() {
            return Err(Error::invalid_input(format!(
                "element <{name}> was never closed"
            )));
        }
        Ok(String::from_utf8(self.writer.into_inner())?)
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}

/// Escapes markup characters plus tab, newline and carriage return, which a
/// parser would otherwise normalize to spaces
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in escape(value).chars() {
        match c {
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
    out
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new("")
    }
}
