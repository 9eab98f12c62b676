//! Value to XML encoding.
//!
//! The encoder walks a [`Value`] and emits one element per map entry:
//!
//! - scalars become simple elements (`<name>text</name>`);
//! - maps become nested elements, with an `@attributes` entry landing on the
//!   start tag;
//! - lists become repeated elements, wrapped in a container holding singular
//!   item names when singularization applies (`cars` -> `<cars><car/>...`);
//! - the reserved keys `@text`, `@cdata` and `@comment` emit text, CDATA and
//!   comments in place.
//!
//! A [`Hooks`] registry can take over emission of any node by name.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, instrument, trace};

use crate::config::EncodeConfig;
use crate::error::{Error, Result};
use crate::value::{ATTRIBUTES, CDATA, COMMENT, List, Map, NAMESPACES, TEXT, Value};
use crate::xml::XmlWriter;

/// Callback that replaces the default emission of a node
pub type Hook = Box<dyn Fn(&mut XmlWriter, &str, &Value) -> Result<()> + Send + Sync>;

/// Node-name keyed registry of encode hooks
#[derive(Default)]
pub struct Hooks {
    hooks: HashMap<String, Hook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hook` for nodes named `name`, replacing any earlier one
    pub fn on<F>(&mut self, name: impl Into<String>, hook: F) -> &mut Self
    where
        F: Fn(&mut XmlWriter, &str, &Value) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.insert(name.into(), Box::new(hook));
        self
    }

    fn get(&self, name: &str) -> Option<&Hook> {
        self.hooks.get(name)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.hooks.keys()).finish()
    }
}

/// XML encoder
#[derive(Debug, Default)]
pub struct Encoder {
    config: EncodeConfig,
    hooks: Hooks,
}

impl Encoder {
    pub fn new(config: EncodeConfig) -> Self {
        Self {
            config,
            hooks: Hooks::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Encodes `value` as a document whose root element is `root`
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty root name or a value that has no XML
    /// form, `InvalidElementName` when a node name is not a valid XML name.
    #[instrument(level = "debug", skip(self, value))]
    pub fn encode(&self, root: &str, value: &Value) -> Result<String> {
        if root.is_empty() {
            return Err(Error::invalid_input("root element name must not be empty"));
        }

        let mut emitter = Emitter {
            writer: XmlWriter::new(&self.config.indent_string),
            config: &self.config,
            hooks: &self.hooks,
        };

        emitter.writer.start_document(&self.config.document_version)?;
        emitter.writer.start_element(root)?;
        match value {
            Value::Map(map) => {
                if let Some(attributes) = map.get(ATTRIBUTES) {
                    emitter.write_attributes(root, attributes)?;
                }
                emitter.rotate_map(map)?;
            }
            Value::List(list) => emitter.rotate_list(list)?,
            scalar => emitter.write_scalar_text(root, scalar)?,
        }
        emitter.writer.end_element()?;

        let xml = emitter.writer.finish()?;
        debug!(bytes = xml.len(), "encoded document");
        Ok(xml)
    }
}

/// State of one encode call
struct Emitter<'a> {
    writer: XmlWriter,
    config: &'a EncodeConfig,
    hooks: &'a Hooks,
}

impl Emitter<'_> {
    /// Every entry but `@attributes`, which belongs to the enclosing start tag
    fn rotate_map(&mut self, map: &Map) -> Result<()> {
        for (name, item) in map {
            if name != ATTRIBUTES {
                self.node(name, item)?;
            }
        }
        Ok(())
    }

    /// List entries are named by their index, which is never a valid XML name
    fn rotate_list(&mut self, list: &List) -> Result<()> {
        for (index, item) in list.iter().enumerate() {
            self.node(&index.to_string(), item)?;
        }
        Ok(())
    }

    fn node(&mut self, name: &str, item: &Value) -> Result<()> {
        let hooks = self.hooks;
        if let Some(hook) = hooks.get(name) {
            trace!(node = name, "dispatching encode hook");
            return hook(&mut self.writer, name, item);
        }

        match name {
            COMMENT => return self.comments(item),
            CDATA => {
                let text = self.text_of(name, item)?;
                return self.writer.write_cdata(&text);
            }
            TEXT => {
                return match item {
                    Value::Map(map) => self.rotate_map(map),
                    Value::List(list) => self.rotate_list(list),
                    scalar => self.write_scalar_text(name, scalar),
                };
            }
            _ => {}
        }

        match item {
            Value::Map(map) => match text_with_attributes(map) {
                Some((text, attributes)) => self.text_with_attributes(name, text, attributes),
                None => self.nested(name, map, None),
            },
            Value::List(list) => self.singular_group(name, list, None),
            Value::Null if self.config.nil_on_null => {
                self.writer.start_element(name)?;
                self.writer.write_attribute("xsi:nil", "true")?;
                self.writer.end_element()
            }
            scalar => {
                let text = self.text_of(name, scalar)?;
                self.writer.write_element(name, &text)
            }
        }
    }

    /// `{@text, @attributes}` maps
    fn text_with_attributes(&mut self, name: &str, text: &Value, attributes: &Value) -> Result<()> {
        match text {
            Value::Map(content) => self.nested(name, content, Some(attributes)),
            Value::List(items) => self.singular_group(name, items, Some(attributes)),
            scalar => {
                self.writer.start_element(name)?;
                self.write_attributes(name, attributes)?;
                self.write_scalar_text(name, scalar)?;
                self.writer.end_element()
            }
        }
    }

    /// `<name attrs...>` + entries + `</name>`; `extra` attributes are written
    /// before the map's own
    fn nested(&mut self, name: &str, map: &Map, extra: Option<&Value>) -> Result<()> {
        self.writer.start_element(name)?;
        if let Some(attributes) = extra {
            self.write_attributes(name, attributes)?;
        }
        if let Some(attributes) = map.get(ATTRIBUTES) {
            self.write_attributes(name, attributes)?;
        }
        self.rotate_map(map)?;
        self.writer.end_element()
    }

    /// A list under `name`: either a `name` wrapper holding one element per
    /// item under the singular name, or one `name` sibling per item
    fn singular_group(&mut self, name: &str, items: &List, attributes: Option<&Value>) -> Result<()> {
        let singular = self.config.words.to_singular(name);

        if self.config.words.wraps(name) {
            debug!(node = name, item = %singular, "wrapping list items");
            self.writer.start_element(name)?;
            if let Some(attributes) = attributes {
                self.write_attributes(name, attributes)?;
            }
            for item in items {
                self.node(&singular, item)?;
            }
            return self.writer.end_element();
        }

        for item in items {
            match item {
                Value::Map(map) => match text_with_attributes(map) {
                    Some((text, own)) if attributes.is_none() => {
                        self.text_with_attributes(name, text, own)?;
                    }
                    _ => self.nested(name, map, attributes)?,
                },
                Value::List(list) => {
                    // a list directly inside a list has no element names
                    self.writer.start_element(name)?;
                    self.rotate_list(list)?;
                    self.writer.end_element()?;
                }
                scalar => {
                    self.writer.start_element(name)?;
                    if let Some(attributes) = attributes {
                        self.write_attributes(name, attributes)?;
                    }
                    self.write_scalar_text(name, scalar)?;
                    self.writer.end_element()?;
                }
            }
        }
        Ok(())
    }

    fn comments(&mut self, item: &Value) -> Result<()> {
        match item {
            Value::List(list) => {
                for comment in list {
                    let text = self.text_of(COMMENT, comment)?;
                    self.writer.write_comment(&text)?;
                }
                Ok(())
            }
            single => {
                let text = self.text_of(COMMENT, single)?;
                self.writer.write_comment(&text)
            }
        }
    }

    fn write_attributes(&mut self, element: &str, attributes: &Value) -> Result<()> {
        let Value::Map(attributes) = attributes else {
            return Err(Error::invalid_input(format!(
                "{ATTRIBUTES} of <{element}> must be a map"
            )));
        };

        let mut declared = HashSet::new();
        for (name, value) in attributes {
            if name == NAMESPACES {
                match value {
                    Value::List(list) => {
                        for namespace in list {
                            self.write_namespace(element, namespace, &mut declared)?;
                        }
                    }
                    single => self.write_namespace(element, single, &mut declared)?,
                }
            } else {
                let text = self.text_of(name, value)?;
                self.writer.write_attribute(name, &text)?;
            }
        }
        Ok(())
    }

    /// `{name, uri, content}`: `xmlns` / `xmlns:p` names declare a namespace,
    /// `p:local` names write an attribute and declare `p` with `uri`
    fn write_namespace(
        &mut self,
        element: &str,
        namespace: &Value,
        declared: &mut HashSet<String>,
    ) -> Result<()> {
        let Value::Map(namespace) = namespace else {
            return Err(Error::invalid_input(format!(
                "{NAMESPACES} of <{element}> must hold maps"
            )));
        };
        let field = |key: &str| namespace.get(key).and_then(Value::to_text);
        let name = field("name").unwrap_or_default();
        let uri = field("uri");

        let (prefix, local) = match name.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, name.as_str()),
        };

        match (prefix, local) {
            (None, "xmlns") => self.declare(declared, "", uri.as_deref()),
            (Some("xmlns"), prefix) => self.declare(declared, prefix, uri.as_deref()),
            (Some(prefix), _) => {
                self.declare(declared, prefix, uri.as_deref())?;
                let content = field("content").unwrap_or_default();
                self.writer.write_attribute(&name, &content)
            }
            (None, local) => {
                let content = field("content").unwrap_or_default();
                self.writer.write_attribute(local, &content)
            }
        }
    }

    fn declare(&mut self, declared: &mut HashSet<String>, prefix: &str, uri: Option<&str>) -> Result<()> {
        match uri {
            Some(uri) if declared.insert(prefix.to_string()) => {
                self.writer.write_namespace(prefix, uri)
            }
            _ => Ok(()),
        }
    }

    fn write_scalar_text(&mut self, name: &str, scalar: &Value) -> Result<()> {
        let text = self.text_of(name, scalar)?;
        self.writer.write_text(&text)
    }

    fn text_of(&self, name: &str, value: &Value) -> Result<String> {
        value.to_text().ok_or_else(|| {
            Error::invalid_input(format!("\"{name}\" must hold a scalar value"))
        })
    }
}

/// Splits a map made of exactly `@text` and `@attributes`
fn text_with_attributes(map: &Map) -> Option<(&Value, &Value)> {
    if map.len() != 2 {
        return None;
    }
    Some((map.get(TEXT)?, map.get(ATTRIBUTES)?))
}
