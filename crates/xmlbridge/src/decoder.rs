//! XML to value decoding.
//!
//! Each element becomes exactly one [`Value`]:
//!
//! - an element without child elements becomes its trimmed text, or
//!   `{@attributes, @text}` when attributes are kept;
//! - an element with children becomes a map keyed by child name. A child
//!   named like the singular form of its parent is collected into a list
//!   (`<cars><car/><car/></cars>` -> `{cars: [.., ..]}`), and a repeated
//!   child name is promoted to a list on its second occurrence.
//!
//! Comments are located in a separate pass over the document and attached
//! to the element holding them under `@comment`.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, trace};

use crate::config::DecodeConfig;
use crate::error::{Error, Result};
use crate::json;
use crate::path::NodePath;
use crate::value::{ATTRIBUTES, COMMENT, List, Map, NAMESPACES, TEXT, Value};
use crate::xml::{Document, Element, Parser, ParserConfig};

const XSI_NIL: &str = "xsi:nil";

/// XML decoder
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    config: DecodeConfig,
}

impl Decoder {
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Parses and decodes `xml`
    ///
    /// # Errors
    ///
    /// `MalformedXml` if `xml` is not well formed, `RecursionError` if elements
    /// nest deeper than `max_recursion_depth`.
    #[instrument(level = "debug", skip_all, fields(len = xml.len()))]
    pub fn decode(&self, xml: &str) -> Result<Value> {
        let parser_config = ParserConfig {
            max_depth: self.config.max_recursion_depth,
        };
        let document = Parser::with_config(xml.as_bytes(), parser_config).parse()?;
        self.decode_document(&document)
    }

    /// Decodes an already parsed document
    pub fn decode_document(&self, document: &Document) -> Result<Value> {
        let root = &document.root;
        let root_path = if self.config.strip_root {
            NodePath::new()
        } else {
            NodePath::new().child(&root.name, None)
        };

        let comments = if self.config.strip_comments {
            HashMap::new()
        } else {
            self.collect_comments(document, &root_path)?
        };

        let mut walk = Walk {
            config: &self.config,
            comments,
        };
        let value = walk.run(root, root_path)?;

        if self.config.strip_root {
            Ok(value)
        } else {
            let mut wrapped = Map::with_capacity(1);
            wrapped.insert(root.name.clone(), value);
            Ok(Value::Map(wrapped))
        }
    }

    /// Object view: the decoded value as `serde_json::Value`
    pub fn decode_to_json(&self, xml: &str) -> Result<serde_json::Value> {
        self.decode(xml).map(|value| json::to_json(&value))
    }

    pub fn decode_to_json_string(&self, xml: &str) -> Result<String> {
        json::to_json_string(&self.decode(xml)?)
    }

    /// Comment texts keyed by the path of the element each belongs to, in
    /// document order. Comments outside the root element belong to the root.
    fn collect_comments(
        &self,
        document: &Document,
        root_path: &NodePath,
    ) -> Result<HashMap<NodePath, Vec<String>>> {
        let mut comments: HashMap<NodePath, Vec<String>> = HashMap::new();
        for node in document.comments() {
            let (parent, _position) = NodePath::parse_comment(&node.path)?;
            let key = if parent.is_empty() {
                root_path.clone()
            } else if self.config.strip_root {
                parent.strip_root()
            } else {
                parent
            };
            trace!(path = %node.path, element = %key, "collected comment");
            comments.entry(key).or_default().push(node.text);
        }
        Ok(comments)
    }
}

/// Returns true if `xml` parses as a well-formed document
pub fn is_valid(xml: &str) -> bool {
    match Parser::new(xml.as_bytes()).parse() {
        Ok(_) => true,
        Err(err) => {
            trace!(error = %err, "xml validity probe failed");
            false
        }
    }
}

/// State of one decode call
struct Walk<'a> {
    config: &'a DecodeConfig,
    comments: HashMap<NodePath, Vec<String>>,
}

/// An element whose children are being decoded
struct Frame<'e> {
    element: &'e Element,
    path: NodePath,
    is_root: bool,
    pending: std::vec::IntoIter<(&'e Element, NodePath)>,
    decoded: Vec<(&'e str, Value)>,
}

impl Walk<'_> {
    /// Decodes `root` and everything below it. Children are decoded before
    /// their parent from an explicit stack, so deep documents do not grow
    /// the call stack.
    fn run(&mut self, root: &Element, root_path: NodePath) -> Result<Value> {
        let mut stack = vec![self.open(root, root_path, 1)?];
        let mut finished = None;

        while let Some(top) = stack.last_mut() {
            if let Some((child, path)) = top.pending.next() {
                let depth = stack.len() + 1;
                let frame = self.open(child, path, depth)?;
                stack.push(frame);
                continue;
            }

            if let Some(done) = stack.pop() {
                let name = done.element.name.as_str();
                let value = self.close(done);
                match stack.last_mut() {
                    Some(parent) => parent.decoded.push((name, value)),
                    None => finished = Some(value),
                }
            }
        }

        finished.ok_or_else(|| Error::invalid_input("document has no root element"))
    }

    /// `depth` is the nesting level, 1 for the root element
    fn open<'e>(&self, element: &'e Element, path: NodePath, depth: usize) -> Result<Frame<'e>> {
        if depth > self.config.max_recursion_depth {
            return Err(Error::recursion(self.config.max_recursion_depth));
        }

        let totals = element.element_name_counts();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let pending: Vec<_> = element
            .elements()
            .map(|child| {
                let name = child.name.as_str();
                let position = positions.entry(name).or_insert(0);
                *position += 1;
                let index = (totals.get(name).copied().unwrap_or(1) > 1).then_some(*position);
                (child, path.child(name, index))
            })
            .collect();

        Ok(Frame {
            element,
            decoded: Vec::with_capacity(pending.len()),
            pending: pending.into_iter(),
            path,
            is_root: depth == 1,
        })
    }

    /// Builds an element's value once all of its children are decoded
    fn close(&mut self, frame: Frame<'_>) -> Value {
        let Frame {
            element,
            path,
            is_root,
            decoded,
            ..
        } = frame;
        let attributes = self.attributes(element, is_root);
        let comments = self.comments.remove(&path);
        let text = element.text();
        let text = text.trim();

        if decoded.is_empty() {
            let value = match attributes {
                Some(attributes) => {
                    let mut map = Map::with_capacity(2);
                    map.insert(ATTRIBUTES, attributes);
                    if !text.is_empty() {
                        map.insert(TEXT, text);
                    }
                    Value::Map(map)
                }
                None if text.is_empty() && is_nil(element) => Value::Null,
                None => Value::from(text),
            };
            return with_comments(value, comments);
        }

        let singular = self.config.words.to_singular(&element.name);
        let mut promoted: HashSet<&str> = HashSet::new();
        let mut flattened = false;
        let mut entries = Map::new();

        for (name, value) in decoded {
            if singular == name {
                flattened = true;
                match entries.get_mut(name) {
                    Some(Value::List(list)) => list.push(value),
                    _ => {
                        entries.insert(name, Value::List(List::from(vec![value])));
                    }
                }
            } else if promoted.contains(name) {
                if let Some(Value::List(list)) = entries.get_mut(name) {
                    list.push(value);
                }
            } else if let Some(existing) = entries.get_mut(name) {
                trace!(element = %element.name, child = name, "promoting repeated child to a list");
                let first = std::mem::take(existing);
                *existing = Value::List(List::from(vec![first, value]));
                promoted.insert(name);
            } else {
                entries.insert(name, value);
            }
        }

        if !text.is_empty() {
            entries.insert(TEXT, text);
        }
        if let Some(attributes) = attributes {
            entries.insert_first(ATTRIBUTES, attributes);
        }
        if let Some(comments) = comments {
            entries.insert_first(COMMENT, comment_value(comments));
        }

        if flattened && entries.len() == 1 {
            if let Some((_, list)) = entries.into_iter().next() {
                debug!(element = %element.name, "flattened children into a list");
                return list;
            }
            return Value::List(List::new());
        }
        Value::Map(entries)
    }

    /// `@attributes` for `element`: its attributes unless stripped, plus the
    /// root's namespace declarations unless stripped
    fn attributes(&self, element: &Element, is_root: bool) -> Option<Value> {
        let mut attributes = Map::new();
        if !self.config.strip_attributes {
            for (name, value) in &element.attributes {
                attributes.insert(name.clone(), value.as_str());
            }
        }
        if is_root && !self.config.strip_namespaces && !element.namespaces.is_empty() {
            let namespaces: List = element
                .namespaces
                .iter()
                .map(|(prefix, uri)| namespace_value(prefix, uri))
                .collect();
            attributes.insert(NAMESPACES, namespaces);
        }

        (!attributes.is_empty()).then_some(Value::Map(attributes))
    }
}

fn namespace_value(prefix: &str, uri: &str) -> Value {
    let name = if prefix.is_empty() {
        "xmlns".to_string()
    } else {
        format!("xmlns:{prefix}")
    };
    let mut map = Map::with_capacity(2);
    map.insert("name", name);
    map.insert("uri", uri);
    Value::Map(map)
}

fn is_nil(element: &Element) -> bool {
    element.attributes.get(XSI_NIL).is_some_and(|v| v == "true")
}

fn comment_value(mut comments: Vec<String>) -> Value {
    if comments.len() == 1 {
        Value::from(comments.remove(0))
    } else {
        Value::List(comments.into_iter().map(Value::from).collect())
    }
}

/// Adds `@comment` to a leaf value, turning a scalar into `{@comment, @text}`.
/// Empty text is left out; null stays as `@text: null`.
fn with_comments(value: Value, comments: Option<Vec<String>>) -> Value {
    let Some(comments) = comments else {
        return value;
    };
    match value {
        Value::Map(mut map) => {
            map.insert_first(COMMENT, comment_value(comments));
            Value::Map(map)
        }
        scalar => {
            let mut map = Map::with_capacity(2);
            map.insert(COMMENT, comment_value(comments));
            if scalar.as_str() != Some("") {
                map.insert(TEXT, scalar);
            }
            Value::Map(map)
        }
    }
}
