//! XML data model

use std::collections::HashMap;

use indexmap::IndexMap;

/// XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// `version` from the XML declaration, if there was one
    pub version: Option<String>,
    /// `encoding` from the XML declaration, if there was one
    pub encoding: Option<String>,
    /// Comments before the root element
    pub prolog: Vec<String>,
    pub root: Element,
    /// Comments after the root element
    pub epilog: Vec<String>,
}

/// XML element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    /// Attributes other than namespace declarations
    pub attributes: IndexMap<String, String>,
    /// `xmlns` declarations, prefix -> URI (`""` is the default namespace)
    pub namespaces: IndexMap<String, String>,
    pub children: Vec<Content>,
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

/// A comment together with the DOM node path that locates it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentNode {
    /// e.g. `/root/cars[2]/comment()[1]`
    pub path: String,
    pub text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            Content::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn has_elements(&self) -> bool {
        self.elements().next().is_some()
    }

    /// Direct text content, CDATA sections included, concatenated
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Content::Text(text) | Content::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// How many child elements carry each name
    pub fn element_name_counts(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for element in self.elements() {
            *counts.entry(element.name.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Pushes the comments of this element and its descendants in document
    /// order. Walks with an explicit stack rather than recursion.
    fn collect_comments(&self, path: String, out: &mut Vec<CommentNode>) {
        let mut stack = vec![Visit::new(self, path)];
        while let Some(visit) = stack.last_mut() {
            let element = visit.element;
            let Some(child) = element.children.get(visit.next) else {
                stack.pop();
                continue;
            };
            visit.next += 1;

            match child {
                Content::Element(child) => {
                    let name = child.name.as_str();
                    let position = visit.seen.entry(name).or_insert(0);
                    *position += 1;
                    let total = visit.totals.get(name).copied().unwrap_or(1);
                    let child_path = step(&visit.path, name, *position, total);
                    stack.push(Visit::new(child, child_path));
                }
                Content::Comment(text) => {
                    visit.comments_seen += 1;
                    out.push(CommentNode {
                        path: step(
                            &visit.path,
                            "comment()",
                            visit.comments_seen,
                            visit.comment_total,
                        ),
                        text: text.clone(),
                    });
                }
                Content::Text(_) | Content::CData(_) => {}
            }
        }
    }
}

/// Progress through one element's children during the comment walk
struct Visit<'e> {
    element: &'e Element,
    path: String,
    next: usize,
    totals: HashMap<&'e str, usize>,
    seen: HashMap<&'e str, usize>,
    comment_total: usize,
    comments_seen: usize,
}

impl<'e> Visit<'e> {
    fn new(element: &'e Element, path: String) -> Self {
        let comment_total = element
            .children
            .iter()
            .filter(|child| matches!(child, Content::Comment(_)))
            .count();
        Self {
            element,
            path,
            next: 0,
            totals: element.element_name_counts(),
            seen: HashMap::new(),
            comment_total,
            comments_seen: 0,
        }
    }
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            version: None,
            encoding: None,
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Every comment in the document, in document order, with its node path
    pub fn comments(&self) -> Vec<CommentNode> {
        let total = self.prolog.len() + self.epilog.len();
        let mut out = Vec::new();

        let document_level = |position: usize, text: &String| CommentNode {
            path: step("", "comment()", position, total),
            text: text.clone(),
        };

        out.extend(
            self.prolog
                .iter()
                .enumerate()
                .map(|(i, text)| document_level(i + 1, text)),
        );
        self.root
            .collect_comments(format!("/{}", self.root.name), &mut out);
        out.extend(
            self.epilog
                .iter()
                .enumerate()
                .map(|(i, text)| document_level(self.prolog.len() + i + 1, text)),
        );
        out
    }
}

fn step(parent: &str, name: &str, position: usize, total: usize) -> String {
    if total > 1 {
        format!("{parent}/{name}[{position}]")
    } else {
        format!("{parent}/{name}")
    }
}
