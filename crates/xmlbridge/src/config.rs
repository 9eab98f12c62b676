//! Per-call encode and decode settings

use crate::words::WordRules;

/// Settings for [`crate::Encoder`]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncodeConfig {
    pub words: WordRules,
    /// Write null values as `<key xsi:nil="true"/>` instead of an empty element
    pub nil_on_null: bool,
    /// `version` of the XML declaration
    pub document_version: String,
    /// Indentation unit; empty writes everything on one line
    pub indent_string: String,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            words: WordRules::default(),
            nil_on_null: false,
            document_version: "1.0".to_string(),
            indent_string: " ".to_string(),
        }
    }
}

impl EncodeConfig {
    pub fn with_words(mut self, words: WordRules) -> Self {
        self.words = words;
        self
    }

    pub fn with_nil_on_null(mut self, nil_on_null: bool) -> Self {
        self.nil_on_null = nil_on_null;
        self
    }

    pub fn with_document_version(mut self, version: impl Into<String>) -> Self {
        self.document_version = version.into();
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent_string = indent.into();
        self
    }
}

/// Settings for [`crate::Decoder`]
///
/// By default everything but plain data is dropped: comments, attributes,
/// namespace declarations and the root element wrapper.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecodeConfig {
    pub words: WordRules,
    pub strip_comments: bool,
    pub strip_attributes: bool,
    pub strip_namespaces: bool,
    /// Return the root element's content instead of `{root: content}`
    pub strip_root: bool,
    /// Deepest element nesting accepted; the root element is level 1
    pub max_recursion_depth: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            words: WordRules::default(),
            strip_comments: true,
            strip_attributes: true,
            strip_namespaces: true,
            strip_root: true,
            max_recursion_depth: 500,
        }
    }
}

impl DecodeConfig {
    /// Keep comments, attributes, namespaces and the root element
    pub fn keep_all() -> Self {
        Self {
            strip_comments: false,
            strip_attributes: false,
            strip_namespaces: false,
            strip_root: false,
            ..Self::default()
        }
    }

    pub fn with_words(mut self, words: WordRules) -> Self {
        self.words = words;
        self
    }

    pub fn with_strip_comments(mut self, strip: bool) -> Self {
        self.strip_comments = strip;
        self
    }

    pub fn with_strip_attributes(mut self, strip: bool) -> Self {
        self.strip_attributes = strip;
        self
    }

    pub fn with_strip_namespaces(mut self, strip: bool) -> Self {
        self.strip_namespaces = strip;
        self
    }

    pub fn with_strip_root(mut self, strip: bool) -> Self {
        self.strip_root = strip;
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }
}
