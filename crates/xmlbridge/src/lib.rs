//! xmlbridge - encode dynamic values as XML and decode XML back into them
//!
//! Attributes, namespace declarations, comments and CDATA travel through
//! reserved map keys (`@attributes`, `@namespaces`, `@comment`, `@cdata`,
//! `@text`), so a decoded document can be encoded again into the same shape.
//!
//! # Quick Start
//!
//! ```
//! use xmlbridge::{DecodeConfig, EncodeConfig, WordRules, json};
//! # fn main() -> Result<(), xmlbridge::Error> {
//! let value = json::from_json_str(r#"{"cars": [{"id": "1"}, {"id": "2"}]}"#)?;
//!
//! let words = WordRules::singularize();
//! let xml = xmlbridge::encode("shop", &value, &EncodeConfig::default().with_words(words.clone()))?;
//! assert!(xml.contains("<car>"));
//!
//! let decoded = xmlbridge::decode(&xml, &DecodeConfig::default().with_words(words))?;
//! assert_eq!(decoded, value);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result};

pub mod value;
pub use value::{List, Map, Number, Value};

pub mod words;
pub use words::WordRules;

pub mod path;
pub use path::{NodePath, Segment};

pub mod config;
pub use config::{DecodeConfig, EncodeConfig};

pub mod xml;
pub use xml::{XmlWriter, is_valid_name};

pub mod encoder;
pub use encoder::{Encoder, Hook, Hooks};

pub mod decoder;
pub use decoder::{Decoder, is_valid};

pub mod json;

/// Media type of encoder output
pub const CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Encode `value` under a root element named `root`
pub fn encode(root: &str, value: &Value, config: &EncodeConfig) -> Result<String> {
    Encoder::new(config.clone()).encode(root, value)
}

/// Decode an XML document
pub fn decode(xml: &str, config: &DecodeConfig) -> Result<Value> {
    Decoder::new(config.clone()).decode(xml)
}

/// Decode an XML document into its `serde_json` object view
pub fn decode_to_json(xml: &str, config: &DecodeConfig) -> Result<serde_json::Value> {
    Decoder::new(config.clone()).decode_to_json(xml)
}
