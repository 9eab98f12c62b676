//! XML document model, parser and streaming writer

pub(crate) mod cursor;
pub mod model;
pub mod name;
pub mod parser;
pub mod writer;

pub use model::{CommentNode, Content, Document, Element};
pub use name::is_valid_name;
pub use parser::{Config as ParserConfig, Parser};
pub use writer::XmlWriter;

use crate::error::Result;

/// Parse `input` into a [`Document`] with the default limits
pub fn parse(input: &str) -> Result<Document> {
    Parser::new(input.as_bytes()).parse()
}
