//! Structural paths locating nodes inside a document.
//!
//! Paths come from DOM-style node paths (`/root/cars[2]/comment()[1]`) and are
//! parsed once into segments. An element step contributes a [`Segment::Field`],
//! followed by a 1-based [`Segment::Index`] when same-named siblings exist.

use std::fmt;

use crate::error::{Error, ErrorKind, Result};

const COMMENT_STEP: &str = "comment()";

/// One step of a [`NodePath`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    Field(String),
    Index(usize),
}

/// Ordered list of segments from the document root down to one element
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<Segment>);

impl NodePath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of a child element, `index` being its 1-based position among
    /// same-named siblings when it has any
    pub fn child(&self, name: &str, index: Option<usize>) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Field(name.to_string()));
        if let Some(index) = index {
            segments.push(Segment::Index(index));
        }
        Self(segments)
    }

    /// Drops the leading root element step
    pub fn strip_root(&self) -> Self {
        let mut rest = self.0.iter().peekable();
        if matches!(rest.peek(), Some(Segment::Field(_))) {
            rest.next();
            if matches!(rest.peek(), Some(Segment::Index(_))) {
                rest.next();
            }
        }
        Self(rest.cloned().collect())
    }

    /// Parses an element path such as `/root/cars[2]/car`
    pub fn parse(xpath: &str) -> Result<Self> {
        let mut segments = Vec::new();
        for step in steps(xpath)? {
            let (name, index) = split_step(step, xpath)?;
            if name == COMMENT_STEP {
                return Err(path_error(xpath, "comment step in element path"));
            }
            segments.push(Segment::Field(name.to_string()));
            if let Some(index) = index {
                segments.push(Segment::Index(index));
            }
        }
        Ok(Self(segments))
    }

    /// Parses a comment node path such as `/root/comment()[2]` into the path of
    /// the element holding the comment and the comment's 1-based position
    pub fn parse_comment(xpath: &str) -> Result<(Self, usize)> {
        let Some((parent, last)) = xpath.rsplit_once('/') else {
            return Err(path_error(xpath, "path must start with '/'"));
        };
        let (name, index) = split_step(last, xpath)?;
        if name != COMMENT_STEP {
            return Err(path_error(xpath, "path does not address a comment"));
        }
        let parent = if parent.is_empty() {
            Self::new()
        } else {
            Self::parse(parent)?
        };
        Ok((parent, index.unwrap_or(1)))
    }
}

impl fmt::Display for NodePath {
    /// Dot-delimited form, e.g. `root.cars.2`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Field(name) => f.write_str(name)?,
                Segment::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

fn steps(xpath: &str) -> Result<impl Iterator<Item = &str>> {
    let Some(rest) = xpath.strip_prefix('/') else {
        return Err(path_error(xpath, "path must start with '/'"));
    };
    Ok(rest.split('/').filter(|step| !step.is_empty()))
}

fn split_step<'a>(step: &'a str, xpath: &str) -> Result<(&'a str, Option<usize>)> {
    let Some(open) = step.find('[') else {
        return Ok((step, None));
    };
    let name = step.get(..open).unwrap_or_default();
    let index = step
        .get(open + 1..)
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|digits| digits.parse::<usize>().ok())
        .filter(|index| *index > 0)
        .ok_or_else(|| path_error(xpath, "bad position predicate"))?;
    Ok((name, Some(index)))
}

fn path_error(xpath: &str, detail: &str) -> Error {
    Error::with_message(
        ErrorKind::InvalidInput,
        format!("invalid node path \"{xpath}\": {detail}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_element_path() -> Result<()> {
        let path = NodePath::parse("/root/cars[2]/car")?;
        assert_eq!(
            path.segments(),
            &[
                Segment::Field("root".to_string()),
                Segment::Field("cars".to_string()),
                Segment::Index(2),
                Segment::Field("car".to_string()),
            ]
        );
        assert_eq!(path.to_string(), "root.cars.2.car");
        Ok(())
    }

    #[test]
    fn test_parse_comment_path() -> Result<()> {
        let (parent, position) = NodePath::parse_comment("/root/cars[2]/comment()[3]")?;
        assert_eq!(parent.to_string(), "root.cars.2");
        assert_eq!(position, 3);

        let (parent, position) = NodePath::parse_comment("/root/comment()")?;
        assert_eq!(parent.to_string(), "root");
        assert_eq!(position, 1);
        Ok(())
    }

    #[test]
    fn test_document_level_comment() -> Result<()> {
        let (parent, position) = NodePath::parse_comment("/comment()[2]")?;
        assert!(parent.is_empty());
        assert_eq!(position, 2);
        Ok(())
    }

    #[test]
    fn test_strip_root() -> Result<()> {
        let path = NodePath::parse("/root/cars[2]")?;
        assert_eq!(path.strip_root().to_string(), "cars.2");
        assert!(NodePath::parse("/root")?.strip_root().is_empty());
        Ok(())
    }

    #[test]
    fn test_child_matches_parse() -> Result<()> {
        let built = NodePath::new()
            .child("root", None)
            .child("cars", Some(2))
            .child("car", None);
        assert_eq!(built, NodePath::parse("/root/cars[2]/car")?);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_paths() {
        assert!(NodePath::parse("root/cars").is_err());
        assert!(NodePath::parse("/root/cars[x]").is_err());
        assert!(NodePath::parse("/root/cars[0]").is_err());
        assert!(NodePath::parse("/root/comment()").is_err());
        assert!(NodePath::parse_comment("/root/cars").is_err());
    }
}
