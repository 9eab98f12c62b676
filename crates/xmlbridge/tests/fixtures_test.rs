use std::fs;
use xmlbridge::{DecodeConfig, ErrorKind, decode, is_valid};

#[test]
fn test_valid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let valid_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/valid");
    for entry in fs::read_dir(valid_dir)? {
        let path = entry?.path();
        let content = fs::read_to_string(&path)?;
        if !is_valid(&content) {
            return Err(std::io::Error::other(format!("Failed to parse valid file: {path:?}")).into());
        }
        if let Err(err) = decode(&content, &DecodeConfig::keep_all()) {
            return Err(std::io::Error::other(format!("Failed to decode {path:?}: {err}")).into());
        }
    }
    Ok(())
}

#[test]
fn test_invalid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let invalid_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/invalid");
    for entry in fs::read_dir(invalid_dir)? {
        let path = entry?.path();
        let content = fs::read_to_string(&path)?;
        if is_valid(&content) {
            return Err(std::io::Error::other(format!(
                "Should fail to parse invalid file: {path:?}"
            ))
            .into());
        }
        match decode(&content, &DecodeConfig::default()) {
            Err(err) if err.kind() == &ErrorKind::MalformedXml => {}
            other => {
                return Err(std::io::Error::other(format!(
                    "Expected MalformedXml for {path:?}, got {other:?}"
                ))
                .into());
            }
        }
    }
    Ok(())
}

#[test]
fn test_catalog_comments_in_document_order() -> Result<(), Box<dyn std::error::Error>> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/valid/comments_and_pi.xml");
    let content = fs::read_to_string(path)?;
    let document = xmlbridge::xml::parse(&content)?;
    let comments: Vec<_> = document.comments().into_iter().map(|c| c.path).collect();
    if comments != ["/comment()[1]", "/catalog/comment()", "/comment()[2]"] {
        return Err(std::io::Error::other(format!("unexpected comment paths: {comments:?}")).into());
    }
    Ok(())
}
