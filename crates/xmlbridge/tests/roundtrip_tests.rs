#![allow(clippy::panic_in_result_fn)]

//! decode -> encode -> decode stability with metadata kept

use xmlbridge::json::from_json_str;
use xmlbridge::{DecodeConfig, EncodeConfig, Result, Value, WordRules, decode, encode};

/// Decodes `xml`, encodes the result again and decodes that, returning both
/// decoded values
fn cycle(xml: &str, decode_config: &DecodeConfig, encode_config: &EncodeConfig) -> Result<(Value, Value)> {
    let first = decode(xml, decode_config)?;
    let Value::Map(wrapped) = &first else {
        return Err(xmlbridge::Error::invalid_input("root must stay wrapped"));
    };
    let Some((root, inner)) = wrapped.iter().next() else {
        return Err(xmlbridge::Error::invalid_input("empty document"));
    };
    let xml_again = encode(root, inner, encode_config)?;
    let second = decode(&xml_again, decode_config)?;
    Ok((first, second))
}

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- generated -->
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/" lang="en">
  <title type="text">Example</title>
  <entries>
    <entry id="1">
      <!-- first entry -->
      <name>One</name>
      <body><![CDATA[<p>raw & unescaped</p>]]></body>
    </entry>
    <entry id="2">
      <name>Two</name>
      <tags>
        <tag>a</tag>
        <tag>b</tag>
      </tags>
    </entry>
  </entries>
  <empty/>
</feed>"#;

#[test]
fn test_feed_is_stable_with_everything_kept() -> Result<()> {
    let words = WordRules::singularize();
    let decode_config = DecodeConfig::keep_all().with_words(words.clone());
    let encode_config = EncodeConfig::default().with_words(words);

    let (first, second) = cycle(FEED, &decode_config, &encode_config)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_feed_decoded_shape() -> Result<()> {
    let config = DecodeConfig::keep_all().with_words(WordRules::singularize());
    let value = decode(FEED, &config)?;
    let expected = from_json_str(
        r#"{"feed": {
            "@comment": " generated ",
            "@attributes": {
                "lang": "en",
                "@namespaces": [
                    {"name": "xmlns", "uri": "http://www.w3.org/2005/Atom"},
                    {"name": "xmlns:media", "uri": "http://search.yahoo.com/mrss/"}
                ]
            },
            "title": {"@attributes": {"type": "text"}, "@text": "Example"},
            "entries": [
                {
                    "@comment": " first entry ",
                    "@attributes": {"id": "1"},
                    "name": "One",
                    "body": "<p>raw & unescaped</p>"
                },
                {
                    "@attributes": {"id": "2"},
                    "name": "Two",
                    "tags": ["a", "b"]
                }
            ],
            "empty": ""
        }}"#,
    )?;
    assert_eq!(value, expected);
    Ok(())
}

#[test]
fn test_defaults_are_stable() -> Result<()> {
    let decode_config = DecodeConfig::default().with_strip_root(false);
    let (first, second) = cycle(FEED, &decode_config, &EncodeConfig::default())?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_attribute_escaping_round_trip() -> Result<()> {
    let xml = r#"<r><a q="&quot;x&quot; &amp; &lt;y&gt;">t &amp; u</a></r>"#;
    let config = DecodeConfig::keep_all();
    let (first, second) = cycle(xml, &config, &EncodeConfig::default())?;
    assert_eq!(first, second);
    assert_eq!(
        first,
        from_json_str(r#"{"r": {"a": {"@attributes": {"q": "\"x\" & <y>"}, "@text": "t & u"}}}"#)?
    );
    Ok(())
}

#[test]
fn test_repeated_comments_round_trip() -> Result<()> {
    let xml = "<r><!--a--><!--b--><x>1</x></r>";
    let config = DecodeConfig::keep_all();
    let (first, second) = cycle(xml, &config, &EncodeConfig::default())?;
    assert_eq!(first, second);
    assert_eq!(first, from_json_str(r#"{"r": {"@comment": ["a", "b"], "x": "1"}}"#)?);
    Ok(())
}
