#![allow(clippy::panic_in_result_fn, clippy::indexing_slicing)]

//! End-to-end encode/decode scenarios

use xmlbridge::json::from_json_str;
use xmlbridge::{
    DecodeConfig, Decoder, EncodeConfig, Encoder, ErrorKind, Result, Value, WordRules, decode,
    encode,
};

fn kind(result: Result<impl std::fmt::Debug>) -> Option<ErrorKind> {
    result.err().map(|e| e.kind().clone())
}

fn nested(depth: usize) -> String {
    "<a>".repeat(depth) + &"</a>".repeat(depth)
}

#[test]
fn test_shop_round_trip_with_defaults() -> Result<()> {
    let value = from_json_str(
        r#"{
            "shop": "supercars.com",
            "cars": [
                {"manufacturer": "VW", "model": "Golf", "engine": "1.9"},
                {"manufacturer": "Škoda", "model": "Rapid", "engine": "1.6"}
            ]
        }"#,
    )?;

    let xml = encode("root", &value, &EncodeConfig::default())?;
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<manufacturer>Škoda</manufacturer>"));

    let decoded = decode(&xml, &DecodeConfig::default())?;
    assert_eq!(decoded, value);
    Ok(())
}

#[test]
fn test_shop_round_trip_with_singularization() -> Result<()> {
    let value = from_json_str(
        r#"{"shop": "supercars.com", "cars": [{"model": "Golf"}, {"model": "Rapid"}]}"#,
    )?;
    let words = WordRules::singularize();

    let xml = encode(
        "root",
        &value,
        &EncodeConfig::default().with_words(words.clone()).with_indent(""),
    )?;
    assert!(xml.ends_with(
        "<root><shop>supercars.com</shop><cars><car><model>Golf</model></car>\
         <car><model>Rapid</model></car></cars></root>"
    ));

    let decoded = decode(&xml, &DecodeConfig::default().with_words(words))?;
    assert_eq!(decoded, value);
    Ok(())
}

#[test]
fn test_plain_list_root_is_rejected() -> Result<()> {
    let value = from_json_str(r#"["a", "b"]"#)?;
    assert_eq!(
        kind(encode("root", &value, &EncodeConfig::default())),
        Some(ErrorKind::InvalidElementName {
            name: "0".to_string()
        })
    );
    Ok(())
}

#[test]
fn test_nested_plain_list_is_rejected() -> Result<()> {
    let value = from_json_str(r#"{"matrix": [[1, 2]]}"#)?;
    assert!(matches!(
        kind(encode("root", &value, &EncodeConfig::default())),
        Some(ErrorKind::InvalidElementName { .. })
    ));
    Ok(())
}

#[test]
fn test_images_flatten_when_singularizing() -> Result<()> {
    let xml = "<root><images><image><name>foo</name><extension>jpg</extension></image></images></root>";
    let config = DecodeConfig::default().with_words(WordRules::singularize());

    let value = decode(xml, &config)?;
    assert_eq!(
        value,
        from_json_str(r#"{"images": [{"name": "foo", "extension": "jpg"}]}"#)?
    );
    Ok(())
}

#[test]
fn test_excluded_images_stay_nested() -> Result<()> {
    let xml = "<root><images><image><name>foo</name><extension>jpg</extension></image></images></root>";
    let config = DecodeConfig::default().with_words(WordRules::singularize().exclude("images"));

    let value = decode(xml, &config)?;
    assert_eq!(
        value,
        from_json_str(r#"{"images": {"image": {"name": "foo", "extension": "jpg"}}}"#)?
    );
    Ok(())
}

#[test]
fn test_included_word_drives_flattening() -> Result<()> {
    let xml = "<root><people><person>Ann</person><person>Bob</person></people></root>";
    let config =
        DecodeConfig::default().with_words(WordRules::singularize().include("people", "person"));
    assert_eq!(
        decode(xml, &config)?,
        from_json_str(r#"{"people": ["Ann", "Bob"]}"#)?
    );
    Ok(())
}

#[test]
fn test_depth_guard_at_default_limit() -> Result<()> {
    let decoder = Decoder::default();
    assert_eq!(decoder.config().max_recursion_depth, 500);

    decoder.decode(&nested(500))?;
    assert_eq!(
        kind(decoder.decode(&nested(501))),
        Some(ErrorKind::RecursionError { max: 500 })
    );
    Ok(())
}

#[test]
fn test_default_limit_on_small_stack() -> Result<()> {
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| -> Result<Option<ErrorKind>> {
            let config = DecodeConfig::keep_all();
            decode(&nested(500), &config).map(|_| ())?;
            Ok(kind(decode(&nested(501), &config)))
        })?;
    let outcome = handle
        .join()
        .map_err(|_| xmlbridge::Error::invalid_input("decoder thread panicked"))??;
    assert_eq!(outcome, Some(ErrorKind::RecursionError { max: 500 }));
    Ok(())
}

#[test]
fn test_integers_beyond_u64_keep_their_digits() -> Result<()> {
    let value = from_json_str(r#"{"n": 123456789012345678901234567890, "m": -99999999999999999999}"#)?;
    let xml = encode("r", &value, &EncodeConfig::default())?;
    assert!(xml.contains("<n>123456789012345678901234567890</n>"));
    assert!(xml.contains("<m>-99999999999999999999</m>"));
    assert_eq!(decode(&xml, &DecodeConfig::default())?, value);
    Ok(())
}

#[test]
fn test_attribute_whitespace_round_trip() -> Result<()> {
    let value = from_json_str(
        r#"{"a": {"@attributes": {"t": "line1\nline2\tx\r"}, "@text": "y"}}"#,
    )?;
    let xml = encode("r", &value, &EncodeConfig::default())?;
    let config = DecodeConfig::default().with_strip_attributes(false);
    assert_eq!(decode(&xml, &config)?, value);
    Ok(())
}

#[test]
fn test_null_round_trip_through_nil() -> Result<()> {
    let value = from_json_str(r#"{"name": "x", "missing": null}"#)?;
    let xml = Encoder::new(EncodeConfig::default().with_nil_on_null(true)).encode("r", &value)?;
    assert!(xml.contains(r#"<missing xsi:nil="true"/>"#));
    assert_eq!(decode(&xml, &DecodeConfig::default())?, value);
    Ok(())
}

#[test]
fn test_reserved_keys_absent_by_default() -> Result<()> {
    let xml = r#"<!-- c --><r xmlns:x="urn:x" id="1"><a x:t="y">1<!--d--></a></r>"#;
    let value = decode(xml, &DecodeConfig::default())?;
    assert_eq!(value, from_json_str(r#"{"a": "1"}"#)?);

    let Value::Map(map) = &value else {
        return Err(xmlbridge::Error::invalid_input("expected a map"));
    };
    assert!(map.keys().all(|k| !xmlbridge::value::is_reserved_key(k)));
    Ok(())
}
