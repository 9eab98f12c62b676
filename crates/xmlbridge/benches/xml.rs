use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use xmlbridge::json::from_json_str;
use xmlbridge::{DecodeConfig, Decoder, EncodeConfig, Encoder, Value, WordRules, xml};

const SIMPLE_XML: &str = "<root><child>text</child></root>";
const ATTR_XML: &str = "<root id=\"1\" name='test'><!-- note --><item value=\"42\" /></root>";

fn catalog_value(items: usize) -> Value {
    let cars: Vec<String> = (0..items)
        .map(|i| format!(r#"{{"id": "{i}", "model": "Golf", "engine": "1.{i}"}}"#))
        .collect();
    let json = format!(r#"{{"shop": "supercars.com", "cars": [{}]}}"#, cars.join(","));
    from_json_str(&json).unwrap_or_default()
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("xml_parse_simple", |b| {
        b.iter(|| xml::parse(black_box(SIMPLE_XML)))
    });
    c.bench_function("xml_parse_attr", |b| {
        b.iter(|| xml::parse(black_box(ATTR_XML)))
    });
}

fn bench_encode(c: &mut Criterion) {
    let value = catalog_value(200);
    let encoder = Encoder::new(EncodeConfig::default().with_words(WordRules::singularize()));
    c.bench_function("xml_encode_catalog", |b| {
        b.iter(|| encoder.encode("root", black_box(&value)))
    });
}

fn bench_decode(c: &mut Criterion) {
    let value = catalog_value(200);
    let words = WordRules::singularize();
    let xml = Encoder::new(EncodeConfig::default().with_words(words.clone()))
        .encode("root", &value)
        .unwrap_or_default();

    let plain = Decoder::new(DecodeConfig::default().with_words(words.clone()));
    c.bench_function("xml_decode_catalog", |b| {
        b.iter(|| plain.decode(black_box(&xml)))
    });

    let full = Decoder::new(DecodeConfig::keep_all().with_words(words));
    c.bench_function("xml_decode_catalog_keep_all", |b| {
        b.iter(|| full.decode(black_box(&xml)))
    });
}

criterion_group!(benches, bench_parse, bench_encode, bench_decode);
criterion_main!(benches);
