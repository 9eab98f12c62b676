#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlbridge::{DecodeConfig, EncodeConfig, Value};

// Whatever the encoder accepts from decoded input must parse again.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let config = DecodeConfig::keep_all();
        if let Ok(Value::Map(map)) = xmlbridge::decode(s, &config) {
            if let Some((root, content)) = map.iter().next() {
                if let Ok(xml) = xmlbridge::encode(root, content, &EncodeConfig::default()) {
                    assert!(xmlbridge::is_valid(&xml), "encoder produced invalid XML: {xml}");
                }
            }
        }
    }
});
