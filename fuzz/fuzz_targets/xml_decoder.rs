#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlbridge::{DecodeConfig, Decoder, WordRules};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = Decoder::new(DecodeConfig::default()).decode(s);
        let keep = DecodeConfig::keep_all().with_words(WordRules::singularize());
        let _ = Decoder::new(keep).decode(s);
    }
});
