#![no_main]

use libfuzzer_sys::fuzz_target;
use mantis2github::BbcodeConverter;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let converter = BbcodeConverter::new();
        let _ = converter.convert(text);
    }
});
