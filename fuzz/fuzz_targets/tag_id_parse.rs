//! Fuzz target for tag identifier parsing (`(gggg,eeee)`, `ggggeeee` or a
//! dictionary keyword).

#![no_main]

use dicomcompare::model::TagId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(tag) = text.parse::<TagId>() {
        let round = tag.to_string().parse::<TagId>();
        assert_eq!(round.ok(), Some(tag));
    }
});
