#![no_main]

use libfuzzer_sys::fuzz_target;
use panegroup_layout::{build_template, snapshot};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(ctx) = snapshot::decode(json) else {
        return;
    };

    // Anything that decodes must encode again and survive a second decode.
    let encoded = snapshot::encode(&ctx).expect("encode decoded snapshot");
    let again = snapshot::decode(&encoded).expect("decode re-encoded snapshot");
    assert_eq!(again.items.len(), ctx.items.len());
    let _ = build_template(&again);
});
