#![no_main]

use libfuzzer_sys::fuzz_target;
use panegroup_core::{SizeExpr, Unit};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(unit) = Unit::parse(input) {
        assert!(!unit.value().is_sign_negative(), "negative unit from {input:?}");
        // Display output must parse back to a unit of the same kind.
        let reparsed = Unit::parse(&unit.to_string()).expect("display reparses");
        assert_eq!(reparsed.is_pixel(), unit.is_pixel());
    }

    if let Ok(expr) = SizeExpr::parse(input) {
        let reparsed = SizeExpr::parse(&expr.to_string()).expect("display reparses");
        assert_eq!(reparsed.is_fill(), expr.is_fill());
    }
});
