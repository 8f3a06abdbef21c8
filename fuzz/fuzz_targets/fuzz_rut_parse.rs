#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(rut) = dte::core::Rut::parse(s) {
            // Anything accepted must survive its own formatting.
            assert_eq!(dte::core::Rut::parse(&rut.format(true)).ok(), Some(rut));
            assert_eq!(dte::core::Rut::parse(&rut.to_string()).ok(), Some(rut));
        }
    }
});
