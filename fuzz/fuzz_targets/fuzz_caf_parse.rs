#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let allocator = dte::caf::FolioAllocator::new();
        if let Ok(document_type) = allocator.load_caf_xml(s) {
            let remaining = allocator.folios_remaining(document_type);
            assert!(remaining >= 1);
            if let Ok(folio) = allocator.next_folio(document_type) {
                assert!(allocator.is_claimed(document_type, folio));
                assert_eq!(allocator.folios_remaining(document_type), remaining - 1);
            }
        }
    }
});
