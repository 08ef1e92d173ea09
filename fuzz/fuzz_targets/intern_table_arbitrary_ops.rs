#![no_main]

use internkit::ds::{InternTable, ScanInternTable, SharedHandle};
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on InternTable
//
// Drives the hash-keyed table and the scan table with the same byte stream
// and checks that they agree, that equal values always come back as the same
// allocation, and that size never shrinks.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut table: InternTable<u8> = InternTable::new();
    let mut scan: ScanInternTable<u8> = ScanInternTable::new();
    let mut canonical: Vec<Option<SharedHandle<u8>>> = vec![None; 256];

    let mut idx = 0;
    while idx + 1 < data.len() {
        let op = data[idx] % 4;
        let value = data[idx + 1];
        let before = table.size();

        match op {
            0 => {
                // Intern
                let handle = table.intern(value);
                let scanned = scan.intern(value);
                assert_eq!(handle.id(), scanned.id());

                match &canonical[value as usize] {
                    Some(first) => {
                        assert!(SharedHandle::ptr_eq(first, &handle));
                        assert_eq!(table.size(), before);
                    },
                    None => {
                        assert_eq!(table.size(), before + 1);
                        canonical[value as usize] = Some(handle);
                    },
                }
            },
            1 => {
                // Lookup (read-only)
                let found = table.get(&value);
                assert_eq!(found.is_some(), canonical[value as usize].is_some());
                assert_eq!(found.is_some(), scan.contains(&value));
                assert_eq!(table.size(), before);
            },
            2 => {
                // Resolve by id
                let slot = value as usize % (before + 1);
                if let Some(handle) = table.iter().nth(slot) {
                    let resolved = table.resolve(handle.id()).unwrap();
                    assert!(SharedHandle::ptr_eq(handle, &resolved));
                    assert_eq!(handle.id().index(), slot);
                }
            },
            3 => {
                // Full audit
                assert!(table.check_invariants().is_ok());
                assert!(scan.check_invariants().is_ok());
                assert_eq!(table.values(), scan.values());
            },
            _ => unreachable!(),
        }

        assert!(table.size() >= before);
        assert_eq!(table.size(), scan.size());
        idx += 2;
    }
});

