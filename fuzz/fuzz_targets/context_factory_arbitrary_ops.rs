#![no_main]

use internkit::ds::ContextId;
use internkit::factory::ContextFactory;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on ContextFactory
//
// Creates, mutates and removes contexts and checks that created_count only
// grows, that removal never shrinks the intern table, and that mutating one
// context's unique state never leaks into another.
fuzz_target!(|data: &[u8]| {
    let mut factory: ContextFactory<u32, u8> = ContextFactory::new();
    let mut ids: Vec<ContextId> = Vec::new();
    let mut expected: Vec<Option<u32>> = Vec::new();

    for chunk in data.chunks_exact(2) {
        let (op, arg) = (chunk[0] % 3, chunk[1]);
        let created = factory.created_count();
        let distinct = factory.table().size();

        match op {
            0 => {
                // Create; shared state drawn from a small alphabet
                let id = factory.make_context(u32::from(arg), arg % 8);
                assert_eq!(id.index(), created);
                ids.push(id);
                expected.push(Some(u32::from(arg)));
                assert_eq!(factory.created_count(), created + 1);
            },
            1 => {
                // Mutate unique state of one context
                if ids.is_empty() {
                    continue;
                }
                let pos = arg as usize % ids.len();
                if let Some(ctx) = factory.get_mut(ids[pos]) {
                    *ctx.unique_mut() += 1;
                    if let Some(v) = expected[pos].as_mut() {
                        *v += 1;
                    }
                }
            },
            2 => {
                // Remove
                if ids.is_empty() {
                    continue;
                }
                let pos = arg as usize % ids.len();
                let removed = factory.remove(ids[pos]);
                assert_eq!(removed.is_some(), expected[pos].is_some());
                expected[pos] = None;
                assert_eq!(factory.table().size(), distinct);
            },
            _ => unreachable!(),
        }

        assert!(factory.table().size() >= distinct);
        assert!(factory.table().size() <= 8);
    }

    for (pos, id) in ids.iter().enumerate() {
        assert_eq!(factory.get(*id).map(|ctx| *ctx.unique()), expected[pos]);
    }
    assert_eq!(factory.len(), expected.iter().filter(|v| v.is_some()).count());
});
