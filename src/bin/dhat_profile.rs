//! DHAT heap profiler for internkit.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>
//!
//! Builds the same set of contexts twice: once with every context owning a
//! private copy of its shared state, once through a `ContextFactory`, and
//! prints the heap in use after each.

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use internkit::factory::ContextFactory;

const CONTEXTS: usize = 100_000;
const DISTINCT: u64 = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GlyphStyle {
    font_family: String,
    size_pt: u16,
    color: [u8; 4],
}

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

fn style(n: u64) -> GlyphStyle {
    GlyphStyle {
        font_family: format!("Family {:02} Regular Condensed", n % 16),
        size_pt: 8 + (n % 4) as u16 * 2,
        color: [(n * 37) as u8, (n * 11) as u8, (n * 5) as u8, 255],
    }
}

fn heap_bytes() -> usize {
    dhat::HeapStats::get().curr_bytes
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    let baseline = heap_bytes();
    let mut rng = XorShift64::new(7);
    let owned: Vec<(char, GlyphStyle)> = (0..CONTEXTS)
        .map(|i| {
            let n = rng.next_u64() % DISTINCT;
            (char::from(b'a' + (i % 26) as u8), style(n))
        })
        .collect();
    let owned_bytes = heap_bytes() - baseline;
    drop(owned);

    let baseline = heap_bytes();
    let mut rng = XorShift64::new(7);
    let mut factory = ContextFactory::new();
    for i in 0..CONTEXTS {
        let n = rng.next_u64() % DISTINCT;
        factory.make_context(char::from(b'a' + (i % 26) as u8), style(n));
    }
    let interned_bytes = heap_bytes() - baseline;

    println!("contexts:             {}", factory.created_count());
    println!("distinct styles:      {}", factory.table().size());
    println!("private copies heap:  {} bytes", owned_bytes);
    println!("interned heap:        {} bytes", interned_bytes);
}
