use crate::core::io::alignability::ChromosomeAlignability;
use crate::core::models::fragment::{Composition, Interval};

/// Counts GC and repeat bases in `sequence` and returns both as fractions of its length.
///
/// Soft-masked (lowercase) `a`, `c`, `g` and `t` count as repeat. Both `c`/`g` and `C`/`G`
/// count as GC; uppercase `A`/`T` contribute to neither. Every other character, `N`
/// included, only adds to the length.
pub fn gc_and_repeat(sequence: &[u8]) -> (f64, f64) {
    if sequence.is_empty() {
        return (0.0, 0.0);
    }
    let mut gc = 0usize;
    let mut repeat = 0usize;
    for &base in sequence {
        match base {
            b'a' | b't' => repeat += 1,
            b'c' | b'g' => {
                repeat += 1;
                gc += 1;
            }
            b'C' | b'G' => gc += 1,
            _ => {}
        }
    }
    let len = sequence.len() as f64;
    (gc as f64 / len, repeat as f64 / len)
}

/// Composition of the 1-based `interval` of a chromosome sequence.
pub fn composition_of(
    sequence: &[u8],
    interval: Interval,
    alignability: Option<&ChromosomeAlignability>,
) -> Composition {
    let (gc, repeat) = sequence
        .get(interval.as_range())
        .map(gc_and_repeat)
        .unwrap_or((0.0, 0.0));
    Composition {
        gc,
        repeat,
        alignability: alignability.and_then(|map| map.mean_over(interval)),
    }
}
