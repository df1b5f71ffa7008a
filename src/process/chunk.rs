/// Number of chunks the final sequence is split into, one per grid cell.
pub const GRID_CHUNKS: usize = 4;

/// Split `items` into `parts` contiguous slices whose lengths differ by at
/// most one. Longer slices come last, so the final slice absorbs any
/// remainder. When `items.len() < parts` the leading slices are the empty
/// ones: with three items the first slice (the mixed layout's pie) is empty.
pub fn partition<T>(items: &[T], parts: usize) -> Vec<&[T]> {
    if parts == 0 {
        return Vec::new();
    }
    let base = items.len() / parts;
    let extra = items.len() % parts;

    let mut out = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let len = if i >= parts - extra { base + 1 } else { base };
        out.push(&items[start..start + len]);
        start += len;
    }
    out
}

/// First `n` items, or all of them if there are fewer.
pub fn top_n<T>(items: &[T], n: usize) -> &[T] {
    &items[..n.min(items.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lens(n: usize) -> Vec<usize> {
        let items: Vec<usize> = (0..n).collect();
        partition(&items, GRID_CHUNKS).iter().map(|c| c.len()).collect()
    }

    #[test]
    fn sizes_differ_by_at_most_one() {
        assert_eq!(lens(8), vec![2, 2, 2, 2]);
        assert_eq!(lens(9), vec![2, 2, 2, 3]);
        assert_eq!(lens(10), vec![2, 2, 3, 3]);
        assert_eq!(lens(11), vec![2, 3, 3, 3]);
        assert_eq!(lens(3), vec![0, 1, 1, 1]);
        assert_eq!(lens(2), vec![0, 0, 1, 1]);
        assert_eq!(lens(0), vec![0, 0, 0, 0]);
    }

    #[test]
    fn concatenation_reproduces_input() {
        for n in 0..40 {
            let items: Vec<usize> = (0..n).collect();
            let chunks = partition(&items, GRID_CHUNKS);
            assert_eq!(chunks.len(), GRID_CHUNKS);
            assert_eq!(chunks.concat(), items);
        }
    }

    #[test]
    fn zero_parts() {
        assert!(partition(&[1, 2, 3], 0).is_empty());
    }

    #[test]
    fn top_n_clamps() {
        let items = [5, 4, 3];
        assert_eq!(top_n(&items, 7), &[5, 4, 3]);
        assert_eq!(top_n(&items, 2), &[5, 4]);
        assert!(top_n(&items, 0).is_empty());
    }
}
