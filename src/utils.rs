/// Enumerates all subsets of `items`.
///
/// Subset `i` contains `items[j]` iff bit `j` of `i` is set, so the first
/// subset is empty and the last one is `items` itself, in input order.
///
/// ```text
/// [a, b] -> [], [a], [b], [a, b]
/// ```
pub fn subsets<T: Copy>(items: &[T]) -> Vec<Vec<T>> {
    assert!(items.len() < usize::BITS as usize, "Too many items to enumerate subsets");
    (0..1usize << items.len())
        .map(|mask| {
            items
                .iter()
                .enumerate()
                .filter(|(j, _)| mask & (1 << j) != 0)
                .map(|(_, &x)| x)
                .collect()
        })
        .collect()
}

/// Returns the elements of `set` that do not occur in `subset`, in the order of `set`.
pub fn remainder<T: Copy + PartialEq>(subset: &[T], set: &[T]) -> Vec<T> {
    set.iter().copied().filter(|x| !subset.contains(x)).collect()
}
