//! Normalized edit-distance similarity between field names.

/// Name pairs treated as identical regardless of edit distance.
const ALIASES: [(&str, &str); 1] = [("id", "_id")];

/// Levenshtein distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j] + cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        (previous, current) = (current, previous);
    }

    previous[b.len()]
}

/// Similarity in `[0, 1]`: `(max_len - distance) / max_len`.
///
/// Two empty strings score 1.0, as does an aliased pair such as `id` and
/// `_id` in either order.
pub fn similarity(a: &str, b: &str) -> f64 {
    if ALIASES
        .iter()
        .any(|(x, y)| (a == *x && b == *y) || (a == *y && b == *x))
    {
        return 1.0;
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein(a, b);
    (max_len - distance) as f64 / max_len as f64
}
