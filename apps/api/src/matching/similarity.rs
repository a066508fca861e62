//! Case-insensitive Levenshtein distance and the length-normalized similarity
//! score built on it.

/// Levenshtein distance between `a` and `b` after lowercasing both.
///
/// Substitution, insertion and deletion all cost 1. Transpositions are two
/// edits (plain Levenshtein, not Damerau). Characters are Unicode scalar
/// values, so "café" has length 4.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    levenshtein(&a, &b)
}

/// Normalized similarity in `[0.0, 1.0]`.
///
/// `(len(longer) - edit_distance(longer, shorter)) / len(longer)`, where
/// `longer` is whichever argument has more characters. Two empty strings are
/// identical (1.0). The denominator never depends on argument order, so the
/// score is symmetric.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_len = a.to_lowercase().chars().count();
    let b_len = b.to_lowercase().chars().count();

    let (longer, shorter, len) = if b_len > a_len {
        (b, a, b_len)
    } else {
        (a, b, a_len)
    };

    if len == 0 {
        return 1.0;
    }

    (len - edit_distance(longer, shorter)) as f64 / len as f64
}

/// Single-row dynamic programming over already-lowercased characters.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    // row[j] holds the distance between the current prefix of `a` and b[..j]
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }

    row[b.len()]
}
