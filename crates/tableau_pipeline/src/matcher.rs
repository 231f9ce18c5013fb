//! Edit distance.

/// Levenshtein distance between `a` and `b`, counted in characters.
///
/// Classic dynamic programming over the `(|b|+1) x (|a|+1)` table, keeping
/// only one row of the shorter string at a time.
///
/// # Examples
///
/// ```
/// use tableau_pipeline::distance;
///
/// assert_eq!(distance("kitten", "sitting"), 3);
/// assert_eq!(distance("", "abc"), 3);
/// ```
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if short.is_empty() {
        return long.len();
    }

    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (i, long_char) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, short_char) in short.iter().enumerate() {
            let substitution = diagonal + usize::from(long_char != short_char);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[short.len()]
}
