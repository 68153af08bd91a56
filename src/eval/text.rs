use strsim::levenshtein;

/// Removes line breaks so multi-line annotations compare equal to the
/// single-line text the recognizer emits.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

/// Levenshtein distance divided by the longer string's length, in `[0, 1]`.
/// Lengths count Unicode scalar values. Two empty strings are at distance 0.
pub fn text_distance(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    levenshtein(&a, &b) as f64 / longest as f64
}
