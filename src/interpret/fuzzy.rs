//! Partial-ratio string similarity on a 0-100 scale.
//!
//! The shorter string is aligned against every window of the longer one
//! (including windows clipped at either end) and the best normalized
//! InDel similarity wins. Exact substring containment scores 100.

use rapidfuzz::distance::indel;

/// Best alignment score of the shorter string inside the longer one.
///
/// Strings of equal length are aligned both ways. Returns 0.0 if either
/// side is empty.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_len = a.chars().count();
    let b_len = b.chars().count();

    match a_len.cmp(&b_len) {
        std::cmp::Ordering::Less => align(a, b),
        std::cmp::Ordering::Greater => align(b, a),
        std::cmp::Ordering::Equal => align(a, b).max(align(b, a)),
    }
}

/// Score `short` against each window of `long`; `short` is not longer than `long`.
fn align(short: &str, long: &str) -> f64 {
    if long.contains(short) {
        return 100.0;
    }

    let needle: Vec<char> = short.chars().collect();
    let hay: Vec<char> = long.chars().collect();
    let m = needle.len();
    let n = hay.len();

    let windows = (1..m)
        .map(|end| &hay[..end])
        .chain((0..=(n - m)).map(|start| &hay[start..start + m]))
        .chain(((n - m + 1)..n).map(|start| &hay[start..]));

    let mut best = 0.0f64;
    for window in windows {
        let score =
            100.0 * indel::normalized_similarity(needle.iter().copied(), window.iter().copied());
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    #[test]
    fn test_exact_substring_scores_100() {
        assert_eq!(partial_ratio("dresses", "show me red dresses from adidas"), 100.0);
        assert_eq!(partial_ratio("show me red dresses", "dresses"), 100.0);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(partial_ratio("", "jeans"), 0.0);
        assert_eq!(partial_ratio("jeans", ""), 0.0);
    }

    #[test]
    fn test_near_match_scores_high() {
        // One missing letter
        let score = partial_ratio("adidas", "shoes from addas please");
        assert!(score > 80.0, "score was {score}");
    }

    #[test]
    fn test_unrelated_scores_low() {
        let score = partial_ratio("puma", "black t-shirt");
        assert!(score < 60.0, "score was {score}");
    }

    #[test]
    fn test_window_score_is_indel_similarity() {
        // LCS "snkers" over 8 + 8 chars
        let score = partial_ratio("sneakers", "snickers");
        assert!(approx(score, 200.0 * 6.0 / 16.0), "score was {score}");
    }

    #[test]
    fn test_long_needle() {
        let long = "a".repeat(70);
        let mut other = "a".repeat(69);
        other.push('b');
        let score = partial_ratio(&long, &format!("x{other}"));
        assert!(approx(score, 200.0 * 69.0 / 140.0), "score was {score}");
    }

    #[test]
    fn test_clipped_window_at_start() {
        // "ket" only lines up with the start of the haystack
        let score = partial_ratio("jacket", "ketchup bottle");
        assert!(approx(score, 200.0 * 3.0 / 9.0), "score was {score}");
    }

    #[test]
    fn test_symmetric() {
        let a = "casual shirt";
        let b = "i want a casul shirt for office";
        assert_eq!(partial_ratio(a, b), partial_ratio(b, a));
    }

    #[test]
    fn test_equal_length_aligns_both_ways() {
        let pairs = [("abcd", "bcda"), ("kurta", "urtak"), ("denim", "mined")];
        for (a, b) in pairs {
            assert_eq!(partial_ratio(a, b), partial_ratio(b, a), "{a} vs {b}");
            assert_eq!(partial_ratio(a, b), align(a, b).max(align(b, a)));
        }
        // "bcd" is shared; a clipped 3-char window finds it in either direction
        assert!(approx(partial_ratio("abcd", "bcda"), 200.0 * 3.0 / 7.0));
    }
}
