//! Normalized string similarity used to rank suggestions.
//!
//! The ratio is `2 * M / T`, where `T` is the combined length of both strings
//! and `M` the number of characters in matching blocks. Blocks are found
//! Ratcliff/Obershelp style: take the longest common substring, then recurse
//! into the unmatched text on either side of it.

/// Similarity of `a` and `b` in `0.0..=1.0`; identical strings score 1.0.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Total length of the matching blocks of `a` and `b`.
pub fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, (a_lo, a_hi), (b_lo, b_hi));
        if size == 0 {
            continue;
        }
        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }
    matched
}

/// Longest common substring of `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// Returns `(start_in_a, start_in_b, len)`; the earliest block wins ties.
fn longest_match(
    a: &[char],
    b: &[char],
    (a_lo, a_hi): (usize, usize),
    (b_lo, b_hi): (usize, usize),
) -> (usize, usize, usize) {
    let width = b_hi - b_lo;
    let mut best = (a_lo, b_lo, 0);
    // run[j + 1] holds the length of the common suffix ending at a[i], b[b_lo + j].
    let mut previous = vec![0usize; width + 1];
    let mut current = vec![0usize; width + 1];
    for i in a_lo..a_hi {
        for j in 0..width {
            current[j + 1] = if a[i] == b[b_lo + j] {
                previous[j] + 1
            } else {
                0
            };
            let len = current[j + 1];
            if len > best.2 {
                best = (i + 1 - len, b_lo + j + 1 - len, len);
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_and_disjoint() {
        assert_eq!(ratio("Proxy::Proxies", "Proxy::Proxies"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("abc", ""), 0.0);
    }

    #[test]
    fn shifted_block() {
        assert_eq!(ratio("abcd", "bcde"), 0.75);
    }

    #[test]
    fn blocks_on_both_sides_are_counted() {
        let a: Vec<char> = "xaby".chars().collect();
        let b: Vec<char> = "zabw".chars().collect();
        assert_eq!(matching_characters(&a, &b), 2);
        let a: Vec<char> = "ab--cd".chars().collect();
        let b: Vec<char> = "ab++cd".chars().collect();
        assert_eq!(matching_characters(&a, &b), 4);
    }

    #[test]
    fn one_typo_scores_high() {
        let score = ratio("PalletA::ItemB::ah_pre::emty", "PalletA::ItemB::ah_pre::empty");
        assert!(score > 0.95, "score {score}");
    }

    proptest! {
        #[test]
        fn ratio_is_bounded_and_symmetric_on_self(a in "[a-z:]{0,24}", b in "[a-z:]{0,24}") {
            let score = ratio(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score));
            prop_assert_eq!(ratio(&a, &a), 1.0);
        }
    }
}
