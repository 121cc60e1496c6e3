//! Similarity functions used by the duplicate guard
//!
//! Both return a score in range [0.0, 1.0] where 1.0 means identical.

use ahash::{AHashMap, AHashSet};

/// Second sequences at least this long get the popular-element heuristic.
const POPULAR_MIN_LEN: usize = 200;

/// Character-level similarity from longest matching blocks.
///
/// Repeatedly takes the longest common run of characters, then recurses on
/// the pieces left and right of it. With `M` matched characters and `T`
/// characters in total the score is `2 * M / T`; two empty strings score 1.0.
///
/// When `b` has 200 or more characters, characters making up more than 1% of
/// it are not used to anchor a match, though a match may still grow across
/// them.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = BlockMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

/// Jaccard index of two token sets.
///
/// Two empty sets are identical (1.0); one empty set shares nothing (0.0).
pub fn token_jaccard<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    let set_a: AHashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let set_b: AHashSet<&str> = b.iter().map(AsRef::as_ref).collect();

    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.len() + set_b.len() - intersection;
    intersection as f64 / union as f64
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    // char -> ascending positions in `b`, popular chars removed
    b2j: AHashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: AHashMap<char, Vec<usize>> = AHashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        if b.len() >= POPULAR_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }
        Self { a, b, b2j }
    }

    /// Total length of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut matched = 0;
        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                pending.push((i + k, ahi, j + k, bhi));
            }
        }
        matched
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given window,
    /// earliest in `a` (then `b`) on ties.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i - 1], b[j]
        let mut j2len: AHashMap<usize, usize> = AHashMap::new();
        for i in alo..ahi {
            let mut next: AHashMap<usize, usize> = AHashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best_k {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_k = k;
                    }
                }
            }
            j2len = next;
        }

        // Grow across characters that were dropped as anchors.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_k += 1;
        }
        while best_i + best_k < ahi
            && best_j + best_k < bhi
            && self.a[best_i + best_k] == self.b[best_j + best_k]
        {
            best_k += 1;
        }

        (best_i, best_j, best_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_sequence_ratio_identical() {
        assert_eq!(sequence_ratio("the cat sat on the mat", "the cat sat on the mat"), 1.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
    }

    #[test]
    fn test_sequence_ratio_known_values() {
        assert!(approx(sequence_ratio("abcd", "bcde"), 0.75));
        assert!(approx(sequence_ratio("hello", "hallo"), 0.8));
        assert!(approx(sequence_ratio("abc", "xyz"), 0.0));
        assert!(approx(sequence_ratio("abc", ""), 0.0));
    }

    #[test]
    fn test_sequence_ratio_recurses_on_both_sides() {
        // blocks "a", "cd", "f" around the substitutions
        assert!(approx(sequence_ratio("abcdef", "axcdyf"), 8.0 / 12.0));
    }

    #[test]
    fn test_sequence_ratio_counts_unicode_scalars() {
        assert!(approx(sequence_ratio("café", "cafe"), 0.75));
    }

    #[test]
    fn test_popular_characters_only_extend_matches() {
        let a = "a".repeat(10);
        let b = "a".repeat(200);
        assert!(approx(sequence_ratio(&a, &b), 20.0 / 210.0));
    }

    #[test]
    fn test_popular_heuristic_needs_long_second_sequence() {
        let a = "a".repeat(10);
        let b = "a".repeat(199);
        assert!(approx(sequence_ratio(&a, &b), 20.0 / 209.0));
    }

    #[test]
    fn test_jaccard_identical_and_disjoint() {
        assert_eq!(token_jaccard(&["a", "b"], &["b", "a", "a"]), 1.0);
        assert_eq!(token_jaccard(&["a", "b"], &["c", "d"]), 0.0);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        assert!(approx(token_jaccard(&["the", "cat", "sat"], &["the", "dog", "sat"]), 0.5));
    }

    #[test]
    fn test_jaccard_empty_sets() {
        let empty: [&str; 0] = [];
        assert_eq!(token_jaccard(&empty, &empty), 1.0);
        assert_eq!(token_jaccard(&empty, &["a"]), 0.0);
        assert_eq!(token_jaccard(&["a"], &empty), 0.0);
    }
}
