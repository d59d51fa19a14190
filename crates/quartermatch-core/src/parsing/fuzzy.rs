/// Default minimum similarity for a label to be accepted.
pub const DEFAULT_MATCH_THRESHOLD: u8 = 80;

/// Threshold-gated fuzzy comparison of table labels against metric names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMatcher {
    threshold: u8,
}

impl LabelMatcher {
    pub fn new(threshold: u8) -> Self {
        LabelMatcher { threshold }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn matches(&self, candidate: &str, target: &str) -> bool {
        self.score(candidate, target).is_some()
    }

    /// Similarity of an accepted candidate, `None` below the threshold.
    pub fn score(&self, candidate: &str, target: &str) -> Option<u8> {
        let score = similarity(candidate, target);
        (score >= self.threshold).then_some(score)
    }
}

impl Default for LabelMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

/// Similarity score in `[0, 100]` between two labels.
///
/// Punctuation runs in both labels are collapsed to single spaces, then the
/// labels are scored as `100 * (len_a + len_b - indel) / (len_a + len_b)`
/// where `indel` is the insert/delete edit distance. Returns 0 when either
/// label has no alphanumeric content.
pub fn similarity(candidate: &str, target: &str) -> u8 {
    let a: Vec<char> = normalize_label(candidate).chars().collect();
    let b: Vec<char> = normalize_label(target).chars().collect();

    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let total = a.len() + b.len();
    let common = 2 * longest_common_subsequence(&a, &b);
    ((100 * common) as f64 / total as f64).round() as u8
}

/// Collapse every non-alphanumeric run in a label to one space.
///
/// Case is kept: a case-folded "Book value per share" scores 82 against
/// "Tangible book value per share" and would be accepted for it.
pub fn normalize_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

// indel distance = len_a + len_b - 2 * lcs
fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(
            normalize_label("Common Equity Tier 1 (CET1) Capital ratio"),
            "Common Equity Tier 1 CET1 Capital ratio"
        );
        assert_eq!(normalize_label("  Citigroup's net income "), "Citigroup s net income");
        assert_eq!(normalize_label("---"), "");
    }

    #[test]
    fn test_identical_labels_score_100() {
        assert_eq!(similarity("Book value per share", "Book value per share"), 100);
    }

    #[test]
    fn test_case_difference_tolerated() {
        let matcher = LabelMatcher::default();
        assert!(matcher.matches("Book value per share", "book value per share"));
        assert_eq!(similarity("Book value per share", "book value per share"), 95);
    }

    #[test]
    fn test_tangible_book_value_kept_apart() {
        assert!(similarity("Book value per share", "Tangible book value per share") < 80);
    }

    #[test]
    fn test_unrelated_labels_rejected() {
        let matcher = LabelMatcher::default();
        assert!(!matcher.matches("Total revenues, net of interest expense", "net income"));
        assert!(!matcher.matches("Citigroup's net income", "Book value per share"));
    }

    #[test]
    fn test_abbreviated_label_accepted() {
        let matcher = LabelMatcher::default();
        assert!(matcher.matches(
            "Common Equity Tier 1 (CET1) Capital ratio",
            "Common Equity Tier 1 Capital ratio"
        ));
    }

    #[test]
    fn test_footnote_marker_tolerated() {
        let matcher = LabelMatcher::default();
        assert!(matcher.matches("Tangible book value per share(2)", "Tangible book value per share"));
    }

    #[test]
    fn test_known_ratio() {
        // lcs("kitten", "sitting") = 4 -> 100 * 8 / 13
        assert_eq!(similarity("kitten", "sitting"), 62);
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(similarity("", "net income"), 0);
        assert_eq!(similarity("%", "%"), 0);
    }

    #[test]
    fn test_threshold_parameter() {
        let strict = LabelMatcher::new(100);
        assert!(!strict.matches("Book value per share.", "Book value per shares"));
        assert_eq!(strict.score("Book value per share", "Book value per share"), Some(100));
        assert_eq!(strict.score("Book value per share", "book value per share"), None);
        let loose = LabelMatcher::new(50);
        assert!(loose.matches("kitten", "sitting"));
    }
}
