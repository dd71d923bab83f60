//! Normalised text overlap used to compare free-text criteria with profile
//! labels.

/// Lowercase, replace every non-alphanumeric character with a space and
/// collapse whitespace
pub fn normalize(text: &str) -> String {
    let spaced: String = text
        .chars()
        .flat_map(|c| {
            let replacement = if c.is_alphanumeric() { c } else { ' ' };
            replacement.to_lowercase()
        })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-word containment on already normalised text
fn contains_phrase(haystack: &str, needle: &str) -> bool {
    format!(" {haystack} ").contains(&format!(" {needle} "))
}

/// Containment with punctuation dropped inside the needle: `pdl1` matches the
/// adjacent words `pd l1`, but never part of a single longer word
fn contains_collapsed(haystack: &str, needle: &str) -> bool {
    let target: String = needle.split(' ').collect();
    let words: Vec<&str> = haystack.split(' ').collect();

    (0..words.len()).any(|start| {
        let mut joined = String::new();
        for word in &words[start..] {
            joined.push_str(word);
            if joined == target {
                return true;
            }
            if !target.starts_with(joined.as_str()) {
                return false;
            }
        }
        false
    })
}

/// True when either text contains the other after normalisation, with or
/// without the punctuation between word pieces
///
/// Empty text never overlaps.
pub fn overlaps(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    contains_phrase(&a, &b)
        || contains_phrase(&b, &a)
        || contains_collapsed(&a, &b)
        || contains_collapsed(&b, &a)
}

/// First label (in iteration order) overlapping `text`
pub fn first_overlap<'a, I>(labels: I, text: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    labels
        .into_iter()
        .map(String::as_str)
        .find(|label| overlaps(label, text))
}

/// True when the normalised text contains `phrase` as whole words
pub fn mentions(text: &str, phrase: &str) -> bool {
    let text = normalize(text);
    let phrase = normalize(phrase);
    !phrase.is_empty() && contains_phrase(&text, &phrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  HER2-Positive (IHC 3+) "), "her2 positive ihc 3");
        assert_eq!(normalize("Non-small cell lung cancer"), "non small cell lung cancer");
        assert_eq!(normalize("!!"), "");
    }

    #[test]
    fn test_overlap_either_direction() {
        assert!(overlaps("EGFR", "Documented EGFR mutation"));
        assert!(overlaps("Documented EGFR mutation", "egfr"));
        assert!(overlaps(
            "Non-small cell lung cancer",
            "Histologically confirmed non small-cell lung cancer (NSCLC)"
        ));
    }

    #[test]
    fn test_overlap_respects_word_boundaries() {
        assert!(!overlaps("ALK", "walking distance"));
        assert!(!overlaps("ER", "prior therapy"));
        assert!(overlaps("ER", "ER-positive disease"));
    }

    #[test]
    fn test_overlap_ignores_punctuation_inside_labels() {
        assert!(overlaps("PDL1", "PD-L1 expression >= 50%"));
        assert!(overlaps("PD-L1", "PDL1 high tumours"));
        assert!(overlaps("HER-2", "HER2 positive"));
        assert!(overlaps("HER2", "HER-2 amplified"));
        assert!(overlaps("Non-small cell", "nonsmall cell carcinoma"));
    }

    #[test]
    fn test_collapsed_match_keeps_word_boundaries() {
        assert!(!overlaps("ALK", "walking distance"));
        assert!(!overlaps("PDL1", "PD-L12 variant"));
        assert!(!overlaps("HER2", "other 2 sites"));
    }

    #[test]
    fn test_empty_never_overlaps() {
        assert!(!overlaps("", "anything"));
        assert!(!overlaps("--", "anything"));
    }

    #[test]
    fn test_first_overlap_is_deterministic() {
        let labels: BTreeSet<String> = ["PD-L1", "KRAS G12C", "EGFR"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            first_overlap(&labels, "EGFR or KRAS G12C mutation"),
            Some("EGFR")
        );
        assert_eq!(first_overlap(&labels, "BRAF V600E"), None);
    }

    #[test]
    fn test_mentions() {
        assert!(mentions("ECOG Performance Status 0-1", "performance status"));
        assert!(!mentions("Staged resection", "stage"));
    }
}
