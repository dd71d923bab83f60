//! Numeric requirements parsed out of criterion text: ECOG performance-status
//! ranges and disease-stage mentions.

use super::text::{mentions, normalize};
use crate::constants::scoring::MAX_PERFORMANCE_STATUS;
use crate::models::DiseaseStage;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;
use tracing::warn;

/// Phrases that mark a criterion as a performance-status requirement
const PERFORMANCE_SCALES: &[&str] = &[
    "ecog",
    "performance status",
    "karnofsky",
    "zubrod",
    "who ps",
    "kps",
    "lansky",
];

/// Keywords that name a scale on the 0-4 ECOG range
const ECOG_KEYWORDS: &[&str] = &["ecog", "zubrod", "who ps"];

/// Percentage scales; their numbers never map onto ECOG
const PERCENT_SCALES: &[&str] = &["karnofsky", "kps", "lansky"];

/// Generic phrase that counts as ECOG unless a percentage scale names it
const GENERIC_PHRASE: &str = "performance status";

/// Inclusive range on the ECOG scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceStatusRange {
    pub min: u8,
    pub max: u8,
}

impl PerformanceStatusRange {
    fn new(a: u8, b: u8) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b).min(MAX_PERFORMANCE_STATUS),
        }
    }

    pub fn contains(&self, score: u8) -> bool {
        score >= self.min && score <= self.max
    }
}

impl fmt::Display for PerformanceStatusRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

struct PerformancePatterns {
    range: Regex,
    at_most: Regex,
    below: Regex,
    at_least: Regex,
    above: Regex,
    or_less: Regex,
    or_more: Regex,
    list: Regex,
    single: Regex,
}

/// Compile a built-in pattern; a failure disables the parser that needs it
fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|error| warn!(%error, pattern, "Criterion pattern failed to compile"))
        .ok()
}

fn performance_patterns() -> Option<&'static PerformancePatterns> {
    static PATTERNS: OnceLock<Option<PerformancePatterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(PerformancePatterns {
                range: compile(r"\b([0-4])\s*(?:-|–|—|to|through)\s*([0-4])\b")?,
                at_most: compile(
                    r"(?:≤|<=|=<|at most|no more than|no greater than|not greater than|less than or equal to|up to)\s*([0-4])\b",
                )?,
                below: compile(r"(?:<|less than|lower than|below)\s*([0-4])\b")?,
                at_least: compile(r"(?:≥|>=|=>|at least|greater than or equal to)\s*([0-4])\b")?,
                above: compile(r"(?:>|greater than|higher than|above)\s*([0-4])\b")?,
                or_less: compile(r"\b([0-4])\s*or\s*(?:less|lower|below|better)\b")?,
                or_more: compile(r"\b([0-4])\s*or\s*(?:more|higher|greater|above|worse)\b")?,
                list: compile(
                    r"\b[0-4](?:(?:\s*,\s*(?:(?:or|and)\s+)?|\s+(?:or|and)\s+)[0-4]\b)+",
                )?,
                single: compile(r"\b([0-4])\b")?,
            })
        })
        .as_ref()
}

fn digit(caps: &regex::Captures<'_>, group: usize) -> Option<u8> {
    caps.get(group)?.as_str().parse().ok()
}

/// True when the criterion talks about a performance-status scale
pub fn mentions_performance_status(text: &str) -> bool {
    PERFORMANCE_SCALES.iter().any(|scale| mentions(text, scale))
}

/// Parse an ECOG requirement such as `ECOG 0-1`, `PS ≤ 2` or `ECOG 0, 1 or 2`
///
/// Returns `None` when the text names no 0-4 scale or encodes no number.
/// Karnofsky, KPS and Lansky criteria are left unparsed unless the text also
/// names an ECOG-range scale.
pub fn parse_performance_status(text: &str) -> Option<PerformanceStatusRange> {
    let normalized = normalize(text);
    let lowered = text.to_lowercase();

    let names_ecog = ECOG_KEYWORDS
        .iter()
        .any(|keyword| mentions(&normalized, keyword));
    if !names_ecog
        && PERCENT_SCALES
            .iter()
            .any(|scale| mentions(&normalized, scale))
    {
        return None;
    }

    // Anchor at the first scale keyword so unrelated numbers before it are ignored
    let keyword_anchor = ECOG_KEYWORDS
        .iter()
        .filter(|keyword| mentions(&normalized, keyword))
        .filter_map(|keyword| {
            let first_word = keyword.split(' ').next().unwrap_or(keyword);
            lowered.find(first_word)
        })
        .min();
    let generic_anchor = lowered
        .match_indices(GENERIC_PHRASE)
        .map(|(index, _)| index)
        .find(|&index| {
            let before = lowered[..index].trim_end();
            !PERCENT_SCALES.iter().any(|scale| before.ends_with(scale))
        });
    let anchor = keyword_anchor.into_iter().chain(generic_anchor).min()?;

    let window: &str = lowered[anchor..]
        .split(|c| c == ';' || c == '.')
        .next()
        .unwrap_or("");

    let patterns = performance_patterns()?;

    if let Some(caps) = patterns.range.captures(window) {
        return Some(PerformanceStatusRange::new(digit(&caps, 1)?, digit(&caps, 2)?));
    }
    if let Some(caps) = patterns.at_most.captures(window) {
        return Some(PerformanceStatusRange::new(0, digit(&caps, 1)?));
    }
    if let Some(caps) = patterns.at_least.captures(window) {
        return Some(PerformanceStatusRange::new(
            digit(&caps, 1)?,
            MAX_PERFORMANCE_STATUS,
        ));
    }
    if let Some(caps) = patterns.below.captures(window) {
        let bound = digit(&caps, 1)?;
        return bound
            .checked_sub(1)
            .map(|max| PerformanceStatusRange::new(0, max));
    }
    if let Some(caps) = patterns.above.captures(window) {
        let bound = digit(&caps, 1)?;
        if bound >= MAX_PERFORMANCE_STATUS {
            return None;
        }
        return Some(PerformanceStatusRange::new(
            bound + 1,
            MAX_PERFORMANCE_STATUS,
        ));
    }
    if let Some(caps) = patterns.or_less.captures(window) {
        return Some(PerformanceStatusRange::new(0, digit(&caps, 1)?));
    }
    if let Some(caps) = patterns.or_more.captures(window) {
        return Some(PerformanceStatusRange::new(
            digit(&caps, 1)?,
            MAX_PERFORMANCE_STATUS,
        ));
    }
    if let Some(found) = patterns.list.find(window) {
        let values: Vec<u8> = found
            .as_str()
            .chars()
            .filter_map(|c| c.to_digit(10))
            .filter_map(|d| u8::try_from(d).ok())
            .collect();
        let min = values.iter().copied().min()?;
        let max = values.iter().copied().max()?;
        return Some(PerformanceStatusRange::new(min, max));
    }
    let caps = patterns.single.captures(window)?;
    let value = digit(&caps, 1)?;
    Some(PerformanceStatusRange::new(value, value))
}

fn stage_patterns() -> Option<&'static (Regex, Regex, Regex)> {
    static PATTERNS: OnceLock<Option<(Regex, Regex, Regex)>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            let token = r"(?:iv|i{1,3}|[1-4])[abc]?";
            let mention = format!(
                r"\bstages?\s+({token}(?:\s*(?:-|–|to|through|or|and|,|/)\s*(?:stage\s+)?{token})*)\b"
            );
            Some((
                compile(&mention)?,
                compile(r"(iv|i{1,3}|[1-4])[abc]?")?,
                compile(r"-|–|\bto\b|\bthrough\b")?,
            ))
        })
        .as_ref()
}

fn stage_ordinal(token: &str) -> Option<u8> {
    match token {
        "i" | "1" => Some(1),
        "ii" | "2" => Some(2),
        "iii" | "3" => Some(3),
        "iv" | "4" => Some(4),
        _ => None,
    }
}

/// True when the criterion mentions disease stage
pub fn mentions_stage(text: &str) -> bool {
    mentions(text, "stage") || mentions(text, "stages")
}

/// Every disease stage named in the text, e.g. `Stage IIIB-IV` yields III and IV
pub fn parse_stages(text: &str) -> BTreeSet<DiseaseStage> {
    let mut stages = BTreeSet::new();
    let Some((mention, token, range_separator)) = stage_patterns() else {
        return stages;
    };
    let lowered = text.to_lowercase();

    for caps in mention.captures_iter(&lowered) {
        let Some(group) = caps.get(1) else {
            continue;
        };
        let group = group.as_str();
        let mut previous: Option<(u8, usize)> = None;

        for found in token.captures_iter(group) {
            let Some(whole) = found.get(0) else {
                continue;
            };
            let Some(ordinal) = found.get(1).and_then(|m| stage_ordinal(m.as_str())) else {
                continue;
            };

            if let Some((last, last_end)) = previous {
                let separator = &group[last_end..whole.start()];
                if range_separator.is_match(separator) {
                    for between in (last.min(ordinal) + 1)..last.max(ordinal) {
                        stages.insert(DiseaseStage::from_ordinal(between));
                    }
                }
            }

            stages.insert(DiseaseStage::from_ordinal(ordinal));
            previous = Some((ordinal, whole.end()));
        }
    }

    stages
}
