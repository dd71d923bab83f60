//! Fixed plain-language summary templates, selected by category.

use crate::models::{BlockingFactor, MatchCategory, MatchingFactor};

const CARE_TEAM_REMINDER: &str =
    "This is informational only; please discuss it with your care team.";

fn open_questions(count: usize) -> String {
    match count {
        1 => "1 open question".to_string(),
        n => format!("{n} open questions"),
    }
}

/// Render the summary for a scored candidate
pub fn render(
    category: MatchCategory,
    top_matching: Option<&MatchingFactor>,
    top_blocking: Option<&BlockingFactor>,
    uncertain_count: usize,
) -> String {
    let body = match (category, top_matching, top_blocking) {
        (MatchCategory::NotEligible, _, Some(blocking)) => format!(
            "This study appears to exclude you: {} ({}).",
            blocking.label, blocking.reason
        ),
        (MatchCategory::NotEligible, _, None) => {
            "There is not enough matching evidence to suggest this study fits your profile."
                .to_string()
        }
        (MatchCategory::Strong, Some(top), _) => format!(
            "This study looks like a strong match, most notably on \"{}\".",
            top.label
        ),
        (MatchCategory::Possible, Some(top), _) => format!(
            "This study may be a match based on \"{}\", with {} to resolve.",
            top.label,
            open_questions(uncertain_count)
        ),
        (MatchCategory::FuturePotential, _, _) => format!(
            "This study could become relevant, but {} remain.",
            open_questions(uncertain_count)
        ),
        (MatchCategory::Strong | MatchCategory::Possible, None, _) => format!(
            "This study may be a match, with {} to resolve.",
            open_questions(uncertain_count)
        ),
    };
    format!("{body} {CARE_TEAM_REMINDER}")
}
