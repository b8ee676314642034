use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::label_pattern;
use crate::parser::sections::{find_by_heading, Section};

pub const ELIGIBILITY_KEYWORDS: &[&str] = &["eligibility", "who may apply", "eligible applicants", "eligible"];
pub const DESCRIPTION_KEYWORDS: &[&str] = &["description", "overview", "purpose", "summary", "synopsis"];

static KEYWORD_LABELS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [ELIGIBILITY_KEYWORDS, DESCRIPTION_KEYWORDS]
        .concat()
        .into_iter()
        .map(|kw| (kw, label_pattern(kw)))
        .collect()
});

/// Text of the first section headed by a keyword, else the paragraph after a
/// `keyword:` label, else empty. Capped at `cap` characters.
pub fn extract(sections: &[Section], text: &str, keywords: &[&str], cap: usize) -> String {
    let found = find_by_heading(sections, keywords)
        .map(|s| {
            debug!(heading = %s.heading, "narrative from heading");
            s.body()
        })
        .or_else(|| from_label(text, keywords));

    found.map(|t| truncate(&t, cap)).unwrap_or_default()
}

fn from_label(text: &str, keywords: &[&str]) -> Option<String> {
    keywords.iter().find_map(|kw| {
        let compiled = KEYWORD_LABELS.iter().find(|(k, _)| k == kw).map(|(_, re)| re);
        let owned;
        let re = match compiled {
            Some(re) => re,
            None => {
                owned = label_pattern(kw);
                &owned
            }
        };
        re.captures(text)
            .map(|c| c[1].trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated.trim_end())
    }
}
