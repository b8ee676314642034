use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// A dollar amount: `$1,000`, `$2.5 million`, `$500K`.
const AMOUNT: &str = r"\$\s?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?(?:\s*(?:million|thousand|[MK])\b)?";
const BARE_AMOUNT: &str = r"\$?\s?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?(?:\s*(?:million|thousand|[MK])\b)?";

/// Award patterns in priority order.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"(?i){AMOUNT}\s*(?:-|–|—|to)\s*{BARE_AMOUNT}"),
        format!(r"(?i)\bup to\s+{AMOUNT}"),
        format!(r"(?i){AMOUNT}\s+per\s+award"),
        r"(?i)\$\s?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?\s*(?:million|thousand|[MK])\b".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Tie-break when several award patterns match one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardPolicy {
    /// Earliest match in the document; pattern order breaks ties.
    #[default]
    FirstInDocument,
    /// First pattern with any match, wherever it is.
    PatternPriority,
}

/// Verbatim award substring, or empty.
pub fn extract(text: &str, policy: AwardPolicy) -> String {
    let found = match policy {
        AwardPolicy::PatternPriority => PATTERNS.iter().find_map(|re| re.find(text)),
        AwardPolicy::FirstInDocument => PATTERNS
            .iter()
            .filter_map(|re| re.find(text))
            .min_by_key(|m| m.start()),
    };
    found.map(|m| m.as_str().trim().to_string()).unwrap_or_default()
}
