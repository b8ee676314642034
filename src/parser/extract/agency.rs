use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::label_pattern;
use super::site::{agency_for_domain, Site};

const UNKNOWN: &str = "Unknown";
const MAX_LEN: usize = 200;

static GRANTS_GOV_LABELS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["Agency Name", "Funding Agency", "Agency", "Department"]
        .into_iter()
        .map(label_pattern)
        .collect()
});
static NSF_LABELS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["Sponsoring Agency", "Sponsor"]
        .into_iter()
        .map(label_pattern)
        .collect()
});
static GENERIC_LABELS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["Funding Agency", "Agency", "Sponsor", "Funding Organization"]
        .into_iter()
        .map(label_pattern)
        .collect()
});

/// Labelled agency text, else the domain table, else `"Unknown"`.
pub fn extract(
    text: &str,
    source_url: &str,
    site: Site,
    domain_agencies: &[(&'static str, &'static str)],
) -> String {
    let site_labels: &[Regex] = match site {
        Site::GrantsGov => GRANTS_GOV_LABELS.as_slice(),
        Site::Nsf => NSF_LABELS.as_slice(),
        Site::Generic => &[],
    };

    if let Some(found) = first_label(site_labels, text).or_else(|| first_label(GENERIC_LABELS.as_slice(), text)) {
        debug!("agency from label");
        return found;
    }
    if let Some(agency) = agency_for_domain(source_url, domain_agencies) {
        debug!("agency from domain");
        return agency.to_string();
    }
    UNKNOWN.to_string()
}

fn first_label(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures_iter(text)
            .map(|c| clean(&c[1]))
            .find(|v| !v.is_empty())
    })
}

fn clean(value: &str) -> String {
    let value = value.trim().trim_end_matches([',', ';']).trim();
    value.chars().take(MAX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::site::DOMAIN_AGENCIES;

    #[test]
    fn grants_gov_label() {
        let text = "Opportunity Number: PA-25-301\nAgency Name: National Institutes of Health\nAgency: NIH";
        let agency = extract(text, "https://www.grants.gov/x", Site::GrantsGov, DOMAIN_AGENCIES);
        assert_eq!(agency, "National Institutes of Health");
    }

    #[test]
    fn generic_sponsor_label() {
        let text = "Sponsor: Example Foundation\nDeadline: soon";
        let agency = extract(text, "https://example.org/x", Site::Generic, DOMAIN_AGENCIES);
        assert_eq!(agency, "Example Foundation");
    }

    #[test]
    fn domain_fallback() {
        let agency = extract("no labels here", "https://www.nsf.gov/funding/x", Site::Nsf, DOMAIN_AGENCIES);
        assert_eq!(agency, "National Science Foundation (NSF)");
    }

    #[test]
    fn unknown_when_nothing_matches() {
        let agency = extract("no labels here", "https://example.org/x", Site::Generic, DOMAIN_AGENCIES);
        assert_eq!(agency, "Unknown");
    }

    #[test]
    fn empty_label_value_skipped() {
        let text = "Agency: ;\nSponsor: Real Sponsor";
        let agency = extract(text, "https://example.org/x", Site::Generic, DOMAIN_AGENCIES);
        assert_eq!(agency, "Real Sponsor");
    }
}
