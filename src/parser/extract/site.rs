use url::Url;

/// Source-site family; picks which site-specific heuristics run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    GrantsGov,
    Nsf,
    Generic,
}

impl Site {
    pub fn detect(source_url: &str) -> Self {
        let host = host_of(source_url);
        if host.contains("grants.gov") {
            Site::GrantsGov
        } else if host.contains("nsf.gov") {
            Site::Nsf
        } else {
            Site::Generic
        }
    }
}

/// Domain substring → agency name used when the page names no agency.
pub const DOMAIN_AGENCIES: &[(&str, &str)] = &[
    ("grants.gov", "Grants.gov"),
    ("nsf.gov", "National Science Foundation (NSF)"),
    ("nih.gov", "National Institutes of Health (NIH)"),
    ("energy.gov", "Department of Energy (DOE)"),
    ("nasa.gov", "National Aeronautics and Space Administration (NASA)"),
];

pub fn agency_for_domain(source_url: &str, table: &[(&'static str, &'static str)]) -> Option<&'static str> {
    let host = host_of(source_url);
    table
        .iter()
        .find(|(domain, _)| host.contains(domain))
        .map(|(_, agency)| *agency)
}

/// Lower-cased host, or the whole lower-cased input when it is not a URL.
pub fn host_of(source_url: &str) -> String {
    Url::parse(source_url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| source_url.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_families() {
        assert_eq!(Site::detect("https://www.grants.gov/search-results-detail/350693"), Site::GrantsGov);
        assert_eq!(Site::detect("https://new.nsf.gov/funding/opportunities/crii"), Site::Nsf);
        assert_eq!(Site::detect("https://example.org/nsf.gov/page"), Site::Generic);
        assert_eq!(Site::detect("not a url but grants.gov"), Site::GrantsGov);
    }

    #[test]
    fn domain_lookup() {
        assert_eq!(
            agency_for_domain("https://grants.nih.gov/grants/guide/pa-files/PA-25-301.html", DOMAIN_AGENCIES),
            Some("National Institutes of Health (NIH)")
        );
        assert_eq!(agency_for_domain("https://example.org/foa", DOMAIN_AGENCIES), None);
    }

    #[test]
    fn substitute_table() {
        const TABLE: &[(&str, &str)] = &[("example.org", "Example Foundation")];
        assert_eq!(agency_for_domain("https://www.example.org/x", TABLE), Some("Example Foundation"));
        assert_eq!(agency_for_domain("https://www.nsf.gov/x", TABLE), None);
    }
}
