pub mod agency;
pub mod award;
pub mod dates;
pub mod ident;
pub mod narrative;
pub mod site;
pub mod title;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::debug;

use super::blocks::Page;
use super::dates::Boundary;
use super::sections::cluster_sections;
use award::AwardPolicy;
use site::Site;

/// Structured fields pulled from one page. Absence is data: empty strings and
/// `None` dates, never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    pub foa_id: String,
    pub title: String,
    pub agency: String,
    pub open_date: Option<NaiveDateTime>,
    pub close_date: Option<NaiveDateTime>,
    pub eligibility_text: String,
    pub program_description: String,
    pub award_range: String,
}

/// Read-only knobs and tables the extractors consult.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Max characters kept for eligibility/description text.
    pub section_cap: usize,
    /// Bytes after a date label handed to the normalizer.
    pub date_window: usize,
    pub award_policy: AwardPolicy,
    pub domain_agencies: &'static [(&'static str, &'static str)],
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            section_cap: 500,
            date_window: 80,
            award_policy: AwardPolicy::default(),
            domain_agencies: site::DOMAIN_AGENCIES,
        }
    }
}

pub fn extract_all(page: &Page, source_url: &str, opts: &ExtractOptions) -> Fields {
    let site = Site::detect(source_url);
    let sections = cluster_sections(&page.blocks);
    debug!(?site, sections = sections.len(), "extracting {}", source_url);

    Fields {
        foa_id: ident::foa_id(source_url, site),
        title: title::extract(page),
        agency: agency::extract(&page.text, source_url, site, opts.domain_agencies),
        open_date: dates::extract(&page.text, site, Boundary::Open, opts.date_window),
        close_date: dates::extract(&page.text, site, Boundary::Close, opts.date_window),
        eligibility_text: narrative::extract(
            &sections,
            &page.text,
            narrative::ELIGIBILITY_KEYWORDS,
            opts.section_cap,
        ),
        program_description: narrative::extract(
            &sections,
            &page.text,
            narrative::DESCRIPTION_KEYWORDS,
            opts.section_cap,
        ),
        award_range: award::extract(&page.text, opts.award_policy),
    }
}

/// `Label:` followed by its value on the same line, or on the next one when
/// the label ends its line.
fn label_pattern(label: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\s*:\s*([^\n]+)", regex::escape(label))).unwrap()
}
