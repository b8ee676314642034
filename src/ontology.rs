use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::OntologyError;

/// The four tag dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ResearchDomains,
    Methods,
    Populations,
    SponsorThemes,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::ResearchDomains,
        Category::Methods,
        Category::Populations,
        Category::SponsorThemes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::ResearchDomains => "research_domains",
            Category::Methods => "methods",
            Category::Populations => "populations",
            Category::SponsorThemes => "sponsor_themes",
        }
    }
}

const RESEARCH_DOMAINS: &[(&str, &str)] = &[
    ("health", "health"),
    ("medical", "health"),
    ("clinical", "health"),
    ("biomedical", "health"),
    ("disease", "health"),
    ("treatment", "health"),
    ("therapy", "health"),
    ("engineering", "engineering"),
    ("technology", "engineering"),
    ("innovation", "engineering"),
    ("design", "engineering"),
    ("manufacturing", "engineering"),
    ("science", "science"),
    ("research", "science"),
    ("discovery", "science"),
    ("experiment", "science"),
    ("laboratory", "science"),
    ("education", "education"),
    ("learning", "education"),
    ("teaching", "education"),
    ("student", "education"),
    ("curriculum", "education"),
    ("environment", "environment"),
    ("climate", "environment"),
    ("sustainability", "environment"),
    ("energy", "environment"),
    ("renewable", "environment"),
    ("social", "social"),
    ("community", "social"),
    ("society", "social"),
    ("behavior", "social"),
    ("policy", "social"),
    ("public", "social"),
];

const METHODS: &[(&str, &str)] = &[
    ("experiment", "experimental"),
    ("trial", "experimental"),
    ("testing", "experimental"),
    ("laboratory", "experimental"),
    ("empirical", "experimental"),
    ("computational", "computational"),
    ("modeling", "computational"),
    ("simulation", "computational"),
    ("algorithm", "computational"),
    ("data analysis", "computational"),
    ("theoretical", "theoretical"),
    ("theory", "theoretical"),
    ("mathematical", "theoretical"),
    ("conceptual", "theoretical"),
    ("field study", "field_study"),
    ("fieldwork", "field_study"),
    ("survey", "field_study"),
    ("observation", "field_study"),
    ("ethnographic", "field_study"),
];

const POPULATIONS: &[(&str, &str)] = &[
    ("student", "students"),
    ("undergraduate", "students"),
    ("graduate", "students"),
    ("postdoctoral", "students"),
    ("faculty", "faculty"),
    ("professor", "faculty"),
    ("researcher", "faculty"),
    ("investigator", "faculty"),
    ("institution", "institutions"),
    ("university", "institutions"),
    ("college", "institutions"),
    ("organization", "institutions"),
    ("community", "communities"),
    ("public", "communities"),
    ("population", "communities"),
    ("society", "communities"),
];

const SPONSOR_THEMES: &[(&str, &str)] = &[
    ("national science foundation", "basic_research"),
    ("nsf", "basic_research"),
    ("national institutes of health", "health_research"),
    ("nih", "health_research"),
    ("health", "health_research"),
    ("department of energy", "energy_research"),
    ("doe", "energy_research"),
    ("nasa", "space_research"),
    ("aeronautics", "space_research"),
];

const FALLBACK_THEME: &str = "general";

static STANDARD: LazyLock<Ontology> = LazyLock::new(|| {
    Ontology::from_table(OntologyTable {
        research_domains: owned(RESEARCH_DOMAINS),
        methods: owned(METHODS),
        populations: owned(POPULATIONS),
        sponsor_themes: owned(SPONSOR_THEMES),
        fallback_theme: Some(FALLBACK_THEME.to_string()),
    })
    .unwrap()
});

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, t)| (k.to_string(), t.to_string()))
        .collect()
}

/// Keywords this short are acronyms and must match a whole word.
const ACRONYM_MAX_LEN: usize = 4;

/// One keyword → canonical tag mapping. Matches where the keyword starts a
/// word: "student" finds "students", "nih" does not find "annihilate".
/// Short single-word keywords must also end a word, so "doe" skips "does".
#[derive(Debug, Clone)]
pub struct Rule {
    pub keyword: String,
    pub tag: String,
    pattern: Regex,
}

impl Rule {
    fn new(keyword: &str, tag: &str, category: Category) -> Result<Self, OntologyError> {
        let keyword = keyword.trim().to_lowercase();
        let tag = tag.trim().to_string();
        if keyword.is_empty() || tag.is_empty() {
            return Err(OntologyError::EmptyRule(category.as_str()));
        }
        let end = if is_acronym(&keyword) { r"\b" } else { "" };
        let pattern = Regex::new(&format!(r"(?i)\b{}{}", regex::escape(&keyword), end))
            .map_err(|e| OntologyError::Pattern(keyword.clone(), e))?;
        Ok(Self { keyword, tag, pattern })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

fn is_acronym(keyword: &str) -> bool {
    keyword.chars().count() <= ACRONYM_MAX_LEN && keyword.chars().all(|c| c.is_alphanumeric())
}

/// On-disk shape of an ontology: ordered `[keyword, tag]` pairs per category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OntologyTable {
    #[serde(default)]
    pub research_domains: Vec<(String, String)>,
    #[serde(default)]
    pub methods: Vec<(String, String)>,
    #[serde(default)]
    pub populations: Vec<(String, String)>,
    #[serde(default)]
    pub sponsor_themes: Vec<(String, String)>,
    #[serde(default)]
    pub fallback_theme: Option<String>,
}

/// Closed vocabulary used for tagging. Immutable once built.
#[derive(Debug, Clone)]
pub struct Ontology {
    research_domains: Vec<Rule>,
    methods: Vec<Rule>,
    populations: Vec<Rule>,
    sponsor_themes: Vec<Rule>,
    fallback_theme: Option<String>,
}

impl Ontology {
    /// Built-in vocabulary, compiled on first use.
    pub fn standard() -> &'static Ontology {
        &STANDARD
    }

    pub fn from_table(table: OntologyTable) -> Result<Self, OntologyError> {
        let build = |pairs: &[(String, String)], category: Category| {
            pairs
                .iter()
                .map(|(k, t)| Rule::new(k, t, category))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            research_domains: build(&table.research_domains, Category::ResearchDomains)?,
            methods: build(&table.methods, Category::Methods)?,
            populations: build(&table.populations, Category::Populations)?,
            sponsor_themes: build(&table.sponsor_themes, Category::SponsorThemes)?,
            fallback_theme: table
                .fallback_theme
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, OntologyError> {
        let table: OntologyTable = serde_json::from_str(json)?;
        Self::from_table(table)
    }

    pub fn rules(&self, category: Category) -> &[Rule] {
        match category {
            Category::ResearchDomains => &self.research_domains,
            Category::Methods => &self.methods,
            Category::Populations => &self.populations,
            Category::SponsorThemes => &self.sponsor_themes,
        }
    }

    /// Theme added when nothing in the sponsor_themes rules matched.
    pub fn fallback_theme(&self) -> Option<&str> {
        self.fallback_theme.as_deref()
    }

    /// Distinct tags of a category, in declaration order.
    pub fn vocabulary(&self, category: Category) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for rule in self.rules(category) {
            if !tags.contains(&rule.tag.as_str()) {
                tags.push(&rule.tag);
            }
        }
        if category == Category::SponsorThemes {
            if let Some(fallback) = self.fallback_theme() {
                if !tags.contains(&fallback) {
                    tags.push(fallback);
                }
            }
        }
        tags
    }

    pub fn contains(&self, category: Category, tag: &str) -> bool {
        self.vocabulary(category).contains(&tag)
    }
}
