use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ontology::Category;
use crate::parser::extract::Fields;

/// Tags per category, each in first-match order without repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    pub research_domains: Vec<String>,
    pub methods: Vec<String>,
    pub populations: Vec<String>,
    pub sponsor_themes: Vec<String>,
}

impl TagSet {
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::ResearchDomains => &self.research_domains,
            Category::Methods => &self.methods,
            Category::Populations => &self.populations,
            Category::SponsorThemes => &self.sponsor_themes,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::ResearchDomains => &mut self.research_domains,
            Category::Methods => &mut self.methods,
            Category::Populations => &mut self.populations,
            Category::SponsorThemes => &mut self.sponsor_themes,
        }
    }
}

/// One normalized funding opportunity announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoaRecord {
    pub foa_id: String,
    pub title: String,
    pub agency: String,
    pub open_date: Option<NaiveDateTime>,
    pub close_date: Option<NaiveDateTime>,
    pub eligibility_text: String,
    pub program_description: String,
    pub award_range: String,
    pub source_url: String,
    pub semantic_tags: TagSet,
}

impl FoaRecord {
    pub fn assemble(fields: Fields, semantic_tags: TagSet, source_url: &str) -> Self {
        Self {
            foa_id: fields.foa_id,
            title: fields.title,
            agency: fields.agency,
            open_date: fields.open_date,
            close_date: fields.close_date,
            eligibility_text: fields.eligibility_text,
            program_description: fields.program_description,
            award_range: fields.award_range,
            source_url: source_url.to_string(),
            semantic_tags,
        }
    }
}
