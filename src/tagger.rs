use tracing::debug;

use crate::ontology::{Category, Ontology};
use crate::parser::extract::Fields;
use crate::record::TagSet;

/// Joins the scanned fields. Keywords never contain a newline, so no match
/// can span two fields.
const FIELD_SEPARATOR: &str = "\n\n";

/// Rule-based tagger over a closed ontology.
pub struct Tagger<'a> {
    ontology: &'a Ontology,
}

impl<'a> Tagger<'a> {
    pub fn new(ontology: &'a Ontology) -> Self {
        Self { ontology }
    }

    pub fn tag(&self, fields: &Fields) -> TagSet {
        let text = [
            fields.title.as_str(),
            fields.eligibility_text.as_str(),
            fields.program_description.as_str(),
        ]
        .join(FIELD_SEPARATOR);

        let mut tags = TagSet::default();
        for category in Category::ALL {
            let found = tags.get_mut(category);
            for rule in self.ontology.rules(category) {
                if found.contains(&rule.tag) {
                    continue;
                }
                let hit = rule.matches(&text)
                    || (category == Category::SponsorThemes && rule.matches(&fields.agency));
                if hit {
                    debug!(keyword = %rule.keyword, tag = %rule.tag, "rule matched");
                    found.push(rule.tag.clone());
                }
            }
            if category == Category::SponsorThemes && found.is_empty() {
                if let Some(fallback) = self.ontology.fallback_theme() {
                    found.push(fallback.to_string());
                }
            }
            debug_assert!(found.iter().all(|t| self.ontology.contains(category, t)));
            debug!(category = category.as_str(), tags = ?found, "tagged");
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::OntologyTable;

    fn fields(title: &str, eligibility: &str, description: &str, agency: &str) -> Fields {
        Fields {
            title: title.into(),
            eligibility_text: eligibility.into(),
            program_description: description.into(),
            agency: agency.into(),
            ..Fields::default()
        }
    }

    #[test]
    fn health_scenario() {
        let f = fields(
            "",
            "",
            "This program supports health research for graduate students.",
            "National Institutes of Health",
        );
        let tags = Tagger::new(Ontology::standard()).tag(&f);
        assert!(tags.sponsor_themes.contains(&"health_research".to_string()));
        assert!(tags.populations.contains(&"students".to_string()));
        assert_eq!(tags.research_domains, vec!["health", "science", "education"]);
    }

    #[test]
    fn agency_alone_implies_theme() {
        let f = fields("Bridge design", "", "", "National Science Foundation (NSF)");
        let tags = Tagger::new(Ontology::standard()).tag(&f);
        assert_eq!(tags.sponsor_themes, vec!["basic_research"]);
        assert_eq!(tags.research_domains, vec!["engineering"]);
    }

    #[test]
    fn fallback_theme_when_nothing_matches() {
        let f = fields("Arts grant", "", "", "Example Foundation");
        let tags = Tagger::new(Ontology::standard()).tag(&f);
        assert_eq!(tags.sponsor_themes, vec!["general"]);
        assert!(tags.methods.is_empty());
    }

    #[test]
    fn does_is_not_the_department_of_energy() {
        let f = fields(
            "",
            "",
            "This program does not fund equipment.",
            "National Endowment for the Arts",
        );
        let tags = Tagger::new(Ontology::standard()).tag(&f);
        assert_eq!(tags.sponsor_themes, vec!["general"]);
    }

    #[test]
    fn tags_are_deduplicated() {
        let f = fields(
            "Clinical trial",
            "Medical schools",
            "Biomedical therapy and treatment of disease",
            "",
        );
        let tags = Tagger::new(Ontology::standard()).tag(&f);
        assert_eq!(tags.research_domains.iter().filter(|t| *t == "health").count(), 1);
    }

    #[test]
    fn keywords_do_not_span_fields() {
        let f = fields("Field", "", "Study of rocks", "");
        let tags = Tagger::new(Ontology::standard()).tag(&f);
        assert!(!tags.methods.contains(&"field_study".to_string()));
    }

    #[test]
    fn every_tag_is_in_the_vocabulary() {
        let f = fields(
            "Computational climate modeling",
            "Universities, colleges, and community organizations; postdoctoral researchers",
            "A survey-based field study of public health policy, theory and laboratory experiment",
            "NASA and NIH",
        );
        let o = Ontology::standard();
        let tags = Tagger::new(o).tag(&f);
        for category in Category::ALL {
            let got = tags.get(category);
            assert!(!got.is_empty(), "{} empty", category.as_str());
            for tag in got {
                assert!(o.contains(category, tag), "{} not in {}", tag, category.as_str());
            }
        }
    }

    #[test]
    fn substitute_ontology() {
        let o = Ontology::from_table(OntologyTable {
            research_domains: vec![("ocean".into(), "marine".into())],
            ..OntologyTable::default()
        })
        .unwrap();
        let tags = Tagger::new(&o).tag(&fields("Ocean health", "", "", "NIH"));
        assert_eq!(tags.research_domains, vec!["marine"]);
        assert!(tags.sponsor_themes.is_empty());
    }

    #[test]
    fn tagging_is_repeatable() {
        let f = fields("Teaching innovation", "Faculty", "Curriculum design", "NSF");
        let tagger = Tagger::new(Ontology::standard());
        assert_eq!(tagger.tag(&f), tagger.tag(&f));
    }
}
