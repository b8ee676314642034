pub mod blocks;
pub mod dates;
pub mod extract;
pub mod sections;

use tracing::info;

use crate::error::PipelineError;
use crate::ontology::Ontology;
use crate::record::FoaRecord;
use crate::tagger::Tagger;
use extract::{ExtractOptions, Fields};

/// Share of non-whitespace control characters above which markup is treated
/// as binary.
const MAX_CONTROL_RATIO: f64 = 0.10;

/// Markup → fields → tags → record. Holds only read-only state, so one
/// pipeline can serve many threads.
pub struct Pipeline<'a> {
    ontology: &'a Ontology,
    options: ExtractOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(ontology: &'a Ontology, options: ExtractOptions) -> Self {
        Self { ontology, options }
    }

    pub fn run(&self, markup: &str, source_url: &str) -> Result<FoaRecord, PipelineError> {
        ensure_text(markup).map_err(|reason| PipelineError::MalformedInput {
            url: source_url.to_string(),
            reason,
        })?;

        let fields = extract_fields(markup, source_url, &self.options);
        let tags = Tagger::new(self.ontology).tag(&fields);
        let record = FoaRecord::assemble(fields, tags, source_url);
        info!(
            foa_id = %record.foa_id,
            agency = %record.agency,
            open = record.open_date.is_some(),
            close = record.close_date.is_some(),
            "processed {}",
            source_url
        );
        Ok(record)
    }
}

/// Two-pass extraction: markup → blocks → fields.
pub fn extract_fields(markup: &str, source_url: &str, opts: &ExtractOptions) -> Fields {
    let page = blocks::parse_html(markup);
    extract::extract_all(&page, source_url, opts)
}

fn ensure_text(markup: &str) -> Result<(), String> {
    if markup.contains('\0') {
        return Err("contains NUL bytes".to_string());
    }
    let total = markup.chars().count();
    if total == 0 {
        return Ok(());
    }
    let suspicious = markup
        .chars()
        .filter(|c| (c.is_control() && !c.is_whitespace()) || *c == char::REPLACEMENT_CHARACTER)
        .count();
    if suspicious as f64 / total as f64 > MAX_CONTROL_RATIO {
        return Err(format!(
            "{} of {} characters are control or replacement characters",
            suspicious, total
        ));
    }
    Ok(())
}

// ── Tests ──
