use super::blocks::Block;

/// A heading and the text lines up to the next heading. Text before the first
/// heading lands in a section with an empty heading.
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub heading: String,
    pub level: u8,
    pub lines: Vec<String>,
}

impl Section {
    pub fn body(&self) -> String {
        self.lines.join("\n").trim().to_string()
    }
}

/// Cluster a flat Vec<Block> into sections at every heading.
pub fn cluster_sections(blocks: &[Block]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current = Section::default();

    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                if !current.heading.is_empty() || !current.lines.is_empty() {
                    sections.push(std::mem::take(&mut current));
                }
                current.heading = text.clone();
                current.level = *level;
            }
            Block::Text(t) => current.lines.push(t.clone()),
        }
    }

    if !current.heading.is_empty() || !current.lines.is_empty() {
        sections.push(current);
    }

    sections
}

/// First section whose heading contains one of `keywords` and whose body is
/// not empty.
pub fn find_by_heading<'a>(sections: &'a [Section], keywords: &[&str]) -> Option<&'a Section> {
    sections.iter().find(|s| {
        let heading = s.heading.to_lowercase();
        !s.lines.is_empty() && keywords.iter().any(|kw| heading.contains(kw))
    })
}
