use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("head > title, title").unwrap());

/// Elements whose content never reaches the text view.
const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "iframe", "button", "select",
];
/// Elements that start and end a line of text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl",
    "fieldset", "figcaption", "figure", "footer", "form", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "summary", "table", "tbody", "thead", "tfoot",
    "tr", "ul",
];
const CELL_TAGS: &[&str] = &["td", "th"];

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Text(String),
}

impl Block {
    pub fn text(&self) -> &str {
        match self {
            Block::Heading { text, .. } | Block::Text(text) => text,
        }
    }
}

/// Plain-text view of a page: heading metadata plus a flat list of lines.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// First non-empty `<h1>`.
    pub h1: Option<String>,
    /// Document `<title>`.
    pub head_title: Option<String>,
    pub blocks: Vec<Block>,
    /// Every block joined by newlines. Label and pattern scans run on this.
    pub text: String,
}

pub fn parse_html(markup: &str) -> Page {
    let html = Html::parse_document(markup);

    let h1 = html
        .select(&H1)
        .map(|el| collapse(el.text()))
        .find(|t| !t.is_empty());
    let head_title = html
        .select(&TITLE)
        .map(|el| collapse(el.text()))
        .find(|t| !t.is_empty());

    let mut walker = Walker::default();
    walker.walk(html.root_element());
    walker.flush();

    let text = walker
        .blocks
        .iter()
        .map(Block::text)
        .collect::<Vec<_>>()
        .join("\n");

    Page {
        h1,
        head_title,
        blocks: walker.blocks,
        text,
    }
}

fn collapse<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" | "dt" => Some(6),
        _ => None,
    }
}

#[derive(Default)]
struct Walker {
    blocks: Vec<Block>,
    line: String,
    pending_space: bool,
}

impl Walker {
    fn walk(&mut self, el: ElementRef<'_>) {
        let tag = el.value().name();
        if SKIPPED_TAGS.contains(&tag) {
            return;
        }

        if let Some(level) = heading_level(tag) {
            self.flush();
            let text = collapse(el.text());
            if !text.is_empty() {
                self.blocks.push(Block::Heading { level, text });
            }
            return;
        }

        let is_block = BLOCK_TAGS.contains(&tag);
        if is_block {
            self.flush();
        }

        for child in el.children() {
            match child.value() {
                Node::Text(t) => self.push_text(t),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.walk(child_el);
                    }
                }
                _ => {}
            }
        }

        if is_block || tag == "br" {
            self.flush();
        } else if CELL_TAGS.contains(&tag) {
            self.pending_space = true;
        }
    }

    fn push_text(&mut self, raw: &str) {
        if raw.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        for word in raw.split_whitespace() {
            if self.pending_space && !self.line.is_empty() {
                self.line.push(' ');
            }
            self.line.push_str(word);
            self.pending_space = true;
        }
        if !raw.ends_with(char::is_whitespace) && !raw.trim().is_empty() {
            self.pending_space = false;
        }
    }

    fn flush(&mut self) {
        if !self.line.is_empty() {
            self.blocks.push(Block::Text(std::mem::take(&mut self.line)));
        }
        self.pending_space = false;
    }
}
