use tracing::debug;

use crate::parser::blocks::Page;

/// `<h1>`, else `<title>`, else empty.
pub fn extract(page: &Page) -> String {
    if let Some(h1) = &page.h1 {
        debug!("title from <h1>");
        return h1.clone();
    }
    page.head_title.clone().unwrap_or_default()
}
