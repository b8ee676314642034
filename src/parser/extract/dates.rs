use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::debug;

use super::site::Site;
use crate::parser::dates::{normalize, Boundary};

const GRANTS_GOV_OPEN: &[&str] = &["Posted Date", "Post Date", "Open Date"];
const GRANTS_GOV_CLOSE: &[&str] = &["Close Date", "Closing Date", "Due Date"];
const NSF_OPEN: &[&str] = &["Posted", "Release Date"];
const NSF_CLOSE: &[&str] = &["Full Proposal Deadline", "Proposal Deadline"];
const GENERIC_OPEN: &[&str] = &["Posted", "Open", "Release"];
const GENERIC_CLOSE: &[&str] = &["Close", "Deadline", "Due"];

/// Every label above, compiled once. Labels match whole words, so "Posted"
/// also finds "Posted Date" but "Close" does not find "Closely".
static LABELS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        GRANTS_GOV_OPEN,
        GRANTS_GOV_CLOSE,
        NSF_OPEN,
        NSF_CLOSE,
        GENERIC_OPEN,
        GENERIC_CLOSE,
    ]
    .concat()
    .into_iter()
    .map(|label| {
        let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(label))).unwrap();
        (label, re)
    })
    .collect()
});

/// "Due to", "Open to": a one-word label followed by "to" is prose.
static PROSE_FOLLOWER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s+to\b").unwrap());

/// Find the date for one end of the application window.
///
/// Labels are tried site-specific first, then generic; for each label every
/// occurrence is tried in document order. The text after an occurrence, up
/// to `window` characters or the next date label, goes to the normalizer.
/// The first window that normalizes wins.
pub fn extract(text: &str, site: Site, boundary: Boundary, window: usize) -> Option<NaiveDateTime> {
    let label_starts = label_starts(text);

    for label in labels_for(site, boundary) {
        let Some(re) = pattern(label) else { continue };
        for m in re.find_iter(text).filter(|m| !is_prose(label, text, m.end())) {
            let slice = window_after(text, m.end(), window, &label_starts);
            match normalize(slice, boundary) {
                Ok(dt) => {
                    debug!(label, ?boundary, "date from label");
                    return Some(dt);
                }
                Err(e) => debug!(label, "skipping date window: {}", e),
            }
        }
    }
    None
}

fn labels_for(site: Site, boundary: Boundary) -> impl Iterator<Item = &'static str> {
    let specific: &[&str] = match (site, boundary) {
        (Site::GrantsGov, Boundary::Open) => GRANTS_GOV_OPEN,
        (Site::GrantsGov, Boundary::Close) => GRANTS_GOV_CLOSE,
        (Site::Nsf, Boundary::Open) => NSF_OPEN,
        (Site::Nsf, Boundary::Close) => NSF_CLOSE,
        (Site::Generic, _) => &[],
    };
    let generic = match boundary {
        Boundary::Open => GENERIC_OPEN,
        Boundary::Close => GENERIC_CLOSE,
    };
    specific.iter().chain(generic.iter()).copied()
}

fn pattern(label: &str) -> Option<&'static Regex> {
    LABELS.iter().find(|(l, _)| *l == label).map(|(_, re)| re)
}

fn is_prose(label: &str, text: &str, end: usize) -> bool {
    !label.contains(' ') && PROSE_FOLLOWER.is_match(&text[end..])
}

/// Sorted start offsets of every date label of either kind.
fn label_starts(text: &str) -> Vec<usize> {
    let mut starts: Vec<usize> = LABELS
        .iter()
        .flat_map(|(label, re)| {
            re.find_iter(text)
                .filter(|m| !is_prose(label, text, m.end()))
                .map(|m| m.start())
        })
        .collect();
    starts.sort_unstable();
    starts.dedup();
    starts
}

fn window_after<'a>(text: &'a str, from: usize, window: usize, label_starts: &[usize]) -> &'a str {
    let mut end = text.len().min(from.saturating_add(window));
    if let Some(next) = label_starts.iter().find(|&&s| s >= from) {
        end = end.min(*next);
    }
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[from..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn posted_and_deadline() {
        let text = "Posted: January 15, 2024\nDeadline: 12/31/2024";
        assert_eq!(extract(text, Site::Generic, Boundary::Open, 80), Some(at("2024-01-15T00:00:00")));
        assert_eq!(extract(text, Site::Generic, Boundary::Close, 80), Some(at("2024-12-31T23:59:59")));
    }

    #[test]
    fn no_labels_no_dates() {
        let text = "This program supports research. Apply by January 15, 2024.";
        assert_eq!(extract(text, Site::Generic, Boundary::Open, 80), None);
        assert_eq!(extract(text, Site::Generic, Boundary::Close, 80), None);
    }

    #[test]
    fn window_stops_at_next_label() {
        let text = "Posted Date: TBD Close Date: 03/01/2025";
        assert_eq!(extract(text, Site::GrantsGov, Boundary::Open, 80), None);
        assert_eq!(
            extract(text, Site::GrantsGov, Boundary::Close, 80),
            Some(at("2025-03-01T23:59:59"))
        );
    }

    #[test]
    fn later_occurrence_used_when_first_fails() {
        let text = "Open to all applicants.\nOpen Date: 2024-02-01";
        assert_eq!(extract(text, Site::Generic, Boundary::Open, 20), Some(at("2024-02-01T00:00:00")));
    }

    #[test]
    fn label_is_case_insensitive() {
        let text = "DUE DATE\n\nMarch 3, 2025";
        assert_eq!(extract(text, Site::Generic, Boundary::Close, 80), Some(at("2025-03-03T23:59:59")));
    }

    #[test]
    fn window_respects_char_boundaries() {
        let text = "Deadline: ééééé 2024-05-01";
        assert_eq!(extract(text, Site::Generic, Boundary::Close, 5), None);
    }

    #[test]
    fn prose_is_not_a_label() {
        let text = "Closely related work began 01/05/2023. Due to demand, see the Opens Doors site 2023-06-01.";
        assert_eq!(extract(text, Site::Generic, Boundary::Close, 80), None);
        assert_eq!(extract(text, Site::Generic, Boundary::Open, 80), None);
    }

    #[test]
    fn due_to_does_not_cut_a_window() {
        let text = "Deadline: (extended due to outages) June 3, 2025";
        assert_eq!(extract(text, Site::Generic, Boundary::Close, 80), Some(at("2025-06-03T23:59:59")));
    }

    #[test]
    fn unparseable_date_is_none() {
        let text = "Deadline: 13/45/2024";
        assert_eq!(extract(text, Site::Generic, Boundary::Close, 80), None);
    }
}
