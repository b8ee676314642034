use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use url::Url;

use super::site::Site;

/// Query parameters that carry an opportunity id, by priority.
const ID_PARAMS: &[&str] = &["oppid", "opportunityid", "opp_id", "pims_id", "id"];

static NSF_SOLICITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^nsf(\d{2})-?(\d{3,4})(?:\.\w+)?$").unwrap());

/// Stable `FOA-` identifier for a source URL. The same URL always yields the
/// same id, with or without an explicit id in it.
pub fn foa_id(source_url: &str, site: Site) -> String {
    let explicit = Url::parse(source_url.trim()).ok().and_then(|url| {
        solicitation_number(&url, site)
            .or_else(|| query_id(&url))
            .or_else(|| numeric_segment(&url))
    });

    match explicit {
        Some(id) => format!("FOA-{}", id),
        None => format!("FOA-{}", digest(source_url)),
    }
}

/// NSF solicitation numbers live in the path: `/pubs/2024/nsf24569/nsf24569.htm`.
fn solicitation_number(url: &Url, site: Site) -> Option<String> {
    if site != Site::Nsf {
        return None;
    }
    url.path_segments()?.find_map(|seg| {
        NSF_SOLICITATION_RE
            .captures(seg)
            .map(|c| format!("NSF{}{}", &c[1], &c[2]))
    })
}

fn query_id(url: &Url) -> Option<String> {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.into_owned()))
        .collect();

    ID_PARAMS.iter().find_map(|param| {
        pairs
            .iter()
            .filter(|(k, _)| k == param)
            .map(|(_, v)| sanitize(v))
            .find(|v| !v.is_empty())
    })
}

/// Last purely numeric path segment, e.g. `/search-results-detail/350693`.
fn numeric_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit()))
        .last()
        .map(str::to_string)
}

fn sanitize(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

fn digest(source_url: &str) -> String {
    let hash = Sha256::digest(source_url.trim().as_bytes());
    hash.iter().take(5).map(|b| format!("{:02X}", b)).collect()
}
