use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::settings::Settings;

/// One fetched page: the source URL and its markup, or why it failed.
pub struct Fetched {
    pub url: String,
    pub markup: Result<String>,
}

pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        let start = Instant::now();
        let text = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Bad status from {}", url))?
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;
        info!("Fetched {} ({} bytes in {}ms)", url, text.len(), start.elapsed().as_millis());
        Ok(text)
    }
}

/// Fetch every URL with at most `concurrency` requests in flight. Results come
/// back in input order.
pub async fn fetch_all(fetcher: Arc<Fetcher>, urls: Vec<String>, concurrency: usize) -> Vec<Fetched> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let total = urls.len();

    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})") {
        pb.set_style(style.progress_chars("=> "));
    }

    let (tx, mut rx) = tokio::sync::mpsc::channel::<(usize, Fetched)>(total.max(1));

    for (idx, url) in urls.into_iter().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let markup = match sem.acquire().await {
                Ok(_permit) => fetcher.fetch(&url).await,
                Err(e) => Err(e.into()),
            };
            if let Err(e) = &markup {
                warn!("Fetch failed for {}: {:#}", url, e);
            }
            let _ = tx.send((idx, Fetched { url, markup })).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut results = Vec::with_capacity(total);
    while let Some(item) = rx.recv().await {
        results.push(item);
        pb.inc(1);
    }
    pb.finish_and_clear();

    results.sort_by_key(|(idx, _)| *idx);
    results.into_iter().map(|(_, f)| f).collect()
}
