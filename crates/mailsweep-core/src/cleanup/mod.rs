//! Cleanup-assistant statistics.
//!
//! Three category heuristics, each deliberately approximate:
//!
//! - **promotional** — capped list query; sizes estimated at a flat
//!   per-email constant, bodies are never fetched.
//! - **heavy** — size-filtered query; each hit's reported size is summed
//!   and counted as exactly one attachment.
//! - **bank ads** — updates-label query, then a coarse two-part check:
//!   finance-entity sender AND ad-phrase content. This is independent of
//!   (and cruder than) the main categorizer on purpose.

use std::sync::{Arc, LazyLock};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use mailsweep_gmail::{MailSource, Message, MessageFormat};

use crate::email::hydrate::message_header;
use crate::email::{CleanupCategory, CleanupStats, CleanupStatsSet};
use crate::error::Result;

/// Cap on every cleanup list query.
const LIST_CAP: u32 = 500;

/// Flat per-email size used for promotional mail. An approximation: real
/// sizes are not fetched for this category.
const PROMO_EMAIL_SIZE_ESTIMATE: u64 = 75 * 1024;

/// Concurrent metadata fetches.
const METADATA_PERMITS: usize = 16;

/// Sender keywords identifying finance entities for the bank-ad check.
const FINANCE_SENDER_KEYWORDS: &[&str] = &[
    "bank",
    "hdfc",
    "icici",
    "sbi",
    "axis",
    "kotak",
    "pnb",
    "card",
    "credit",
    "loan",
    "finance",
    "insurance",
    "wealth",
    "invest",
];

/// Ad phrases, loaded once from the bundled resource on first use.
static AD_KEYWORDS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    include_str!("../../assets/ad_keywords.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
});

/// Whether an email from a finance sender is an advertisement.
///
/// Both legs must match: a finance-entity sender and ad-phrase content.
/// Statements and transaction alerts fail the second leg.
#[must_use]
pub fn is_bank_advertisement(sender: &str, subject: &str, snippet: &str) -> bool {
    let sender = sender.to_lowercase();
    if !FINANCE_SENDER_KEYWORDS.iter().any(|k| sender.contains(k)) {
        return false;
    }
    let content = format!("{} {}", subject.to_lowercase(), snippet.to_lowercase());
    AD_KEYWORDS.iter().any(|k| content.contains(k))
}

/// Computes per-category cleanup statistics against the remote source.
///
/// Cheap to clone; clones share the fan-out limiter.
#[derive(Clone)]
pub struct CleanupStatsAggregator {
    source: Arc<dyn MailSource>,
    metadata_permits: Arc<Semaphore>,
}

impl CleanupStatsAggregator {
    /// Creates an aggregator over the given source.
    #[must_use]
    pub fn new(source: Arc<dyn MailSource>) -> Self {
        Self {
            source,
            metadata_permits: Arc::new(Semaphore::new(METADATA_PERMITS)),
        }
    }

    /// Computes statistics for one category.
    ///
    /// # Errors
    ///
    /// Returns an error when the list query itself fails. Per-message
    /// metadata failures drop the message and are logged.
    pub async fn compute_stats(&self, category: CleanupCategory) -> Result<CleanupStats> {
        match category {
            CleanupCategory::Promotional => self.promotional_stats().await,
            CleanupCategory::BankAds => self.bank_ad_stats().await,
            CleanupCategory::Heavy => self.heavy_stats().await,
        }
    }

    /// Computes all three categories. No cross-category dedup is attempted.
    ///
    /// # Errors
    ///
    /// Returns the first category-level failure.
    pub async fn compute_all(&self) -> Result<CleanupStatsSet> {
        let (promotional, bank_ads, heavy) = tokio::try_join!(
            self.promotional_stats(),
            self.bank_ad_stats(),
            self.heavy_stats(),
        )?;
        Ok(CleanupStatsSet {
            promotional,
            bank_ads,
            heavy,
        })
    }

    async fn promotional_stats(&self) -> Result<CleanupStats> {
        let (label_ids, query) = CleanupCategory::Promotional.list_filter();
        let page = self
            .source
            .list_message_ids(LIST_CAP, &label_ids, query)
            .await?;

        let fetched = u32::try_from(page.ids().len()).unwrap_or(u32::MAX);
        // Under the cap the fetched count is exact; at the cap fall back to
        // the server's estimate of the full result set.
        let count = if fetched >= LIST_CAP {
            page.result_size_estimate.unwrap_or(fetched)
        } else {
            fetched
        };

        Ok(CleanupStats {
            count,
            size_bytes: u64::from(count) * PROMO_EMAIL_SIZE_ESTIMATE,
            attachment_count: 0,
        })
    }

    async fn heavy_stats(&self) -> Result<CleanupStats> {
        let (label_ids, query) = CleanupCategory::Heavy.list_filter();
        let page = self
            .source
            .list_message_ids(LIST_CAP, &label_ids, query)
            .await?;

        let hits = self.fetch_each(page.ids(), MessageFormat::Minimal).await;
        let count = u32::try_from(hits.len()).unwrap_or(u32::MAX);
        let size_bytes = hits.iter().filter_map(|m| m.size_estimate).sum();

        Ok(CleanupStats {
            count,
            size_bytes,
            // One attachment per hit; the size filter already implies it.
            attachment_count: count,
        })
    }

    async fn bank_ad_stats(&self) -> Result<CleanupStats> {
        let (label_ids, query) = CleanupCategory::BankAds.list_filter();
        let page = self
            .source
            .list_message_ids(LIST_CAP, &label_ids, query)
            .await?;

        let candidates = self.fetch_each(page.ids(), MessageFormat::Metadata).await;
        let mut stats = CleanupStats::default();
        for message in &candidates {
            let sender = message_header(message, "From").unwrap_or_default();
            let subject = message_header(message, "Subject").unwrap_or_default();
            let snippet = message.snippet.as_deref().unwrap_or_default();
            if is_bank_advertisement(sender, subject, snippet) {
                stats.count += 1;
                stats.size_bytes += message.size_estimate.unwrap_or(0);
            }
        }

        debug!(
            candidates = candidates.len(),
            matched = stats.count,
            "bank-ad scan finished"
        );
        Ok(stats)
    }

    /// Fetches each id at the given detail level concurrently, dropping
    /// failures.
    async fn fetch_each(&self, ids: Vec<String>, format: MessageFormat) -> Vec<Message> {
        let mut tasks = JoinSet::new();
        for id in ids {
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&self.metadata_permits);
            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return None;
                };
                match source.get_message(&id, format).await {
                    Ok(message) => Some(message),
                    Err(err) => {
                        warn!(message_id = %id, %err, "dropping cleanup candidate");
                        None
                    }
                }
            });
        }

        let mut messages = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => {}
                Err(err) => warn!(%err, "cleanup metadata task aborted"),
            }
        }
        messages
    }
}
