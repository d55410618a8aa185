//! Fetch orchestration.
//!
//! Per partition the lifecycle is IDLE → FETCHING → {SUCCESS, FAILURE} →
//! IDLE. At most one *foreground* fetch is in flight across the whole
//! coordinator: explicit navigation aborts the previous one at its next
//! suspension point, which also reaps its pending hydration subtasks.
//! Background refreshes and prefetches are independent tasks and survive
//! navigation.
//!
//! Serving is stale-while-revalidate: memory snapshot first, then the
//! durable record, then a loading state, with the network fetch always
//! launched behind whatever was served.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use mailsweep_gmail::{Label, LabelKind, MailSource, MessageFormat};

use crate::cache::{CacheStore, PartitionedCache};
use crate::classify::Categorizer;
use crate::cleanup::is_bank_advertisement;
use crate::email::hydrate::build_email;
use crate::email::{Attachment, CleanupCategory, Email, PartitionKey};
use crate::error::{Error, Result};
use crate::sync::view::{ViewPublisher, ViewState, ViewUpdate};

/// Messages requested per list call.
const LIST_PAGE_SIZE: u32 = 100;

/// Concurrent per-message hydration fetches.
const HYDRATION_PERMITS: usize = 16;

/// Orchestrates fetches and owns both cache layers.
///
/// Cheap to clone; clones share all state. Spawned fetch tasks hold their
/// own clone.
#[derive(Clone)]
pub struct SyncCoordinator {
    pub(crate) source: Arc<dyn MailSource>,
    categorizer: Arc<dyn Categorizer>,
    pub(crate) memory: Arc<PartitionedCache>,
    pub(crate) store: Arc<CacheStore>,
    pub(crate) publisher: Arc<ViewPublisher>,
    labels_tx: watch::Sender<Vec<Label>>,
    foreground: Arc<Mutex<Option<JoinHandle<()>>>>,
    hydration: Arc<Semaphore>,
}

impl SyncCoordinator {
    /// Creates a coordinator over the given source, categorizer and durable
    /// store.
    #[must_use]
    pub fn new(
        source: Arc<dyn MailSource>,
        categorizer: Arc<dyn Categorizer>,
        store: Arc<CacheStore>,
    ) -> Self {
        let (labels_tx, _) = watch::channel(Vec::new());
        Self {
            source,
            categorizer,
            memory: Arc::new(PartitionedCache::new()),
            store,
            publisher: Arc::new(ViewPublisher::new()),
            labels_tx,
            foreground: Arc::new(Mutex::new(None)),
            hydration: Arc::new(Semaphore::new(HYDRATION_PERMITS)),
        }
    }

    /// Subscribes to view updates for the active partition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewUpdate> {
        self.publisher.subscribe()
    }

    /// Subscribes to the mailbox label list.
    #[must_use]
    pub fn subscribe_labels(&self) -> watch::Receiver<Vec<Label>> {
        self.labels_tx.subscribe()
    }

    /// Navigates to (or refreshes) a partition.
    ///
    /// Serves cached data immediately, then fetches. A non-background call
    /// is explicit navigation: it cancels the previous foreground fetch and
    /// makes `key` the active partition. A background refresh leaves the
    /// active partition and any foreground fetch alone.
    pub async fn request_view(&self, key: PartitionKey, is_background_refresh: bool) {
        if is_background_refresh {
            self.serve_cached(&key).await;
            let this = self.clone();
            tokio::spawn(async move {
                this.run_fetch(key).await;
            });
            return;
        }

        let mut foreground = self.foreground.lock().await;
        if let Some(previous) = foreground.take() {
            previous.abort();
        }
        self.publisher.set_active(&key);
        self.serve_cached(&key).await;

        let this = self.clone();
        *foreground = Some(tokio::spawn(async move {
            this.run_fetch(key).await;
        }));
    }

    /// Clears every cache layer and resets the view. Used on sign-out.
    pub async fn sign_out(&self) {
        if let Some(handle) = self.foreground.lock().await.take() {
            handle.abort();
        }
        self.memory.clear().await;
        if let Err(err) = self.store.clear_all().await {
            warn!(%err, "failed to clear durable cache on sign-out");
        }
        self.labels_tx.send_replace(Vec::new());
        self.publisher.set_active(&PartitionKey::Inbox);
        self.publisher
            .publish(&PartitionKey::Inbox, ViewState::Ready(Vec::new()));
    }

    /// Fetches and decodes one attachment's bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the attachment has no id, the remote call fails,
    /// or the payload is not valid base64.
    pub async fn download_attachment(
        &self,
        message_id: &str,
        attachment: &Attachment,
    ) -> Result<Vec<u8>> {
        let attachment_id = attachment
            .attachment_id
            .as_deref()
            .ok_or_else(|| Error::MissingAttachmentId(attachment.filename.clone()))?;
        let body = self
            .source
            .get_attachment(message_id, attachment_id)
            .await
            .map_err(Error::Source)?;
        let data = body.data.unwrap_or_default();
        mailsweep_gmail::encoding::decode_body_data(&data)
            .map_err(|err| Error::AttachmentDecode(err.to_string()))
    }

    /// Step 2 of a view request: publish the best locally-available state.
    async fn serve_cached(&self, key: &PartitionKey) {
        if let Some(snapshot) = self.memory.get(key).await {
            self.publisher.publish(key, ViewState::Ready(snapshot));
        } else {
            let cached = self.store.load_emails(key).await;
            if cached.is_empty() {
                self.publisher.publish(key, ViewState::Loading);
            } else {
                self.memory.put(key.clone(), cached.clone()).await;
                self.publisher.publish(key, ViewState::Ready(cached));
            }
        }

        // Cold start: surface the persisted label list while the first
        // fetch is still out.
        if self.labels_tx.borrow().is_empty() {
            let labels = self.store.load_labels().await;
            if !labels.is_empty() {
                self.labels_tx.send_replace(labels);
            }
        }
    }

    /// The async fetch behind a view request.
    async fn run_fetch(self, key: PartitionKey) {
        debug!(partition = %key, "fetch started");
        let (emails_result, labels_result) =
            tokio::join!(self.fetch_partition_emails(&key), self.source.list_labels());

        // A failed label list never fails the fetch; the stored record is
        // only overwritten on success.
        let labels = match labels_result {
            Ok(labels) => {
                if let Err(err) = self.store.save_labels(&labels).await {
                    warn!(%err, "failed to persist label list");
                }
                self.labels_tx.send_replace(labels.clone());
                labels
            }
            Err(err) => {
                warn!(%err, "label list fetch failed, keeping previous labels");
                self.labels_tx.borrow().clone()
            }
        };

        match emails_result {
            Ok(emails) => {
                self.memory.put(key.clone(), emails.clone()).await;
                if let Err(err) = self.store.save_emails(&key, &emails).await {
                    warn!(partition = %key, %err, "failed to persist snapshot");
                }
                debug!(partition = %key, count = emails.len(), "fetch succeeded");
                self.publisher.publish(&key, ViewState::Ready(emails));

                if key == PartitionKey::Inbox {
                    self.spawn_prefetch(labels);
                }
            }
            Err(err) => {
                // Surface the failure only when there is nothing to show.
                if self.memory.get(&key).await.is_none() {
                    warn!(partition = %key, %err, "fetch failed with no cached fallback");
                    self.publisher
                        .publish(&key, ViewState::Failed(err.to_string()));
                } else {
                    warn!(partition = %key, %err, "fetch failed, keeping stale snapshot");
                }
            }
        }
    }

    /// Lists the partition and hydrates each message concurrently.
    ///
    /// Hydration failures drop the message, never the fetch. Results keep
    /// server list order.
    async fn fetch_partition_emails(
        &self,
        key: &PartitionKey,
    ) -> mailsweep_gmail::Result<Vec<Email>> {
        let (label_ids, query) = key.list_filter();
        let page = self
            .source
            .list_message_ids(LIST_PAGE_SIZE, &label_ids, query)
            .await?;
        let ids = page.ids();

        let mut tasks = JoinSet::new();
        for id in &ids {
            let id = id.clone();
            let source = Arc::clone(&self.source);
            let categorizer = Arc::clone(&self.categorizer);
            let permits = Arc::clone(&self.hydration);
            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return None;
                };
                match source.get_message(&id, MessageFormat::Full).await {
                    Ok(message) => Some(build_email(&message, categorizer.as_ref())),
                    Err(err) => {
                        warn!(message_id = %id, %err, "dropping message that failed to hydrate");
                        None
                    }
                }
            });
        }

        let mut by_id: HashMap<String, Email> = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(email)) => {
                    by_id.insert(email.id.clone(), email);
                }
                Ok(None) => {}
                Err(err) => warn!(%err, "hydration task aborted"),
            }
        }

        let mut emails: Vec<Email> = ids.iter().filter_map(|id| by_id.remove(id)).collect();

        // The bank-ads view shows only messages the ad heuristic matches.
        if *key == PartitionKey::Cleanup(CleanupCategory::BankAds) {
            emails.retain(|e| is_bank_advertisement(&e.sender, &e.subject, &e.snippet));
        }

        Ok(emails)
    }

    /// Step 5: after a successful root fetch, warm every other partition.
    fn spawn_prefetch(&self, labels: Vec<Label>) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut partitions: Vec<PartitionKey> = labels
                .iter()
                .filter(|label| label.kind == LabelKind::User)
                .map(|label| PartitionKey::Label(label.id.clone()))
                .collect();
            partitions.extend(CleanupCategory::ALL.into_iter().map(PartitionKey::Cleanup));

            debug!(count = partitions.len(), "prefetch fan-out started");
            let mut tasks = JoinSet::new();
            for key in partitions {
                let this = this.clone();
                tasks.spawn(async move {
                    this.prefetch_partition(key).await;
                });
            }
            while let Some(joined) = tasks.join_next().await {
                if let Err(err) = joined {
                    warn!(%err, "prefetch task aborted");
                }
            }
        });
    }

    /// Best-effort cache fill for one partition; never touches the view.
    async fn prefetch_partition(&self, key: PartitionKey) {
        match self.fetch_partition_emails(&key).await {
            Ok(emails) => {
                debug!(partition = %key, count = emails.len(), "prefetched");
                if let Err(err) = self.store.save_emails(&key, &emails).await {
                    warn!(partition = %key, %err, "failed to persist prefetched snapshot");
                }
                self.memory.put(key, emails).await;
            }
            Err(err) => {
                debug!(partition = %key, %err, "prefetch failed");
            }
        }
    }
}
