//! Shared test fixtures: an in-process mock mail source and wire-message
//! builders.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mailsweep_gmail::{
    Error, Header, Label, LabelKind, MailSource, Message, MessageFormat, MessageListPage,
    MessagePart, MessageRef, PartBody, Result,
};

/// Configurable in-memory [`MailSource`].
///
/// Listings are keyed by how they are requested: the unfiltered inbox, a
/// joined label filter, or a free-form query. Every call is logged so tests
/// can assert on fan-out behavior.
#[derive(Default)]
pub struct MockSource {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    messages: HashMap<String, Message>,
    inbox_ids: Vec<String>,
    label_ids: HashMap<String, Vec<String>>,
    query_ids: HashMap<String, Vec<String>>,
    labels: Vec<Label>,
    attachments: HashMap<(String, String), String>,
    inbox_delay: Duration,
    fail_lists: bool,
    fail_batch: bool,
    result_estimate: Option<u32>,
    list_log: Vec<(Vec<String>, Option<String>)>,
    batch_log: Vec<Vec<String>>,
    trash_log: Vec<String>,
}

impl MockSource {
    pub fn new() -> Arc<Self> {
        init_tracing();
        Arc::new(Self::default())
    }

    /// Messages served by the unfiltered inbox listing.
    pub fn set_inbox(&self, messages: Vec<Message>) {
        let mut inner = self.inner.lock().unwrap();
        inner.inbox_ids = messages.iter().map(|m| m.id.clone()).collect();
        for message in messages {
            inner.messages.insert(message.id.clone(), message);
        }
    }

    /// Messages served for a label-filtered listing.
    pub fn set_label_filter(&self, label_ids: &[&str], messages: Vec<Message>) {
        let mut inner = self.inner.lock().unwrap();
        inner.label_ids.insert(
            label_ids.join(","),
            messages.iter().map(|m| m.id.clone()).collect(),
        );
        for message in messages {
            inner.messages.insert(message.id.clone(), message);
        }
    }

    /// Messages served for a query-based listing.
    pub fn set_query(&self, query: &str, messages: Vec<Message>) {
        let mut inner = self.inner.lock().unwrap();
        inner.query_ids.insert(
            query.to_string(),
            messages.iter().map(|m| m.id.clone()).collect(),
        );
        for message in messages {
            inner.messages.insert(message.id.clone(), message);
        }
    }

    pub fn set_labels(&self, labels: Vec<Label>) {
        self.inner.lock().unwrap().labels = labels;
    }

    pub fn set_attachment(&self, message_id: &str, attachment_id: &str, data: &str) {
        self.inner.lock().unwrap().attachments.insert(
            (message_id.to_string(), attachment_id.to_string()),
            data.to_string(),
        );
    }

    /// Delay applied to the unfiltered inbox listing only.
    pub fn set_inbox_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().inbox_delay = delay;
    }

    pub fn set_fail_lists(&self, fail: bool) {
        self.inner.lock().unwrap().fail_lists = fail;
    }

    pub fn set_fail_batch(&self, fail: bool) {
        self.inner.lock().unwrap().fail_batch = fail;
    }

    /// Overrides the server-side result estimate returned by listings.
    pub fn set_result_estimate(&self, estimate: Option<u32>) {
        self.inner.lock().unwrap().result_estimate = estimate;
    }

    /// Drops a message body while leaving its id listed, so hydration 404s.
    pub fn forget_message(&self, id: &str) {
        self.inner.lock().unwrap().messages.remove(id);
    }

    pub fn list_log(&self) -> Vec<(Vec<String>, Option<String>)> {
        self.inner.lock().unwrap().list_log.clone()
    }

    pub fn batch_log(&self) -> Vec<Vec<String>> {
        self.inner.lock().unwrap().batch_log.clone()
    }

    pub fn trash_log(&self) -> Vec<String> {
        self.inner.lock().unwrap().trash_log.clone()
    }
}

#[async_trait]
impl MailSource for MockSource {
    async fn list_message_ids(
        &self,
        max_results: u32,
        label_ids: &[String],
        query: Option<&str>,
    ) -> Result<MessageListPage> {
        let (delay, fail, ids, estimate) = {
            let mut inner = self.inner.lock().unwrap();
            inner
                .list_log
                .push((label_ids.to_vec(), query.map(String::from)));

            let ids = if let Some(q) = query {
                inner.query_ids.get(q).cloned().unwrap_or_default()
            } else if label_ids.is_empty() {
                inner.inbox_ids.clone()
            } else {
                inner
                    .label_ids
                    .get(&label_ids.join(","))
                    .cloned()
                    .unwrap_or_default()
            };
            let delay = if label_ids.is_empty() && query.is_none() {
                inner.inbox_delay
            } else {
                Duration::ZERO
            };
            (delay, inner.fail_lists, ids, inner.result_estimate)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(Error::Api {
                status: 500,
                body: "listing unavailable".to_string(),
            });
        }

        let ids: Vec<String> = ids.into_iter().take(max_results as usize).collect();
        let estimate = estimate.or_else(|| u32::try_from(ids.len()).ok());
        Ok(MessageListPage {
            messages: Some(
                ids.into_iter()
                    .map(|id| MessageRef {
                        id,
                        thread_id: None,
                    })
                    .collect(),
            ),
            next_page_token: None,
            result_size_estimate: estimate,
        })
    }

    async fn get_message(&self, id: &str, _format: MessageFormat) -> Result<Message> {
        let inner = self.inner.lock().unwrap();
        inner.messages.get(id).cloned().ok_or_else(|| Error::Api {
            status: 404,
            body: format!("no message {id}"),
        })
    }

    async fn get_attachment(&self, message_id: &str, attachment_id: &str) -> Result<PartBody> {
        let inner = self.inner.lock().unwrap();
        inner
            .attachments
            .get(&(message_id.to_string(), attachment_id.to_string()))
            .map(|data| PartBody {
                attachment_id: Some(attachment_id.to_string()),
                data: Some(data.clone()),
                size: None,
            })
            .ok_or_else(|| Error::Api {
                status: 404,
                body: format!("no attachment {attachment_id}"),
            })
    }

    async fn list_labels(&self) -> Result<Vec<Label>> {
        Ok(self.inner.lock().unwrap().labels.clone())
    }

    async fn trash_message(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_batch {
            return Err(Error::Api {
                status: 500,
                body: "trash unavailable".to_string(),
            });
        }
        inner.trash_log.push(id.to_string());
        Ok(())
    }

    async fn batch_add_labels(&self, ids: &[String], _labels_to_add: &[String]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.batch_log.push(ids.to_vec());
        if inner.fail_batch {
            return Err(Error::Api {
                status: 500,
                body: "batch modify unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Installs a test-friendly subscriber once; RUST_LOG controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds a wire message with the usual headers populated.
pub fn wire_message(id: &str, from: &str, subject: &str, snippet: &str, size: u64) -> Message {
    Message {
        id: id.to_string(),
        thread_id: None,
        label_ids: Some(vec!["INBOX".to_string(), "UNREAD".to_string()]),
        snippet: Some(snippet.to_string()),
        payload: Some(MessagePart {
            headers: Some(vec![
                Header {
                    name: "From".to_string(),
                    value: from.to_string(),
                },
                Header {
                    name: "Subject".to_string(),
                    value: subject.to_string(),
                },
                Header {
                    name: "Date".to_string(),
                    value: "Mon, 2 Feb 2026 10:00:00 +0000".to_string(),
                },
            ]),
            ..MessagePart::default()
        }),
        size_estimate: Some(size),
        internal_date: None,
    }
}

/// A user-defined label.
pub fn user_label(id: &str, name: &str) -> Label {
    Label {
        id: id.to_string(),
        name: name.to_string(),
        kind: LabelKind::User,
    }
}
