//! The remote mail source abstraction consumed by the sync engine.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Label, Message, MessageFormat, MessageListPage, PartBody};

/// Authenticated operations against the remote mailbox.
///
/// [`GmailClient`](crate::GmailClient) is the production implementation;
/// tests substitute in-process fakes. All methods are single-shot: there is
/// no retry inside the source, callers own that policy.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// Lists message ids matching the given label filter and free-form query.
    ///
    /// An empty `label_ids` slice means no label filter.
    async fn list_message_ids(
        &self,
        max_results: u32,
        label_ids: &[String],
        query: Option<&str>,
    ) -> Result<MessageListPage>;

    /// Fetches one message at the requested detail level.
    async fn get_message(&self, id: &str, format: MessageFormat) -> Result<Message>;

    /// Fetches the body of an attachment by its attachment id.
    async fn get_attachment(&self, message_id: &str, attachment_id: &str) -> Result<PartBody>;

    /// Lists all labels in the mailbox.
    async fn list_labels(&self) -> Result<Vec<Label>>;

    /// Moves a single message to the trash.
    async fn trash_message(&self, id: &str) -> Result<()>;

    /// Adds the given labels to every listed message in one call.
    async fn batch_add_labels(&self, ids: &[String], labels_to_add: &[String]) -> Result<()>;
}
