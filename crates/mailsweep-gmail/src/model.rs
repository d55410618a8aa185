//! Wire types for the Gmail REST API.
//!
//! Every field the server may omit is an `Option`; callers decide how to
//! degrade. These structs are deliberately dumb carriers: interpretation
//! (header lookup, body extraction, categorization) happens in the consumer.

use serde::{Deserialize, Serialize};

/// Detail level requested when fetching a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    /// Full payload including the MIME part tree with body data.
    Full,
    /// Headers, labels, snippet and size, but no body data.
    Metadata,
    /// Ids, labels and size only.
    Minimal,
}

impl MessageFormat {
    /// Query-parameter value for this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Metadata => "metadata",
            Self::Minimal => "minimal",
        }
    }
}

/// One page of a message-list query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListPage {
    /// Message references on this page; absent when the query matched nothing.
    pub messages: Option<Vec<MessageRef>>,
    /// Token for the next page, if any.
    pub next_page_token: Option<String>,
    /// Server-side estimate of the total number of matches.
    pub result_size_estimate: Option<u32>,
}

impl MessageListPage {
    /// The message ids on this page, in server order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.messages
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|m| m.id.clone())
            .collect()
    }
}

/// A message id/thread id pair as returned by list queries.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    /// Message id.
    pub id: String,
    /// Thread the message belongs to.
    pub thread_id: Option<String>,
}

/// A single message at the requested detail level.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message id.
    pub id: String,
    /// Thread the message belongs to.
    pub thread_id: Option<String>,
    /// Raw label ids attached to the message.
    pub label_ids: Option<Vec<String>>,
    /// Short plain-text preview.
    pub snippet: Option<String>,
    /// Root of the MIME part tree; absent at `minimal` format.
    pub payload: Option<MessagePart>,
    /// Server-reported size of the whole message in bytes.
    pub size_estimate: Option<u64>,
    /// Internal timestamp, epoch milliseconds encoded as a decimal string.
    pub internal_date: Option<String>,
}

/// One node of the MIME part tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    /// Part id within the message.
    pub part_id: Option<String>,
    /// MIME type of this part.
    pub mime_type: Option<String>,
    /// Filename, non-empty for attachment parts.
    pub filename: Option<String>,
    /// Headers present on this part.
    pub headers: Option<Vec<Header>>,
    /// Body of this part.
    pub body: Option<PartBody>,
    /// Child parts for multipart types.
    pub parts: Option<Vec<MessagePart>>,
}

/// A single message or part header.
#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// Body payload of a MIME part.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    /// Id used to fetch the attachment data separately.
    pub attachment_id: Option<String>,
    /// URL-safe base64 data, present when the body is inlined.
    pub data: Option<String>,
    /// Size of the decoded body in bytes.
    pub size: Option<u64>,
}

/// A mailbox label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Label id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the label is user-defined or system-owned.
    #[serde(rename = "type", default)]
    pub kind: LabelKind,
}

/// Origin of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    /// Created by the user.
    User,
    /// Owned by the mail system (INBOX, TRASH, CATEGORY_*, ...).
    #[default]
    System,
}

/// Response to a label-list query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelListResponse {
    /// All labels in the mailbox; absent on an empty mailbox.
    pub labels: Option<Vec<Label>>,
}

/// Request body for a bulk label modification.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchModifyRequest {
    /// Messages to modify.
    pub ids: Vec<String>,
    /// Labels to add to every message.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_label_ids: Vec<String>,
    /// Labels to remove from every message.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_label_ids: Vec<String>,
}
