//! Domain models for cached emails and mailbox views.

use serde::{Deserialize, Serialize};

/// A fully hydrated email as held in the cache.
///
/// Immutable once built; identity is the `id`. Snapshots are replaced
/// wholesale, so there is no partial-update surface here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Unique message id.
    pub id: String,
    /// Raw sender header value.
    pub sender: String,
    /// Grouping key derived from the sender (organization-ish name).
    pub sender_key: String,
    /// Domain of the sender address, when one could be parsed.
    pub sender_domain: Option<String>,
    /// Assigned category.
    pub category: Category,
    /// Subject line.
    pub subject: String,
    /// Raw date header value.
    pub date: String,
    /// Short preview text.
    pub snippet: String,
    /// Extracted body (HTML preferred over plain text).
    pub body: String,
    /// Attachments found in the part tree.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Whether the message carries the unread marker.
    #[serde(default)]
    pub is_unread: bool,
    /// Whether at least one attachment is worth surfacing to the user.
    #[serde(default)]
    pub has_meaningful_attachment: bool,
    /// Raw label ids from the wire.
    #[serde(default)]
    pub label_ids: Vec<String>,
    /// Whether the message carries the important marker.
    #[serde(default)]
    pub is_important: bool,
}

/// An attachment reference inside an [`Email`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Filename as reported by the part.
    pub filename: String,
    /// MIME type of the attachment.
    pub mime_type: String,
    /// Reported size in bytes.
    pub size: u64,
    /// Id used to fetch the attachment data separately.
    pub attachment_id: Option<String>,
    /// Part id within the message.
    pub part_id: Option<String>,
}

/// Categories an email can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Banking, payments, statements.
    Finance,
    /// Recruiting and applications.
    Jobs,
    /// Orders, deliveries, store offers.
    Shopping,
    /// Tickets, bookings, rides.
    Travel,
    /// Social-network notifications.
    Social,
    /// Developer and infrastructure mail.
    Tech,
    /// Streaming, music, events.
    Entertainment,
    /// Courses and learning platforms.
    Education,
    /// Newsletters and generic marketing.
    Promotions,
    /// Everything else.
    Other,
}

impl Category {
    /// Display name, also the stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finance => "Finance",
            Self::Jobs => "Jobs",
            Self::Shopping => "Shopping",
            Self::Travel => "Travel",
            Self::Social => "Social",
            Self::Tech => "Tech",
            Self::Entertainment => "Entertainment",
            Self::Education => "Education",
            Self::Promotions => "Promotions",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one independently cached mailbox view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartitionKey {
    /// The root inbox, fetched with no label filter.
    Inbox,
    /// A single label's view, by label id.
    Label(String),
    /// One of the cleanup-assistant categories.
    Cleanup(CleanupCategory),
}

impl PartitionKey {
    /// Fixed storage key for the root inbox record.
    pub const INBOX_STORAGE_KEY: &'static str = "default";

    /// Sanitized identifier used to key this partition's durable record.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            Self::Inbox => Self::INBOX_STORAGE_KEY.to_string(),
            Self::Label(id) => sanitize_identifier(id),
            Self::Cleanup(category) => category.as_str().to_string(),
        }
    }

    /// Label filter and free-form query used to list this partition.
    #[must_use]
    pub fn list_filter(&self) -> (Vec<String>, Option<&'static str>) {
        match self {
            Self::Inbox => (Vec::new(), None),
            Self::Label(id) => (vec![id.clone()], None),
            Self::Cleanup(category) => category.list_filter(),
        }
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inbox => f.write_str("inbox"),
            Self::Label(id) => write!(f, "label:{id}"),
            Self::Cleanup(category) => write!(f, "cleanup:{}", category.as_str()),
        }
    }
}

/// Replaces anything outside `[A-Za-z0-9_-]` so the id is safe as a
/// storage key.
fn sanitize_identifier(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Cleanup-assistant categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CleanupCategory {
    /// Promotional mail sitting in the inbox.
    Promotional,
    /// Advertisement mail from finance senders (excluding statements).
    BankAds,
    /// Messages with large attachments.
    Heavy,
}

impl CleanupCategory {
    /// All categories, in aggregation order.
    pub const ALL: [Self; 3] = [Self::Promotional, Self::BankAds, Self::Heavy];

    /// Stable identifier, also the partition storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Promotional => "promotional",
            Self::BankAds => "bank_ads",
            Self::Heavy => "heavy",
        }
    }

    /// Parse from the stable identifier.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "promotional" => Some(Self::Promotional),
            "bank_ads" => Some(Self::BankAds),
            "heavy" => Some(Self::Heavy),
            _ => None,
        }
    }

    /// Label filter and query used to list candidates for this category.
    #[must_use]
    pub fn list_filter(self) -> (Vec<String>, Option<&'static str>) {
        match self {
            Self::Promotional => (
                vec!["CATEGORY_PROMOTIONS".to_string(), "INBOX".to_string()],
                None,
            ),
            Self::BankAds => (vec!["CATEGORY_UPDATES".to_string()], None),
            Self::Heavy => (Vec::new(), Some("larger:5M")),
        }
    }
}

/// Counts and sizes for one cleanup category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupStats {
    /// Number of matching messages.
    pub count: u32,
    /// Total (possibly approximated) size in bytes.
    pub size_bytes: u64,
    /// Number of attachments attributed to the category.
    pub attachment_count: u32,
}

impl CleanupStats {
    /// Component-wise sum.
    #[must_use]
    pub const fn plus(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            size_bytes: self.size_bytes + other.size_bytes,
            attachment_count: self.attachment_count + other.attachment_count,
        }
    }
}

/// Stats for every cleanup category, as persisted in the counter record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupStatsSet {
    /// Promotional mail stats.
    pub promotional: CleanupStats,
    /// Bank-advertisement stats.
    pub bank_ads: CleanupStats,
    /// Heavy-mail stats.
    pub heavy: CleanupStats,
}

impl CleanupStatsSet {
    /// Aggregate sum over all three categories. No cross-category dedup is
    /// attempted; the label filters are disjoint in practice.
    #[must_use]
    pub const fn total(&self) -> CleanupStats {
        self.promotional.plus(self.bank_ads).plus(self.heavy)
    }

    /// Stats for one category.
    #[must_use]
    pub const fn get(&self, category: CleanupCategory) -> CleanupStats {
        match category {
            CleanupCategory::Promotional => self.promotional,
            CleanupCategory::BankAds => self.bank_ads,
            CleanupCategory::Heavy => self.heavy,
        }
    }
}
