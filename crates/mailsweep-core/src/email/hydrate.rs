//! Builds [`Email`] values out of wire messages.
//!
//! The wire shape is a loosely-populated MIME tree; everything here is
//! lenient. A malformed part degrades to an empty field, never an error —
//! per-message failures are handled one level up by dropping the message.

use std::sync::LazyLock;

use mailsweep_gmail::{Message, MessagePart, encoding};
use regex::Regex;

use crate::classify::Categorizer;
use crate::email::model::{Attachment, Email};

/// Label id marking unread messages.
const LABEL_UNREAD: &str = "UNREAD";
/// Label id marking important messages.
const LABEL_IMPORTANT: &str = "IMPORTANT";

/// Inline images below this size are noise (signature logos, trackers).
const MEANINGFUL_IMAGE_MIN_BYTES: u64 = 20 * 1024;

// Literal patterns, checked by the tests below.
#[allow(clippy::unwrap_used)]
static ADDRESS_DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@([A-Za-z0-9.-]+)\.[A-Za-z]{2,}").unwrap());

#[allow(clippy::unwrap_used)]
static FULL_DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@([A-Za-z0-9.-]+\.[A-Za-z]{2,})").unwrap());

#[allow(clippy::unwrap_used)]
static DISPLAY_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"?([^<"']+)"?\s*<"#).unwrap());

/// Builds a cacheable [`Email`] from a fully-fetched wire message.
#[must_use]
pub fn build_email(message: &Message, categorizer: &dyn Categorizer) -> Email {
    let payload = message.payload.as_ref();
    let sender = payload
        .and_then(|p| header_value(p, "From"))
        .unwrap_or("Unknown")
        .to_string();
    let subject = payload
        .and_then(|p| header_value(p, "Subject"))
        .unwrap_or("(No Subject)")
        .to_string();
    let date = payload
        .and_then(|p| header_value(p, "Date"))
        .unwrap_or_default()
        .to_string();
    let snippet = message.snippet.clone().unwrap_or_default();
    let label_ids = message.label_ids.clone().unwrap_or_default();

    let category = categorizer.classify(&sender, &subject, &snippet);
    let body = payload.map(extract_body).unwrap_or_default();
    let attachments = payload.map(collect_attachments).unwrap_or_default();
    let has_meaningful_attachment = attachments.iter().any(is_meaningful);

    Email {
        id: message.id.clone(),
        sender_key: derive_sender_key(&sender),
        sender_domain: extract_domain(&sender),
        sender,
        category,
        subject,
        date,
        snippet,
        body,
        attachments,
        is_unread: label_ids.iter().any(|l| l == LABEL_UNREAD),
        is_important: label_ids.iter().any(|l| l == LABEL_IMPORTANT),
        has_meaningful_attachment,
        label_ids,
    }
}

/// Case-insensitive header lookup on a part.
#[must_use]
pub fn header_value<'a>(part: &'a MessagePart, name: &str) -> Option<&'a str> {
    part.headers
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Case-insensitive header lookup on a whole message.
#[must_use]
pub fn message_header<'a>(message: &'a Message, name: &str) -> Option<&'a str> {
    message.payload.as_ref().and_then(|p| header_value(p, name))
}

/// Grouping key for a sender: the first segment of the address domain
/// (before the TLD), capitalized; falls back to the display name, then the
/// raw sender.
#[must_use]
pub fn derive_sender_key(sender: &str) -> String {
    if let Some(captures) = ADDRESS_DOMAIN_RE.captures(sender) {
        let domain = &captures[1];
        let key = domain.split('.').find(|s| !s.is_empty()).unwrap_or(domain);
        return capitalize(key);
    }
    if let Some(captures) = DISPLAY_NAME_RE.captures(sender) {
        return capitalize(captures[1].trim());
    }
    sender.trim().to_string()
}

/// Full domain of the first address found in the sender field.
#[must_use]
pub fn extract_domain(sender: &str) -> Option<String> {
    FULL_DOMAIN_RE
        .captures(sender)
        .map(|captures| captures[1].to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

/// Extracts a displayable body from the part tree.
///
/// A part's own inline data wins; otherwise HTML is preferred over plain
/// text, then children are searched depth-first.
#[must_use]
pub fn extract_body(part: &MessagePart) -> String {
    if let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref()) {
        return encoding::decode_body_text(data);
    }

    let Some(parts) = part.parts.as_deref() else {
        return String::new();
    };

    for wanted in ["text/html", "text/plain"] {
        if let Some(data) = parts
            .iter()
            .find(|p| p.mime_type.as_deref() == Some(wanted))
            .and_then(|p| p.body.as_ref())
            .and_then(|b| b.data.as_deref())
        {
            return encoding::decode_body_text(data);
        }
    }

    for sub in parts {
        let body = extract_body(sub);
        if !body.is_empty() {
            return body;
        }
    }

    String::new()
}

/// Collects every attachment part in the tree.
#[must_use]
pub fn collect_attachments(part: &MessagePart) -> Vec<Attachment> {
    let mut attachments = Vec::new();
    collect_attachments_into(part, &mut attachments);
    attachments
}

fn collect_attachments_into(part: &MessagePart, out: &mut Vec<Attachment>) {
    let filename = part.filename.as_deref().unwrap_or_default();
    if !filename.is_empty()
        && let Some(body) = part.body.as_ref()
        && body.attachment_id.is_some()
    {
        out.push(Attachment {
            filename: filename.to_string(),
            mime_type: part
                .mime_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            size: body.size.unwrap_or(0),
            attachment_id: body.attachment_id.clone(),
            part_id: part.part_id.clone(),
        });
    }

    for sub in part.parts.as_deref().unwrap_or_default() {
        collect_attachments_into(sub, out);
    }
}

/// Small inline images do not count as a real attachment.
fn is_meaningful(attachment: &Attachment) -> bool {
    let small_image = attachment.mime_type.starts_with("image/")
        && attachment.size < MEANINGFUL_IMAGE_MIN_BYTES;
    !attachment.filename.is_empty() && !small_image
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::classify::RuleClassifier;
    use crate::email::model::Category;
    use mailsweep_gmail::{Header, PartBody};

    fn part(mime: &str, data: Option<&str>) -> MessagePart {
        MessagePart {
            mime_type: Some(mime.to_string()),
            body: data.map(|d| PartBody {
                data: Some(d.to_string()),
                ..PartBody::default()
            }),
            ..MessagePart::default()
        }
    }

    #[test]
    fn sender_key_prefers_domain_segment() {
        assert_eq!(derive_sender_key("Amazon <no-reply@amazon.in>"), "Amazon");
        assert_eq!(derive_sender_key("updates@mail.linkedin.com"), "Mail");
    }

    #[test]
    fn sender_key_falls_back_to_display_name() {
        assert_eq!(derive_sender_key("John Doe <john@localhost>"), "John Doe");
        assert_eq!(derive_sender_key("  bare sender  "), "bare sender");
    }

    #[test]
    fn domain_extraction() {
        assert_eq!(
            extract_domain("Acme <billing@mail.acme.com>"),
            Some("mail.acme.com".to_string())
        );
        assert_eq!(extract_domain("no address here"), None);
    }

    #[test]
    fn body_prefers_html_over_plain() {
        // "plain" / "<b>html</b>" in url-safe base64
        let root = MessagePart {
            mime_type: Some("multipart/alternative".to_string()),
            parts: Some(vec![
                part("text/plain", Some("cGxhaW4=")),
                part("text/html", Some("PGI-aHRtbDwvYj4=")),
            ]),
            ..MessagePart::default()
        };
        assert_eq!(extract_body(&root), "<b>html</b>");
    }

    #[test]
    fn body_recurses_into_nested_parts() {
        let nested = MessagePart {
            mime_type: Some("multipart/mixed".to_string()),
            parts: Some(vec![MessagePart {
                mime_type: Some("multipart/alternative".to_string()),
                parts: Some(vec![part("text/plain", Some("cGxhaW4="))]),
                ..MessagePart::default()
            }]),
            ..MessagePart::default()
        };
        assert_eq!(extract_body(&nested), "plain");
    }

    #[test]
    fn attachments_collected_recursively() {
        let root = MessagePart {
            parts: Some(vec![
                part("text/plain", Some("cGxhaW4=")),
                MessagePart {
                    mime_type: Some("application/pdf".to_string()),
                    filename: Some("invoice.pdf".to_string()),
                    part_id: Some("2".to_string()),
                    body: Some(PartBody {
                        attachment_id: Some("att-1".to_string()),
                        size: Some(90_000),
                        data: None,
                    }),
                    ..MessagePart::default()
                },
            ]),
            ..MessagePart::default()
        };
        let attachments = collect_attachments(&root);
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename, "invoice.pdf");
        assert_eq!(attachments[0].size, 90_000);
    }

    #[test]
    fn tiny_inline_images_are_not_meaningful() {
        let logo = Attachment {
            filename: "logo.png".to_string(),
            mime_type: "image/png".to_string(),
            size: 4_096,
            attachment_id: Some("a".to_string()),
            part_id: None,
        };
        let pdf = Attachment {
            filename: "report.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 4_096,
            attachment_id: Some("b".to_string()),
            part_id: None,
        };
        assert!(!is_meaningful(&logo));
        assert!(is_meaningful(&pdf));
    }

    #[test]
    fn build_email_derives_flags_and_category() {
        let message = Message {
            id: "m1".to_string(),
            thread_id: None,
            label_ids: Some(vec![
                "INBOX".to_string(),
                "UNREAD".to_string(),
                "IMPORTANT".to_string(),
            ]),
            snippet: Some("your order has been placed".to_string()),
            payload: Some(MessagePart {
                headers: Some(vec![
                    Header {
                        name: "From".to_string(),
                        value: "Amazon <order-update@amazon.in>".to_string(),
                    },
                    Header {
                        name: "subject".to_string(),
                        value: "Order confirmation".to_string(),
                    },
                ]),
                ..MessagePart::default()
            }),
            size_estimate: Some(2_048),
            internal_date: None,
        };
        let email = build_email(&message, &RuleClassifier::new());
        assert_eq!(email.id, "m1");
        assert_eq!(email.sender_key, "Amazon");
        assert!(email.is_unread);
        assert!(email.is_important);
        assert_eq!(email.category, Category::Shopping);
        assert_eq!(email.subject, "Order confirmation");
    }
}
