//! Pure transformation from Front conversations to migration items.
//!
//! No I/O happens here. Tag names are sanitized into Gmail-safe label
//! names, the archive flag is derived from the conversation status, and
//! the cross-system Message-ID is extracted from the first email-channel
//! message. An identifier is never synthesized: conversations without one
//! are routed to a skipped outcome downstream.

use crate::front::{SourceItem, SourceStatus};
use chrono::{DateTime, Utc};

/// Namespace every migrated tag is nested under.
pub const LABEL_NAMESPACE: &str = "Front/";

/// Non-hierarchical prefix applied to tag names that collide with Gmail's
/// reserved label names.
pub const RESERVED_MARKER: &str = "Front-";

/// Status label carried by items archived in Front.
pub const STATUS_ARCHIVED_LABEL: &str = "Front/Status/Archived";

/// Status label carried by items not archived in Front.
pub const STATUS_INBOX_LABEL: &str = "Front/Status/Inbox";

/// Marker character operators prefix to tag names in Front; stripped once.
const TAG_MARKER: char = '!';

/// Gmail's reserved label names. A sanitized name must never equal one of
/// these, case-insensitively.
const RESERVED_NAMES: [&str; 9] = [
    "INBOX", "SPAM", "TRASH", "UNREAD", "STARRED", "IMPORTANT", "SENT", "DRAFT", "CHAT",
];

/// A normalized, target-facing view of one source conversation.
///
/// Created by [`map_item`], consumed within a single run, never persisted.
#[derive(Debug, Clone)]
pub struct MigrationItem {
    pub source_id: String,
    pub subject: Option<String>,
    /// Sanitized label names in first-seen order, deduplicated
    /// case-insensitively.
    pub labels: Vec<String>,
    pub archived: bool,
    /// Cleaned cross-system identifier, unset when no email message
    /// carries one.
    pub message_id: Option<String>,
    /// Participant addresses across all messages. Retained for future
    /// correlation work; not consumed by matching.
    pub participants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Map one source conversation to its migration item.
pub fn map_item(item: &SourceItem) -> MigrationItem {
    let mut labels = Vec::with_capacity(item.tags.len());
    let mut seen = Vec::with_capacity(item.tags.len());
    for tag in &item.tags {
        let label = sanitize_label(&tag.name);
        let key = label.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            labels.push(label);
        }
    }

    let mut participants = Vec::new();
    for message in &item.messages {
        for recipient in &message.recipients {
            if !participants
                .iter()
                .any(|p: &String| p.eq_ignore_ascii_case(&recipient.handle))
            {
                participants.push(recipient.handle.clone());
            }
        }
    }

    MigrationItem {
        source_id: item.id.clone(),
        subject: item.subject.clone(),
        labels,
        // Anything other than the literal archived status, including
        // values this client does not know about, migrates as inbox.
        archived: item.status == SourceStatus::Archived,
        message_id: extract_message_id(item),
        participants,
        created_at: epoch_to_datetime(item.created_at),
    }
}

/// Sanitize one Front tag name into a Gmail label name.
///
/// Rules, in order: path delimiters become hyphens, one leading marker
/// character is stripped, names colliding with Gmail's reserved labels get
/// the non-hierarchical [`RESERVED_MARKER`], everything else is nested
/// under [`LABEL_NAMESPACE`]. Names already carrying either prefix pass
/// through unchanged, which makes the transform idempotent.
pub fn sanitize_label(raw: &str) -> String {
    if raw.starts_with(LABEL_NAMESPACE) || raw.starts_with(RESERVED_MARKER) {
        return raw.to_string();
    }

    let name = raw.replace(['/', '\\'], "-");
    let name = name.strip_prefix(TAG_MARKER).unwrap_or(&name);

    if is_reserved(name) {
        format!("{}{}", RESERVED_MARKER, name)
    } else {
        format!("{}{}", LABEL_NAMESPACE, name)
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// Extract the cross-system identifier from the first email-channel
/// message that carries one, stripping a single angle-bracket pair.
fn extract_message_id(item: &SourceItem) -> Option<String> {
    item.messages
        .iter()
        .filter(|message| message.is_email())
        .find_map(|message| message.message_id.as_deref())
        .map(clean_message_id)
}

fn clean_message_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('<').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('>').unwrap_or(trimmed);
    trimmed.to_string()
}

fn epoch_to_datetime(epoch_secs: f64) -> DateTime<Utc> {
    let secs = epoch_secs.trunc() as i64;
    let nanos = (epoch_secs.fract() * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(secs, nanos).unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front::{Recipient, SourceMessage, SourceTag};

    fn email_message(id: &str, message_id: Option<&str>) -> SourceMessage {
        SourceMessage {
            id: id.to_string(),
            channel: "email".to_string(),
            is_inbound: Some(true),
            recipients: vec![Recipient {
                handle: "ada@example.com".to_string(),
                role: Some("from".to_string()),
            }],
            message_id: message_id.map(str::to_string),
        }
    }

    fn conversation(status: SourceStatus, tags: &[&str], messages: Vec<SourceMessage>) -> SourceItem {
        SourceItem {
            id: "cnv_1".to_string(),
            subject: Some("Billing question".to_string()),
            status,
            tags: tags
                .iter()
                .enumerate()
                .map(|(i, name)| SourceTag {
                    id: format!("tag_{}", i),
                    name: (*name).to_string(),
                })
                .collect(),
            created_at: 1_718_132_400.0,
            messages,
        }
    }

    #[test]
    fn test_sanitize_nests_under_namespace() {
        assert_eq!(sanitize_label("Important"), "Front/Important");
        assert_eq!(sanitize_label("VIP Customers"), "Front/VIP Customers");
    }

    #[test]
    fn test_sanitize_replaces_path_delimiters() {
        assert_eq!(sanitize_label("Billing/Refunds"), "Front/Billing-Refunds");
        assert_eq!(sanitize_label("a\\b"), "Front/a-b");
    }

    #[test]
    fn test_sanitize_strips_leading_marker() {
        assert_eq!(sanitize_label("!Urgent"), "Front/Urgent");
        // Only one marker is stripped.
        assert_eq!(sanitize_label("!!Urgent"), "Front/!Urgent");
    }

    #[test]
    fn test_sanitize_reserved_names_get_marker() {
        assert_eq!(sanitize_label("INBOX"), "Front-INBOX");
        assert_eq!(sanitize_label("inbox"), "Front-inbox");
        assert_eq!(sanitize_label("Trash"), "Front-Trash");
    }

    #[test]
    fn test_sanitized_output_never_reserved() {
        for reserved in RESERVED_NAMES {
            let sanitized = sanitize_label(reserved);
            assert!(!is_reserved(&sanitized), "{} still reserved", sanitized);
            let lowered = sanitize_label(&reserved.to_lowercase());
            assert!(!is_reserved(&lowered), "{} still reserved", lowered);
        }
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for raw in [
            "Important",
            "Billing/Refunds",
            "!Urgent",
            "INBOX",
            "inbox",
            "Front/Important",
            "Front-INBOX",
            "Front/Status/Archived",
        ] {
            let once = sanitize_label(raw);
            assert_eq!(sanitize_label(&once), once, "not idempotent for {}", raw);
        }
    }

    #[test]
    fn test_archived_status_maps_to_flag() {
        let item = conversation(SourceStatus::Archived, &[], vec![]);
        assert!(map_item(&item).archived);

        let item = conversation(SourceStatus::Unassigned, &[], vec![]);
        assert!(!map_item(&item).archived);

        // Unknown future statuses migrate as non-archived.
        let item = conversation(SourceStatus::Unknown, &[], vec![]);
        assert!(!map_item(&item).archived);
    }

    #[test]
    fn test_message_id_extraction_strips_brackets() {
        let item = conversation(
            SourceStatus::Archived,
            &["Important"],
            vec![email_message("msg_1", Some("<abc@mail.example.com>"))],
        );
        let mapped = map_item(&item);
        assert_eq!(mapped.message_id.as_deref(), Some("abc@mail.example.com"));
        assert_eq!(mapped.labels, vec!["Front/Important"]);
    }

    #[test]
    fn test_first_email_message_wins() {
        let mut sms = email_message("msg_0", Some("<sms@nope>"));
        sms.channel = "sms".to_string();
        let item = conversation(
            SourceStatus::Unassigned,
            &[],
            vec![
                sms,
                email_message("msg_1", None),
                email_message("msg_2", Some("<first@mail.example.com>")),
            ],
        );
        // Non-email channels are skipped; among email messages, the first
        // one carrying the header wins.
        assert_eq!(
            map_item(&item).message_id.as_deref(),
            Some("first@mail.example.com")
        );
    }

    #[test]
    fn test_no_email_messages_leaves_identifier_unset() {
        let mut chat = email_message("msg_1", Some("<x@y>"));
        chat.channel = "intercom".to_string();
        let item = conversation(SourceStatus::Unassigned, &[], vec![chat]);
        assert!(map_item(&item).message_id.is_none());
    }

    #[test]
    fn test_labels_dedupe_case_insensitively() {
        let item = conversation(SourceStatus::Unassigned, &["VIP", "vip", "Ops"], vec![]);
        assert_eq!(map_item(&item).labels, vec!["Front/VIP", "Front/Ops"]);
    }

    #[test]
    fn test_participants_collected_across_messages() {
        let mut second = email_message("msg_2", None);
        second.recipients = vec![
            Recipient {
                handle: "ADA@example.com".to_string(),
                role: Some("to".to_string()),
            },
            Recipient {
                handle: "grace@example.com".to_string(),
                role: Some("cc".to_string()),
            },
        ];
        let item = conversation(
            SourceStatus::Unassigned,
            &[],
            vec![email_message("msg_1", None), second],
        );
        assert_eq!(
            map_item(&item).participants,
            vec!["ada@example.com", "grace@example.com"]
        );
    }

    #[test]
    fn test_created_at_conversion() {
        let item = conversation(SourceStatus::Unassigned, &[], vec![]);
        assert_eq!(
            map_item(&item).created_at.timestamp(),
            1_718_132_400_i64
        );
    }
}
