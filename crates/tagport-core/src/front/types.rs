//! Front API wire types.
//!
//! Deserialization targets for the conversation, tag, message, and inbox
//! resources, plus the cursor-pagination envelope shared by Front's list
//! endpoints.

use serde::Deserialize;

/// Cursor-pagination envelope wrapping every Front list response.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    #[serde(rename = "_pagination", default)]
    pub pagination: PageCursor,
    #[serde(rename = "_results", default)]
    pub results: Vec<T>,
}

/// Cursor to the next page, absent on the last one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageCursor {
    pub next: Option<String>,
}

/// A Front conversation, the unit of migration.
///
/// `messages` is empty as deserialized from the list endpoint; the client
/// fills it from the per-conversation messages endpoint before handing the
/// item to the mapper. Items are immutable after that point.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceItem {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub status: SourceStatus,
    #[serde(default)]
    pub tags: Vec<SourceTag>,
    /// Creation time as epoch seconds.
    pub created_at: f64,
    #[serde(default)]
    pub messages: Vec<SourceMessage>,
}

/// Conversation status in Front.
///
/// Only `Archived` has migration significance. Statuses this client does
/// not know about decode as `Unknown` and migrate as non-archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Archived,
    Assigned,
    Unassigned,
    Deleted,
    #[serde(other)]
    Unknown,
}

impl SourceStatus {
    pub fn is_archived(&self) -> bool {
        matches!(self, SourceStatus::Archived)
    }
}

/// A tag from the Front taxonomy.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceTag {
    pub id: String,
    pub name: String,
}

/// A single message within a conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceMessage {
    pub id: String,
    /// Channel type, `"email"` for email messages.
    #[serde(rename = "type")]
    pub channel: String,
    #[serde(default)]
    pub is_inbound: Option<bool>,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    /// RFC 5322 Message-ID header. Only email-channel messages carry one.
    #[serde(default)]
    pub message_id: Option<String>,
}

impl SourceMessage {
    pub fn is_email(&self) -> bool {
        self.channel == "email"
    }
}

/// A message participant.
#[derive(Debug, Clone, Deserialize)]
pub struct Recipient {
    pub handle: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// A Front inbox, usable as a run filter.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceInbox {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_conversation_page() {
        let body = r#"{
            "_pagination": {"next": "https://api2.frontapp.com/conversations?page_token=abc"},
            "_results": [
                {
                    "id": "cnv_1",
                    "subject": "Billing question",
                    "status": "archived",
                    "tags": [{"id": "tag_1", "name": "Important"}],
                    "created_at": 1718132400.25
                },
                {
                    "id": "cnv_2",
                    "status": "unassigned",
                    "created_at": 1718132401
                }
            ]
        }"#;

        let page: Paginated<SourceItem> = serde_json::from_str(body).unwrap();
        assert!(page.pagination.next.is_some());
        assert_eq!(page.results.len(), 2);
        assert!(page.results[0].status.is_archived());
        assert_eq!(page.results[0].tags[0].name, "Important");
        assert_eq!(page.results[1].subject, None);
        assert!(page.results[1].messages.is_empty());
    }

    #[test]
    fn test_unknown_status_decodes_as_unknown() {
        let item: SourceItem = serde_json::from_str(
            r#"{"id": "cnv_3", "status": "snoozed", "created_at": 0}"#,
        )
        .unwrap();
        assert_eq!(item.status, SourceStatus::Unknown);
        assert!(!item.status.is_archived());
    }

    #[test]
    fn test_deserialize_message() {
        let message: SourceMessage = serde_json::from_str(
            r#"{
                "id": "msg_1",
                "type": "email",
                "is_inbound": true,
                "recipients": [{"handle": "ada@example.com", "role": "from"}],
                "message_id": "<abc@mail.example.com>"
            }"#,
        )
        .unwrap();
        assert!(message.is_email());
        assert_eq!(message.message_id.as_deref(), Some("<abc@mail.example.com>"));

        let sms: SourceMessage =
            serde_json::from_str(r#"{"id": "msg_2", "type": "sms"}"#).unwrap();
        assert!(!sms.is_email());
        assert!(sms.message_id.is_none());
    }

    #[test]
    fn test_last_page_has_no_cursor() {
        let page: Paginated<SourceInbox> =
            serde_json::from_str(r#"{"_results": [{"id": "inb_1", "name": "Support"}]}"#).unwrap();
        assert!(page.pagination.next.is_none());
        assert_eq!(page.results[0].name, "Support");
    }
}
