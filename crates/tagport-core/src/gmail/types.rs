//! Gmail API wire types.
//!
//! Deserialization targets for the label and message resources, request
//! bodies for label creation and thread/batch modification, and the
//! structured error body Gmail attaches to non-2xx responses.

use serde::{Deserialize, Serialize};

/// A Gmail label.
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: LabelKind,
}

/// Label provenance: Gmail's own labels versus user-created ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    System,
    #[default]
    User,
}

/// Response envelope of `users.labels.list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelList {
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Request body for `users.labels.create`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLabel<'a> {
    pub name: &'a str,
    pub label_list_visibility: &'static str,
    pub message_list_visibility: &'static str,
}

impl<'a> NewLabel<'a> {
    /// A label visible in both the label list and the message list.
    pub fn visible(name: &'a str) -> Self {
        Self {
            name,
            label_list_visibility: "labelShow",
            message_list_visibility: "show",
        }
    }
}

/// Minimal reference to a message returned by `users.messages.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRef {
    pub id: String,
    #[serde(rename = "threadId")]
    pub thread_id: String,
}

/// Response envelope of a `users.messages.list` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageQuery {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
    #[serde(rename = "resultSizeEstimate", default)]
    pub result_size_estimate: Option<u32>,
}

/// The message/thread pair an identity lookup resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMatch {
    pub message_id: String,
    pub thread_id: String,
}

/// Outcome of an exact-match identity lookup.
#[derive(Debug, Clone)]
pub struct MessageLookup {
    /// Provider-reported result count for the query.
    pub result_count: usize,
    /// First (and in practice only) match, if any.
    pub matched: Option<ThreadMatch>,
}

/// Request body for `users.threads.modify`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadModify<'a> {
    pub add_label_ids: &'a [String],
    pub remove_label_ids: &'a [String],
}

/// Request body for `users.messages.batchModify`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchModify<'a> {
    pub ids: &'a [String],
    pub add_label_ids: &'a [String],
    pub remove_label_ids: &'a [String],
}

/// Structured error body attached to non-2xx Gmail responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<ApiErrorPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorPayload {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorItem {
    #[serde(default)]
    pub reason: Option<String>,
}

impl ApiErrorBody {
    /// All reason codes carried by the error body.
    pub fn reasons(&self) -> Vec<&str> {
        self.error
            .as_ref()
            .map(|payload| {
                payload
                    .errors
                    .iter()
                    .filter_map(|item| item.reason.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn message(&self) -> Option<&str> {
        self.error.as_ref().and_then(|payload| payload.message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_label_list() {
        let body = r#"{
            "labels": [
                {"id": "INBOX", "name": "INBOX", "type": "system"},
                {"id": "Label_7", "name": "Front/Important", "type": "user"}
            ]
        }"#;
        let list: LabelList = serde_json::from_str(body).unwrap();
        assert_eq!(list.labels.len(), 2);
        assert_eq!(list.labels[0].kind, LabelKind::System);
        assert_eq!(list.labels[1].kind, LabelKind::User);
        assert_eq!(list.labels[1].name, "Front/Important");
    }

    #[test]
    fn test_deserialize_message_query() {
        let body = r#"{
            "messages": [{"id": "18f2a", "threadId": "18f2b"}],
            "resultSizeEstimate": 1
        }"#;
        let query: MessageQuery = serde_json::from_str(body).unwrap();
        assert_eq!(query.messages[0].thread_id, "18f2b");
        assert_eq!(query.result_size_estimate, Some(1));

        let empty: MessageQuery = serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(empty.messages.is_empty());
    }

    #[test]
    fn test_serialize_thread_modify_camel_case() {
        let add = vec!["Label_1".to_string()];
        let remove = vec!["Label_2".to_string()];
        let body = serde_json::to_value(ThreadModify {
            add_label_ids: &add,
            remove_label_ids: &remove,
        })
        .unwrap();
        assert_eq!(body["addLabelIds"][0], "Label_1");
        assert_eq!(body["removeLabelIds"][0], "Label_2");
    }

    #[test]
    fn test_error_body_reasons() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{
                "error": {
                    "code": 403,
                    "message": "User-rate limit exceeded.",
                    "errors": [{"reason": "userRateLimitExceeded"}]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(body.reasons(), vec!["userRateLimitExceeded"]);
        assert_eq!(body.message(), Some("User-rate limit exceeded."));

        let empty: ApiErrorBody = serde_json::from_str("{}").unwrap();
        assert!(empty.reasons().is_empty());
    }
}
