use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const DEFAULT_ICON: &str = "/icon-192x192.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Notification content sent identically to every subscription in a round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<NotificationAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_interaction: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// The document the service worker receives. Defaults are applied here so
/// every recipient sees the same bytes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload<'a> {
    title: &'a str,
    body: &'a str,
    icon: &'a str,
    badge: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
    data: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    actions: Option<&'a [NotificationAction]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    require_interaction: bool,
}

impl NotificationPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.title.is_empty() {
            return Err(PayloadError::MissingField("title"));
        }
        if self.body.is_empty() {
            return Err(PayloadError::MissingField("body"));
        }
        Ok(())
    }

    pub fn to_wire_json(&self) -> serde_json::Result<String> {
        let wire = WirePayload {
            title: &self.title,
            body: &self.body,
            icon: non_empty(self.icon.as_deref()).unwrap_or(DEFAULT_ICON),
            badge: non_empty(self.badge.as_deref()).unwrap_or(DEFAULT_ICON),
            image: self.image.as_deref(),
            data: self
                .data
                .clone()
                .unwrap_or_else(|| JsonValue::Object(Default::default())),
            actions: self.actions.as_deref(),
            tag: self.tag.as_deref(),
            require_interaction: self.require_interaction.unwrap_or(false),
        };
        serde_json::to_string(&wire)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate__should_reject_empty_title() {
        let payload = NotificationPayload::new("", "body");

        assert_eq!(
            payload.validate(),
            Err(PayloadError::MissingField("title"))
        );
    }

    #[test]
    fn validate__should_accept_whitespace_title_and_body() {
        let payload = NotificationPayload::new(" ", " ");

        assert_eq!(payload.validate(), Ok(()));
    }

    #[test]
    fn validate__should_reject_missing_body() {
        let payload: NotificationPayload =
            serde_json::from_value(json!({ "title": "Hello" })).expect("decode payload");

        assert_eq!(payload.validate(), Err(PayloadError::MissingField("body")));
    }

    #[test]
    fn to_wire_json__should_apply_defaults() {
        // Given
        let payload = NotificationPayload::new("Hello", "World");

        // When
        let wire = payload.to_wire_json().expect("serialize");

        // Then
        let wire: JsonValue = serde_json::from_str(&wire).expect("parse wire");
        assert_eq!(
            wire,
            json!({
                "title": "Hello",
                "body": "World",
                "icon": DEFAULT_ICON,
                "badge": DEFAULT_ICON,
                "data": {},
                "requireInteraction": false,
            })
        );
    }

    #[test]
    fn to_wire_json__should_replace_empty_icon_and_badge() {
        // Given
        let mut payload = NotificationPayload::new("Hello", "World");
        payload.icon = Some(String::new());
        payload.badge = Some(String::new());

        // When
        let wire = payload.to_wire_json().expect("serialize");

        // Then
        let wire: JsonValue = serde_json::from_str(&wire).expect("parse wire");
        assert_eq!(wire["icon"], DEFAULT_ICON);
        assert_eq!(wire["badge"], DEFAULT_ICON);
    }

    #[test]
    fn to_wire_json__should_keep_optional_fields() {
        // Given
        let payload: NotificationPayload = serde_json::from_value(json!({
            "title": "Deploy",
            "body": "Build 42 is live",
            "icon": "/deploy.png",
            "image": "/banner.png",
            "data": { "url": "/builds/42" },
            "actions": [{ "action": "open", "title": "Open" }],
            "tag": "deploys",
            "requireInteraction": true,
        }))
        .expect("decode payload");

        // When
        let wire = payload.to_wire_json().expect("serialize");

        // Then
        let wire: JsonValue = serde_json::from_str(&wire).expect("parse wire");
        assert_eq!(wire["icon"], "/deploy.png");
        assert_eq!(wire["badge"], DEFAULT_ICON);
        assert_eq!(wire["image"], "/banner.png");
        assert_eq!(wire["data"]["url"], "/builds/42");
        assert_eq!(wire["actions"][0]["action"], "open");
        assert!(wire["actions"][0].get("icon").is_none());
        assert_eq!(wire["tag"], "deploys");
        assert_eq!(wire["requireInteraction"], true);
    }
}
