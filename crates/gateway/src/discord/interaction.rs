//! Wire shapes for Discord interactions (the subset this bot reads and
//! writes).

use serde::{Deserialize, Serialize};

use crate::runtime::{Acknowledgement, Issuer};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Inbound
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const INTERACTION_PING: u8 = 1;
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;

/// Option type for a free-text string argument.
pub const OPTION_STRING: u8 = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub application_id: String,
    /// Interaction token; authorises follow-up edits for 15 minutes.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub data: Option<CommandData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Set for commands invoked in a guild.
    #[serde(default)]
    pub member: Option<Member>,
    /// Set for commands invoked in a DM.
    #[serde(default)]
    pub user: Option<User>,
}

impl Interaction {
    /// The invoking user, from `member.user` in guilds or `user` in DMs.
    pub fn issuer(&self) -> Option<Issuer> {
        let (user, nick) = match &self.member {
            Some(Member {
                user: Some(user),
                nick,
            }) => (user, nick.as_deref()),
            _ => (self.user.as_ref()?, None),
        };
        let display_name = nick
            .or(user.global_name.as_deref())
            .unwrap_or(&user.username)
            .to_owned();
        Some(Issuer {
            id: user.id.clone(),
            display_name,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

impl CommandData {
    /// The string value of option `name`, if present.
    pub fn string_option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_ref())
            .and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub nick: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outbound
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const CALLBACK_PONG: u8 = 1;
pub const CALLBACK_CHANNEL_MESSAGE: u8 = 4;
pub const CALLBACK_DEFERRED_CHANNEL_MESSAGE: u8 = 5;

/// Message flag: only the invoking user sees the message.
pub const FLAG_EPHEMERAL: u64 = 1 << 6;

/// Body of the synchronous HTTP response to an interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageData>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: CALLBACK_PONG,
            data: None,
        }
    }

    /// Map the pipeline's acknowledgment onto a callback type.
    pub fn from_ack(ack: &Acknowledgement) -> Self {
        match ack {
            Acknowledgement::Placeholder(text) => Self {
                kind: CALLBACK_CHANNEL_MESSAGE,
                data: Some(MessageData::content(text)),
            },
            Acknowledgement::Deferred => Self {
                kind: CALLBACK_DEFERRED_CHANNEL_MESSAGE,
                data: None,
            },
        }
    }

    /// An immediate reply only the invoking user can see.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        let mut data = MessageData::content(text);
        data.flags = Some(FLAG_EPHEMERAL);
        Self {
            kind: CALLBACK_CHANNEL_MESSAGE,
            data: Some(data),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
}

impl MessageData {
    /// Message text with mentions disabled.
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            flags: None,
            allowed_mentions: Some(AllowedMentions::none()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
}

impl AllowedMentions {
    pub fn none() -> Self {
        Self { parse: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn guild_member_nick_wins() {
        let i: Interaction = serde_json::from_value(json!({
            "type": 2,
            "member": {"nick": "Neko", "user": {"id": "42", "username": "cat", "global_name": "Cat"}},
        }))
        .unwrap();
        let issuer = i.issuer().unwrap();
        assert_eq!(issuer.id, "42");
        assert_eq!(issuer.display_name, "Neko");
    }

    #[test]
    fn dm_user_falls_back_to_username() {
        let i: Interaction = serde_json::from_value(json!({
            "type": 2,
            "user": {"id": "7", "username": "solo"},
        }))
        .unwrap();
        assert_eq!(i.issuer().unwrap().display_name, "solo");
    }

    #[test]
    fn no_user_means_no_issuer() {
        let i: Interaction = serde_json::from_value(json!({"type": 1})).unwrap();
        assert!(i.issuer().is_none());
    }

    #[test]
    fn string_option_ignores_other_types() {
        let data: CommandData = serde_json::from_value(json!({
            "name": "ai",
            "options": [
                {"name": "count", "type": 4, "value": 3},
                {"name": "prompt", "type": 3, "value": "how many cats?"}
            ]
        }))
        .unwrap();
        assert_eq!(data.string_option("prompt"), Some("how many cats?"));
        assert_eq!(data.string_option("count"), None);
        assert_eq!(data.string_option("missing"), None);
    }

    #[test]
    fn acknowledgements_map_to_callback_types() {
        let placeholder = InteractionResponse::from_ack(&Acknowledgement::Placeholder("wait".into()));
        assert_eq!(
            serde_json::to_value(&placeholder).unwrap(),
            json!({"type": 4, "data": {"content": "wait", "allowed_mentions": {"parse": []}}})
        );
        let deferred = InteractionResponse::from_ack(&Acknowledgement::Deferred);
        assert_eq!(serde_json::to_value(&deferred).unwrap(), json!({"type": 5}));
        assert_eq!(serde_json::to_value(InteractionResponse::pong()).unwrap(), json!({"type": 1}));
    }

    #[test]
    fn ephemeral_sets_flag_64() {
        let resp = InteractionResponse::ephemeral("nope");
        assert_eq!(resp.data.unwrap().flags, Some(64));
    }
}
