use std::sync::Arc;

use tb_domain::error::Result;

use super::client::DiscordClient;
use crate::runtime::ReplyHandle;

/// The provisional reply of one interaction, addressed by its token.
pub struct InteractionReply {
    client: Arc<DiscordClient>,
    token: String,
    channel_id: Option<String>,
}

impl InteractionReply {
    pub fn new(client: Arc<DiscordClient>, token: impl Into<String>, channel_id: Option<String>) -> Self {
        Self {
            client,
            token: token.into(),
            channel_id,
        }
    }
}

#[async_trait::async_trait]
impl ReplyHandle for InteractionReply {
    async fn edit(&self, content: &str) -> Result<()> {
        self.client.edit_original(&self.token, content).await
    }

    async fn show_working(&self) -> Result<()> {
        match self.channel_id.as_deref() {
            Some(channel) => self.client.trigger_typing(channel).await,
            None => Ok(()),
        }
    }
}
