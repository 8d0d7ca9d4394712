//! Discord API client over serenity's HTTP interface.

use std::sync::Arc;

use serenity::async_trait;
use serenity::builder::{CreateMessage, GetMessages};
use serenity::http::Http;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, EmojiId, GuildId, MessageId, RoleId, UserId};

use crate::bot::host::{ChatHost, GuildMember, GuildRole};

/// Build a `ReactionType` from an emoji in API-name form: custom emoji
/// arrive as `name:id`, everything else is a unicode literal.
fn parse_reaction(emoji: &str) -> ReactionType {
    if let Some((name, id)) = emoji.split_once(':') {
        if let Ok(id) = id.parse::<u64>() {
            return ReactionType::Custom {
                animated: false,
                id: EmojiId::new(id),
                name: Some(name.to_string()),
            };
        }
    }
    ReactionType::Unicode(emoji.to_string())
}

/// `ChatHost` backed by the Discord HTTP API.
pub struct DiscordHost {
    http: Arc<Http>,
}

impl DiscordHost {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatHost for DiscordHost {
    async fn member(&self, guild_id: u64, user_id: u64) -> Result<GuildMember, String> {
        let member = self
            .http
            .get_member(GuildId::new(guild_id), UserId::new(user_id))
            .await
            .map_err(|e| format!("failed to get member {user_id}: {e}"))?;

        Ok(GuildMember {
            user_id: member.user.id.get(),
            guild_id,
            username: member.user.name.clone(),
            role_ids: member.roles.iter().map(|r| r.get()).collect(),
        })
    }

    async fn guild_roles(&self, guild_id: u64) -> Result<Vec<GuildRole>, String> {
        let roles = self
            .http
            .get_guild_roles(GuildId::new(guild_id))
            .await
            .map_err(|e| format!("failed to get roles for guild {guild_id}: {e}"))?;

        Ok(roles
            .into_iter()
            .map(|r| GuildRole { id: r.id.get(), name: r.name })
            .collect())
    }

    async fn grant_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), String> {
        self.http
            .add_member_role(
                GuildId::new(guild_id),
                UserId::new(user_id),
                RoleId::new(role_id),
                None,
            )
            .await
            .map_err(|e| format!("failed to grant role {role_id} to {user_id}: {e}"))
    }

    async fn recent_messages(&self, channel_id: u64, limit: u8) -> Result<Vec<u64>, String> {
        let messages = ChannelId::new(channel_id)
            .messages(self.http.as_ref(), GetMessages::new().limit(limit))
            .await
            .map_err(|e| format!("failed to get messages in channel {channel_id}: {e}"))?;

        Ok(messages.iter().map(|m| m.id.get()).collect())
    }

    async fn delete_messages(&self, channel_id: u64, message_ids: &[u64]) -> Result<(), String> {
        let ids: Vec<MessageId> = message_ids.iter().map(|&id| MessageId::new(id)).collect();
        ChannelId::new(channel_id)
            .delete_messages(self.http.as_ref(), &ids)
            .await
            .map_err(|e| format!("failed to delete messages in channel {channel_id}: {e}"))
    }

    async fn send_message(&self, channel_id: u64, text: &str) -> Result<(), String> {
        ChannelId::new(channel_id)
            .send_message(self.http.as_ref(), CreateMessage::new().content(text))
            .await
            .map(|_| ())
            .map_err(|e| format!("failed to send message to channel {channel_id}: {e}"))
    }

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), String> {
        let reaction = parse_reaction(emoji);
        self.http
            .create_reaction(ChannelId::new(channel_id), MessageId::new(message_id), &reaction)
            .await
            .map_err(|e| format!("failed to add reaction: {e}"))
    }

    async fn channel_name(&self, channel_id: u64) -> Result<String, String> {
        let channel = self
            .http
            .get_channel(ChannelId::new(channel_id))
            .await
            .map_err(|e| format!("failed to get channel {channel_id}: {e}"))?;

        channel
            .guild()
            .map(|c| c.name)
            .ok_or_else(|| format!("channel {channel_id} is not a guild channel"))
    }

    async fn can_kick(&self, guild_id: u64, channel_id: u64, user_id: u64) -> Result<bool, String> {
        // Live permission resolution needs the guild, the channel and the
        // member record; overwrites and role grants since the last event
        // are all reflected here.
        let guild = self
            .http
            .get_guild(GuildId::new(guild_id))
            .await
            .map_err(|e| format!("failed to get guild {guild_id}: {e}"))?;

        let channel = self
            .http
            .get_channel(ChannelId::new(channel_id))
            .await
            .map_err(|e| format!("failed to get channel {channel_id}: {e}"))?
            .guild()
            .ok_or_else(|| format!("channel {channel_id} is not a guild channel"))?;

        let member = self
            .http
            .get_member(GuildId::new(guild_id), UserId::new(user_id))
            .await
            .map_err(|e| format!("failed to get member {user_id}: {e}"))?;

        let permissions = guild.user_permissions_in(&channel, &member);
        Ok(permissions.kick_members())
    }
}
