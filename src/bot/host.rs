//! Outbound platform calls behind one seam.

use serenity::async_trait;

/// A guild member as fetched live from the platform.
#[derive(Debug, Clone)]
pub struct GuildMember {
    pub user_id: u64,
    pub guild_id: u64,
    pub username: String,
    /// Role ids currently assigned to the member.
    pub role_ids: Vec<u64>,
}

/// A role currently defined in a guild.
#[derive(Debug, Clone)]
pub struct GuildRole {
    pub id: u64,
    pub name: String,
}

/// Every outbound call the engine makes on the chat platform.
///
/// The production implementation wraps the Discord HTTP API; tests inject a
/// recording mock. All calls are plain round trips with no retries.
#[async_trait]
pub trait ChatHost: Send + Sync {
    /// Fetch a member's live guild record.
    async fn member(&self, guild_id: u64, user_id: u64) -> Result<GuildMember, String>;

    /// Fetch the roles currently defined in a guild.
    async fn guild_roles(&self, guild_id: u64) -> Result<Vec<GuildRole>, String>;

    /// Assign a role to a member.
    async fn grant_role(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<(), String>;

    /// Ids of the most recent messages in a channel, newest first.
    async fn recent_messages(&self, channel_id: u64, limit: u8) -> Result<Vec<u64>, String>;

    /// Bulk-delete messages from a channel.
    async fn delete_messages(&self, channel_id: u64, message_ids: &[u64]) -> Result<(), String>;

    /// Send a text message to a channel.
    async fn send_message(&self, channel_id: u64, text: &str) -> Result<(), String>;

    /// Add a reaction to a message.
    async fn add_reaction(&self, channel_id: u64, message_id: u64, emoji: &str)
    -> Result<(), String>;

    /// The display name of a guild channel.
    async fn channel_name(&self, channel_id: u64) -> Result<String, String>;

    /// Whether the user holds kick-level moderation capability in the
    /// given guild/channel context.
    async fn can_kick(&self, guild_id: u64, channel_id: u64, user_id: u64) -> Result<bool, String>;
}
