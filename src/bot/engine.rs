//! Bot engine - routes inbound chat events to moderation actions.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use crate::bot::command::Command;
use crate::bot::host::ChatHost;
use crate::bot::message::IncomingMessage;
use crate::bot::reminder::ReminderScheduler;
use crate::bot::restore::RoleRestorer;
use crate::bot::store::{RoleSnapshot, SnapshotStore};

/// The bot engine.
///
/// Holds no state of its own; every inbound event is routed to injected
/// collaborators. Handlers run concurrently on separate gateway tasks and
/// must not assume mutual exclusion, even for the same member or guild;
/// the store's backing database arbitrates write order.
pub struct BotEngine {
    host: Arc<dyn ChatHost>,
    store: Arc<SnapshotStore>,
    restorer: RoleRestorer,
    reminders: ReminderScheduler,
    /// Channel whose reactions the bot echoes.
    votes_channel: String,
    /// Filled in once the gateway session reports its identity.
    bot_user_id: AtomicU64,
}

impl BotEngine {
    pub fn new(
        host: Arc<dyn ChatHost>,
        store: Arc<SnapshotStore>,
        restorer: RoleRestorer,
        reminders: ReminderScheduler,
        votes_channel: String,
    ) -> Self {
        Self {
            host,
            store,
            restorer,
            reminders,
            votes_channel,
            bot_user_id: AtomicU64::new(0),
        }
    }

    /// Record the bot's own user id once the gateway session is ready.
    pub fn set_bot_user(&self, user_id: u64) {
        self.bot_user_id.store(user_id, Ordering::Relaxed);
    }

    /// Handle an inbound guild message.
    pub async fn handle_message(&self, msg: IncomingMessage) {
        if msg.author_id == self.bot_user_id.load(Ordering::Relaxed) {
            return;
        }

        let command = match Command::parse(&msg.text) {
            Some(Ok(command)) => command,
            Some(Err(e)) => {
                warn!("Rejected command from {} ({}): {}", msg.author_name, msg.author_id, e);
                return;
            }
            // Not a command, just chat traffic.
            None => return,
        };

        match command {
            Command::Save => self.save_roles(&msg).await,
            Command::Load => self.load_roles(&msg).await,
            Command::Add => self.add_roles(&msg).await,
            Command::Clear { count } => self.clear_messages(&msg, count).await,
            Command::Remind { seconds, text } => self.remind(&msg, seconds, text).await,
        }
    }

    /// Restore saved roles when a member (re)joins.
    pub async fn handle_member_joined(&self, guild_id: u64, user_id: u64) {
        info!("👋 Member joined: {} in guild {}", user_id, guild_id);
        self.restorer.restore(guild_id, user_id).await;
    }

    /// Echo reactions on messages in the votes channel.
    pub async fn handle_reaction(&self, channel_id: u64, message_id: u64, emoji: &str) {
        match self.host.channel_name(channel_id).await {
            Ok(name) if name == self.votes_channel => {
                info!("Echoing reaction {} on message {}", emoji, message_id);
                if let Err(e) = self.host.add_reaction(channel_id, message_id, emoji).await {
                    warn!("Unable to echo reaction: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Unable to look up channel {}: {}", channel_id, e),
        }
    }

    /// `save`: snapshot each mentioned member's current roles.
    async fn save_roles(&self, msg: &IncomingMessage) {
        for &user_id in &msg.mentioned_users {
            let member = match self.host.member(msg.guild_id, user_id).await {
                Ok(m) => m,
                Err(e) => {
                    warn!("Unable to get member {}: {}", user_id, e);
                    continue;
                }
            };

            let snapshot = RoleSnapshot {
                user_id: member.user_id,
                guild_id: member.guild_id,
                role_ids: member.role_ids,
            };
            match self.store.save(&snapshot) {
                Ok(()) => info!("Saved roles for {}", member.username),
                Err(e) => warn!("Unable to save roles for {}: {}", member.username, e),
            }
        }
    }

    /// `load`: restore each mentioned member's saved roles.
    async fn load_roles(&self, msg: &IncomingMessage) {
        for &user_id in &msg.mentioned_users {
            match self.host.member(msg.guild_id, user_id).await {
                Ok(member) => self.restorer.restore(member.guild_id, member.user_id).await,
                Err(e) => warn!("Unable to get member {}: {}", user_id, e),
            }
        }
    }

    /// `add`: grant every mentioned role to every mentioned member.
    async fn add_roles(&self, msg: &IncomingMessage) {
        let guild_roles = match self.host.guild_roles(msg.guild_id).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!("Unable to get roles in guild {}: {}", msg.guild_id, e);
                return;
            }
        };

        // Mentioned role ids resolved against the guild's definitions.
        let roles: Vec<_> = guild_roles
            .iter()
            .filter(|role| msg.mentioned_roles.contains(&role.id))
            .collect();

        for &user_id in &msg.mentioned_users {
            for role in &roles {
                match self.host.grant_role(msg.guild_id, user_id, role.id).await {
                    Ok(()) => info!("Added role {} to user {}", role.name, user_id),
                    Err(e) => {
                        warn!("Unable to add role {} to user {}: {}", role.name, user_id, e);
                    }
                }
            }
        }
    }

    /// `clear`: bulk-delete the most recent messages in the invoking channel.
    async fn clear_messages(&self, msg: &IncomingMessage, count: u8) {
        let message_ids = match self.host.recent_messages(msg.channel_id, count).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Unable to get messages in channel {}: {}", msg.channel_id, e);
                return;
            }
        };

        if message_ids.is_empty() {
            return;
        }

        match self.host.delete_messages(msg.channel_id, &message_ids).await {
            Ok(()) => {
                info!("🗑️ Deleted {} message(s) in channel {}", message_ids.len(), msg.channel_id);
            }
            Err(e) => warn!("Unable to delete messages in channel {}: {}", msg.channel_id, e),
        }
    }

    /// `!remind`: schedule a delayed notification, gated on kick capability.
    async fn remind(&self, msg: &IncomingMessage, seconds: u64, text: String) {
        match self.host.can_kick(msg.guild_id, msg.channel_id, msg.author_id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    "User {} ({}) lacks kick permission, refusing reminder",
                    msg.author_name, msg.author_id
                );
                return;
            }
            Err(e) => {
                warn!("Unable to resolve permissions for {}: {}", msg.author_id, e);
                return;
            }
        }

        let payload = format!("{} {}", msg.author_mention(), text);
        let host = self.host.clone();
        let channel_id = msg.channel_id;
        let created = self.reminders.schedule(Duration::from_secs(seconds), async move {
            if let Err(e) = host.send_message(channel_id, &payload).await {
                warn!("Unable to deliver reminder: {}", e);
            }
        });

        if created {
            info!("Reminder set for {}s from now in channel {}", seconds, channel_id);
        }
    }
}
