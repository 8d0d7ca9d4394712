//! Moderation bot core - role snapshots, chat commands, reminders.

pub mod command;
pub mod discord;
pub mod duration;
pub mod engine;
pub mod host;
pub mod message;
pub mod reminder;
pub mod restore;
pub mod store;


pub use discord::DiscordHost;
pub use engine::BotEngine;
pub use host::ChatHost;
pub use message::IncomingMessage;
pub use reminder::ReminderScheduler;
pub use restore::RoleRestorer;
pub use store::SnapshotStore;
