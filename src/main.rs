mod bot;
mod config;

use std::sync::Arc;

use serenity::Client;
use serenity::all::{
    Context, EventHandler, GatewayIntents, Member, Message, Reaction, ReactionType, Ready,
};
use serenity::async_trait;
use serenity::http::Http;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

use bot::{
    BotEngine, ChatHost, DiscordHost, IncomingMessage, ReminderScheduler, RoleRestorer,
    SnapshotStore,
};
use config::Config;

struct Handler {
    engine: Arc<BotEngine>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.engine.set_bot_user(ready.user.id.get());
        info!("Bot started as {} ({})", ready.user.name, ready.user.id);
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        // Only guild messages carry commands.
        let Some(guild_id) = msg.guild_id else { return };
        self.engine.handle_message(discord_to_incoming(guild_id.get(), &msg)).await;
    }

    async fn guild_member_addition(&self, _ctx: Context, member: Member) {
        self.engine
            .handle_member_joined(member.guild_id.get(), member.user.id.get())
            .await;
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        self.engine
            .handle_reaction(
                reaction.channel_id.get(),
                reaction.message_id.get(),
                &emoji_api_name(&reaction.emoji),
            )
            .await;
    }
}

/// API-name form of an emoji: `name:id` for custom emoji, the literal
/// character otherwise.
fn emoji_api_name(emoji: &ReactionType) -> String {
    match emoji {
        ReactionType::Unicode(s) => s.clone(),
        ReactionType::Custom { name, id, .. } => {
            format!("{}:{}", name.clone().unwrap_or_default(), id)
        }
        _ => String::new(),
    }
}

fn discord_to_incoming(guild_id: u64, msg: &Message) -> IncomingMessage {
    IncomingMessage {
        message_id: msg.id.get(),
        guild_id,
        channel_id: msg.channel_id.get(),
        author_id: msg.author.id.get(),
        author_name: msg.author.name.clone(),
        text: msg.content.clone(),
        mentioned_users: msg.mentions.iter().map(|u| u.id.get()).collect(),
        mentioned_roles: msg.mention_roles.iter().map(|r| r.get()).collect(),
    }
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "rolekeeper.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("rolekeeper.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting rolekeeper...");
    info!("Loaded config from {config_path}");

    let store = match SnapshotStore::open(&config.data_dir.join("snapshots.db")) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Unable to open snapshot store: {e}");
            return;
        }
    };

    let http = Arc::new(Http::new(&config.discord_bot_token));
    let host: Arc<dyn ChatHost> = Arc::new(DiscordHost::new(http));
    let restorer = RoleRestorer::new(store.clone(), host.clone());
    let engine = Arc::new(BotEngine::new(
        host,
        store,
        restorer,
        ReminderScheduler::new(),
        config.votes_channel.clone(),
    ));

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = match Client::builder(&config.discord_bot_token, intents)
        .event_handler(Handler { engine })
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("Unable to create Discord client: {e}");
            return;
        }
    };

    // Close the gateway session on ctrl-c.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("Failed to listen for ctrl-c");
        info!("Kill signal received, closing bot down");
        shard_manager.shutdown_all().await;
    });

    if let Err(e) = client.start().await {
        error!("Gateway connection error: {e}");
    }
}
