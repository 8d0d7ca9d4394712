//! Platform-independent inbound message shape.

/// An inbound guild message, converted from the gateway event in main.rs.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub message_id: u64,
    pub guild_id: u64,
    pub channel_id: u64,
    pub author_id: u64,
    pub author_name: String,
    pub text: String,
    /// Users @-mentioned in the message, in mention order.
    pub mentioned_users: Vec<u64>,
    /// Roles @-mentioned in the message.
    pub mentioned_roles: Vec<u64>,
}

impl IncomingMessage {
    /// Mention markup for the message author.
    pub fn author_mention(&self) -> String {
        format!("<@{}>", self.author_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_mention_markup() {
        let msg = IncomingMessage {
            message_id: 1,
            guild_id: 2,
            channel_id: 3,
            author_id: 923847,
            author_name: "alice".to_string(),
            text: "hello".to_string(),
            mentioned_users: vec![],
            mentioned_roles: vec![],
        };
        assert_eq!(msg.author_mention(), "<@923847>");
    }
}
