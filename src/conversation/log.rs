use super::types::Message;
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only conversation log, shared between the engine and the UI
#[derive(Debug, Clone)]
pub struct ConversationLog {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn add(&self, message: Message) {
        self.messages.write().push(message);
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn clear(&self) {
        self.messages.write().clear();
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::types::{Message, Role};

    #[test]
    fn test_messages_keep_insertion_order() {
        let log = ConversationLog::new();
        log.add(Message::user("hello"));
        log.add(Message::agent("Hello! I'm your voice AI agent. How can I help you today?"));
        log.add(Message::user("bye"));

        let all = log.get_all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].role, Role::User);
        assert_eq!(all[1].role, Role::Agent);
        assert_eq!(all[2].content, "bye");
    }

    #[test]
    fn test_clear_empties_log() {
        let log = ConversationLog::new();
        log.add(Message::user("hello"));
        assert!(!log.is_empty());

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn test_clones_share_storage() {
        let log = ConversationLog::new();
        let view = log.clone();
        log.add(Message::user("hello"));
        assert_eq!(view.len(), 1);
    }
}
