//! Per-message entry point shared by every gateway.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chatcfg_core::{Settings, StoreError};
use chatcfg_rules::CommandProcessor;
use tracing::{debug, info};

use crate::access::AccessPolicy;
use crate::traits::ChatMessage;

/// Decides sender privilege and runs accepted lines through the processor.
pub struct MessageHandler {
    processor: Arc<CommandProcessor>,
    access: RwLock<Arc<AccessPolicy>>,
    post_responses: AtomicBool,
}

impl MessageHandler {
    pub fn new(processor: Arc<CommandProcessor>, settings: &Settings) -> Self {
        Self {
            processor,
            access: RwLock::new(Arc::new(AccessPolicy::from_settings(settings))),
            post_responses: AtomicBool::new(settings.post_responses_in_chat),
        }
    }

    pub fn processor(&self) -> &Arc<CommandProcessor> {
        &self.processor
    }

    /// Rebuild the access policy from a new settings snapshot.
    pub fn reload(&self, settings: &Settings) {
        let policy = Arc::new(AccessPolicy::from_settings(settings));
        *self.access.write().expect("access policy lock poisoned") = policy;
        self.post_responses
            .store(settings.post_responses_in_chat, Ordering::Relaxed);
    }

    pub fn reload_listener(self: &Arc<Self>) -> impl Fn(&Settings) + Send + Sync + 'static {
        let handler = Arc::clone(self);
        move |settings: &Settings| handler.reload(settings)
    }

    pub fn access(&self) -> Arc<AccessPolicy> {
        Arc::clone(&self.access.read().expect("access policy lock poisoned"))
    }

    /// Whether replies should be posted back to the chat channel.
    pub fn post_responses(&self) -> bool {
        self.post_responses.load(Ordering::Relaxed)
    }

    /// Validate and execute one chat message, returning the reply if any.
    pub fn handle(&self, message: &ChatMessage) -> Result<Option<String>, StoreError> {
        debug!(user = %message.user, text = %message.text, "chat message");
        let privileged = self.access().is_privileged(&message.user);

        let rules = self.processor.rules();
        if !rules.is_valid_command(&message.text, privileged) {
            return Ok(None);
        }
        info!("{} invoked `{}`", message.user, message.text.trim());
        // Same snapshot for validation and execution.
        self.processor
            .execute_with(&rules, &message.text, privileged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatcfg_storage::MemoryStore;

    fn settings() -> Settings {
        Settings {
            allowed_users: vec!["Mod".to_string()],
            restrict_commands_to_allowed_users: true,
            commands: vec![vec!["boost".to_string(), "!:Volume = 100".to_string()]],
            command_get_regex: r"^(?P<property>\w+)$".to_string(),
            command_set_regex: r"^(?P<property>\w+)\s*=\s*(?P<value>.+)$".to_string(),
            command_prefix: "!".to_string(),
            command_delimiter: ":".to_string(),
            command_reset: "reset".to_string(),
            post_responses_in_chat: true,
            ..Settings::default()
        }
    }

    fn handler() -> (Arc<MemoryStore>, Arc<MessageHandler>) {
        let store = Arc::new(MemoryStore::default());
        let processor = Arc::new(CommandProcessor::new(&settings(), store.clone()).unwrap());
        (store, Arc::new(MessageHandler::new(processor, &settings())))
    }

    #[test]
    fn allowed_user_can_issue_directives() {
        let (_, h) = handler();
        let reply = h.handle(&ChatMessage::new("mod", "!:Volume = 7")).unwrap();
        assert_eq!(reply.as_deref(), Some("Set Volume = 7."));
    }

    #[test]
    fn other_users_only_get_aliases() {
        let (store, h) = handler();
        assert_eq!(h.handle(&ChatMessage::new("viewer", "!:Volume = 7")).unwrap(), None);
        assert_eq!(
            h.handle(&ChatMessage::new("viewer", "BOOST")).unwrap().as_deref(),
            Some("Set Volume = 100.")
        );
        assert_eq!(store.snapshot(), "Volume=100\n");
    }

    #[test]
    fn reload_updates_allow_list_and_reply_flag() {
        let (_, h) = handler();
        let listener = h.reload_listener();

        let mut next = settings();
        next.allowed_users = vec!["viewer".to_string()];
        next.post_responses_in_chat = false;
        listener(&next);

        assert!(h.access().is_privileged("viewer"));
        assert!(!h.access().is_privileged("mod"));
        assert!(!h.post_responses());
    }

    #[test]
    fn invalid_lines_are_silent() {
        let (store, h) = handler();
        assert_eq!(h.handle(&ChatMessage::new("mod", "héllo")).unwrap(), None);
        assert_eq!(h.handle(&ChatMessage::new("mod", "   ")).unwrap(), None);
        assert_eq!(store.snapshot(), "");
    }
}
