//! In-process stand-in for a chat framework.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use weather_plugin_core::{CommandHandler, CommandRegistry, Registration, Session};

/// Session over a single chat line; replies are collected in order.
#[derive(Debug)]
pub struct LineSession {
    text: String,
    replies: Vec<String>,
}

impl LineSession {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), replies: Vec::new() }
    }

    pub fn into_replies(self) -> Vec<String> {
        self.replies
    }
}

#[async_trait]
impl Session for LineSession {
    fn text(&self) -> &str {
        &self.text
    }

    async fn send(&mut self, reply: String) {
        self.replies.push(reply);
    }
}

/// Routes chat lines to registered commands by keyword or alias.
#[derive(Debug, Default)]
pub struct LocalHost {
    commands: Vec<(Registration, Arc<dyn CommandHandler>)>,
}

impl CommandRegistry for LocalHost {
    fn register(&mut self, registration: Registration, handler: Arc<dyn CommandHandler>) {
        self.commands.push((registration, handler));
    }
}

impl LocalHost {
    pub fn registrations(&self) -> impl Iterator<Item = &Registration> {
        self.commands.iter().map(|(r, _)| r)
    }

    /// Returns `None` when no command claims the line.
    pub async fn dispatch(&self, line: &str) -> Option<Vec<String>> {
        let (registration, handler) =
            self.commands.iter().find(|(r, _)| r.command.matches(line))?;
        debug!(command = %registration.command.keyword, "dispatching chat line");

        let mut session = LineSession::new(line);
        handler.handle(&mut session).await;
        Some(session.into_replies())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Echo;

    #[async_trait]
    impl CommandHandler for Echo {
        async fn handle(&self, session: &mut dyn Session) {
            let reply = format!("echo: {}", session.text());
            session.send(reply).await;
        }
    }

    fn host() -> LocalHost {
        let mut host = LocalHost::default();
        host.register(Registration::default(), Arc::new(Echo));
        host
    }

    #[tokio::test]
    async fn dispatches_on_keyword_and_alias() {
        let host = host();
        assert_eq!(host.dispatch("天气 北京").await, Some(vec!["echo: 天气 北京".to_string()]));
        assert_eq!(host.dispatch("tq 上海").await, Some(vec!["echo: tq 上海".to_string()]));
    }

    #[tokio::test]
    async fn ignores_unclaimed_lines() {
        assert_eq!(host().dispatch("hello").await, None);
    }

    #[test]
    fn lists_registrations() {
        assert_eq!(host().registrations().count(), 1);
    }
}
