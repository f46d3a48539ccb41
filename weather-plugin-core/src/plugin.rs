//! Glue between the weather pipeline and a host chat framework.
//!
//! The host owns dispatch and delivery. This module describes the command the
//! host should bind ([`Registration`]) and handles one message at a time
//! through the [`Session`] the host passes in.

use std::{fmt::Debug, panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    format::format_reply,
    model::QueryRequest,
    parser::parse,
    provider::{FetchError, WeatherSource},
};

/// Reply sent when the pipeline itself blew up.
pub const UNHANDLED_REPLY: &str = "天气查询过程中出现异常，请稍后重试。";

/// Descriptive data the host shows for the plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
}

impl Default for PluginMetadata {
    fn default() -> Self {
        Self {
            name: "天气查询插件".to_string(),
            description: "根据城市名称查询实时天气信息".to_string(),
            version: "1.0.0".to_string(),
            author: "YourName".to_string(),
        }
    }
}

/// Trigger words for the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub keyword: String,
    pub aliases: Vec<String>,
}

impl Default for CommandSpec {
    fn default() -> Self {
        Self {
            keyword: "天气".to_string(),
            aliases: vec!["tq".to_string(), "weather".to_string()],
        }
    }
}

impl CommandSpec {
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.keyword.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether a chat line invokes this command.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.trim_start();
        self.triggers().any(|t| text.starts_with(t))
    }

    /// Removes every trigger word from the message and trims what is left.
    ///
    /// The keyword goes first, then each alias in order.
    pub fn strip_triggers(&self, text: &str) -> String {
        let mut rest = text.trim().to_string();
        for trigger in self.triggers() {
            rest = rest.replace(trigger, "");
        }
        rest.trim().to_string()
    }

    pub fn request(&self, text: &str) -> Result<QueryRequest, QueryError> {
        QueryRequest::new(self.strip_triggers(text)).ok_or(QueryError::EmptyInput)
    }
}

/// Everything a host needs to bind the command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub metadata: PluginMetadata,
    pub command: CommandSpec,
}

/// Failure of a single query. `Display` is the text sent to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("请问您要查询哪个城市的天气呢？")]
    EmptyInput,

    #[error("查询失败: {0}")]
    Fetch(#[from] FetchError),

    #[error("抱歉，未能解析{city}的天气数据。")]
    Unparseable { city: String },
}

/// The two capabilities taken from the host's message session.
#[async_trait]
pub trait Session: Send {
    fn text(&self) -> &str;

    async fn send(&mut self, reply: String);
}

#[async_trait]
pub trait CommandHandler: Send + Sync + Debug {
    /// Must send exactly one reply through `session`.
    async fn handle(&self, session: &mut dyn Session);
}

/// Host side of registration.
pub trait CommandRegistry {
    fn register(&mut self, registration: Registration, handler: Arc<dyn CommandHandler>);
}

/// Registers the weather command with `registry`.
pub fn register<R>(registry: &mut R, registration: Registration, source: Arc<dyn WeatherSource>)
where
    R: CommandRegistry + ?Sized,
{
    let handler = WeatherCommand::new(registration.command.clone(), source);
    info!(
        plugin = %registration.metadata.name,
        version = %registration.metadata.version,
        keyword = %registration.command.keyword,
        "registering command"
    );
    registry.register(registration, Arc::new(handler));
}

/// Fetch, parse and format for one chat message.
#[derive(Debug, Clone)]
pub struct WeatherCommand {
    command: CommandSpec,
    source: Arc<dyn WeatherSource>,
}

impl WeatherCommand {
    pub fn new(command: CommandSpec, source: Arc<dyn WeatherSource>) -> Self {
        Self { command, source }
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    /// Runs the pipeline for an already extracted city.
    pub async fn query(&self, request: &QueryRequest) -> Result<String, QueryError> {
        let city = request.city();
        let raw = self.source.fetch(city).await?;

        let fields = parse(&raw.body).ok_or_else(|| QueryError::Unparseable { city: city.to_string() })?;
        debug!(city, fields = fields.len(), "weather fields recovered");

        Ok(format_reply(city, &fields))
    }

    /// Maps a message to its reply text; every branch yields one reply.
    pub async fn reply_to(&self, text: &str) -> String {
        let request = match self.command.request(text) {
            Ok(request) => request,
            Err(err) => return err.to_string(),
        };

        match AssertUnwindSafe(self.query(&request)).catch_unwind().await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                warn!(city = request.city(), error = ?err, "weather query failed");
                err.to_string()
            }
            Err(_) => {
                error!(city = request.city(), "weather query panicked");
                UNHANDLED_REPLY.to_string()
            }
        }
    }
}

#[async_trait]
impl CommandHandler for WeatherCommand {
    async fn handle(&self, session: &mut dyn Session) {
        let text = session.text().to_string();
        let reply = self.reply_to(&text).await;
        session.send(reply).await;
    }
}
