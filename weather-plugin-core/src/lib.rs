//! Core library for the weather query chat plugin.
//!
//! This crate defines:
//! - The fetcher for the plain-text weather API
//! - The line parser turning that text into fields
//! - The reply formatter
//! - The command handler and the seams a host chat framework plugs into
//!
//! It is used by `weather-plugin-cli`, but any host implementing
//! [`CommandRegistry`] and [`Session`] can drive it.

pub mod config;
pub mod format;
pub mod model;
pub mod parser;
pub mod plugin;
pub mod provider;

pub use config::Config;
pub use format::format_reply;
pub use model::{QueryRequest, RawWeather, WeatherFields};
pub use parser::parse;
pub use plugin::{
    CommandHandler, CommandRegistry, CommandSpec, PluginMetadata, QueryError, Registration,
    Session, WeatherCommand, register,
};
pub use provider::{FetchError, FetcherConfig, SuyanClient, WeatherSource};
