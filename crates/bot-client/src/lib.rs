//! Crate `bot-client` — acceso al backend del bot.
//!
//! Expone el trait `BotApi` (la costura que el motor conversacional
//! consume) y su implementación HTTP `HttpBotApi` sobre reqwest. Todas
//! las respuestas del backend llegan envueltas en `{ "data": ... }`.
mod api;
mod errors;
mod http;

pub use api::{BotApi, ConversationOutcome, FeedbackRequest, RemoteValidation};
pub use errors::{ApiError, Result};
pub use http::HttpBotApi;
