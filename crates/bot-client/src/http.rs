// Archivo: http.rs
// Propósito: implementación reqwest de `BotApi`. Todas las rutas cuelgan
// de `/bot` y las respuestas llegan como `{ "data": ... }`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use bot_domain::{ExpressPayload, ReportPayload, SearchAxis, SearchHit};

use crate::api::{BotApi, ConversationOutcome, FeedbackRequest, RemoteValidation};
use crate::errors::{ApiError, Result};

const ENV_BASE_URL: &str = "BOT_API_BASE_URL";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Sobre genérico de las respuestas del backend.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
  data: T,
}

#[derive(Debug, Serialize)]
struct ValidateBody<'a> {
  field: &'a str,
  value: &'a str,
}

#[derive(Debug, Serialize)]
struct SuggestionUsedBody<'a> {
  field: &'a str,
  value: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateConversationBody<'a> {
  #[serde(rename = "sessionId")]
  session_id: &'a str,
}

#[derive(Debug, Serialize)]
struct AbandonBody<'a> {
  #[serde(rename = "lastStep")]
  last_step: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedId {
  id: String,
}

/// Cliente HTTP del backend del bot.
pub struct HttpBotApi {
  client: Client,
  base_url: String,
}

impl HttpBotApi {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                                  .build()?;
    let base_url = base_url.into().trim_end_matches('/').to_string();
    Ok(Self { client, base_url })
  }

  /// Construye el cliente leyendo `BOT_API_BASE_URL` (carga `.env` si existe).
  pub fn new_from_env() -> Result<Self> {
    dotenvy::dotenv().ok();
    let base_url = std::env::var(ENV_BASE_URL).map_err(|_| {
                                                ApiError::Config(format!("falta la variable {}", ENV_BASE_URL))
                                              })?;
    Self::new(base_url)
  }

  fn url(&self, path: &str) -> String {
    format!("{}/bot{}", self.base_url, path)
  }

  /// Desenvuelve `{ "data": ... }` verificando primero el estado HTTP.
  async fn unwrap_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
      let message = response.text().await.unwrap_or_default();
      return Err(ApiError::Backend { status: status.as_u16(), message });
    }
    let envelope: Envelope<T> = response.json().await?;
    Ok(envelope.data)
  }

  async fn check_ok(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
      let message = response.text().await.unwrap_or_default();
      return Err(ApiError::Backend { status: status.as_u16(), message });
    }
    Ok(())
  }
}

#[async_trait]
impl BotApi for HttpBotApi {
  async fn validate_field(&self, field: &str, value: &str) -> Result<RemoteValidation> {
    let response = self.client.post(self.url("/validate-field"))
                              .json(&ValidateBody { field, value })
                              .send()
                              .await?;
    Self::unwrap_data(response).await
  }

  async fn suggestions(&self, field: &str, prefix: &str, limit: usize) -> Result<Vec<String>> {
    let response = self.client.get(self.url("/suggestions"))
                              .query(&[("field", field), ("prefix", prefix), ("limit", &limit.to_string())])
                              .send()
                              .await?;
    Self::unwrap_data(response).await
  }

  async fn create_conversation(&self, session_id: &str) -> Result<ConversationOutcome> {
    let response = self.client.post(self.url("/conversations"))
                              .json(&CreateConversationBody { session_id })
                              .send()
                              .await?;
    Self::unwrap_data(response).await
  }

  async fn complete_conversation(&self, conversation_id: &str) -> Result<()> {
    let path = format!("/conversations/{}/complete", conversation_id);
    let response = self.client.post(self.url(&path)).send().await?;
    Self::check_ok(response).await
  }

  async fn abandon_conversation(&self, conversation_id: &str, last_step: &str) -> Result<()> {
    let path = format!("/conversations/{}/abandon", conversation_id);
    let response = self.client.post(self.url(&path))
                              .json(&AbandonBody { last_step })
                              .send()
                              .await?;
    Self::check_ok(response).await
  }

  async fn suggestion_used(&self, field: &str, value: &str) -> Result<()> {
    let response = self.client.post(self.url("/suggestion-used"))
                              .json(&SuggestionUsedBody { field, value })
                              .send()
                              .await?;
    Self::check_ok(response).await
  }

  async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<()> {
    let response = self.client.post(self.url("/feedback"))
                              .json(feedback)
                              .send()
                              .await?;
    Self::check_ok(response).await
  }

  async fn create_report(&self, payload: &ReportPayload) -> Result<String> {
    let response = self.client.post(self.url("/reports"))
                              .json(payload)
                              .send()
                              .await?;
    let created: CreatedId = Self::unwrap_data(response).await?;
    Ok(created.id)
  }

  async fn create_express_report(&self, payload: &ExpressPayload) -> Result<String> {
    let response = self.client.post(self.url("/reports/express"))
                              .json(payload)
                              .send()
                              .await?;
    let created: CreatedId = Self::unwrap_data(response).await?;
    Ok(created.id)
  }

  async fn search_reports(&self, axis: SearchAxis, query: &str) -> Result<Vec<SearchHit>> {
    let response = self.client.get(self.url("/reports/search"))
                              .query(&[("axis", axis.as_str()), ("query", query)])
                              .send()
                              .await?;
    Self::unwrap_data(response).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn las_rutas_cuelgan_de_bot() {
    let api = HttpBotApi::new("http://localhost:3000/").unwrap();
    assert_eq!(api.url("/validate-field"), "http://localhost:3000/bot/validate-field");
  }

  #[test]
  fn el_sobre_expone_data() {
    let raw = r#"{ "data": { "isValid": false, "message": "ocupado" } }"#;
    let envelope: Envelope<RemoteValidation> = serde_json::from_str(raw).unwrap();
    assert!(!envelope.data.is_valid);
    assert_eq!(envelope.data.message.as_deref(), Some("ocupado"));
    assert!(envelope.data.suggestions.is_empty());
  }
}
