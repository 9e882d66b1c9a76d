// Archivo: api.rs
// Propósito: contrato asíncrono con el backend del bot. El motor
// conversacional depende de este trait, nunca del cliente concreto.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use bot_domain::{ExpressPayload, ReportPayload, SearchAxis, SearchHit};

use crate::errors::Result;

/// Resultado de la validación remota de un campo.
///
/// El backend puede rechazar valores que localmente parecen válidos
/// (por ejemplo identificaciones en lista negra) y adjuntar sugerencias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteValidation {
  #[serde(rename = "isValid")]
  pub is_valid: bool,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub suggestions: Vec<String>,
}

/// Resultado de registrar una conversación en el backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationOutcome {
  #[serde(rename = "conversationId")]
  pub conversation_id: String,
}

/// Valoración de la experiencia al cerrar la conversación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
  #[serde(rename = "conversationId")]
  pub conversation_id: String,
  pub rating: u8,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
}

/// Operaciones del backend que el flujo conversacional necesita.
#[async_trait]
pub trait BotApi: Send + Sync {
  /// Valida un campo contra las reglas del backend.
  async fn validate_field(&self, field: &str, value: &str) -> Result<RemoteValidation>;

  /// Sugerencias de autocompletado para un campo.
  async fn suggestions(&self, field: &str, prefix: &str, limit: usize) -> Result<Vec<String>>;

  /// Registra el inicio de una conversación; devuelve el id del backend.
  async fn create_conversation(&self, session_id: &str) -> Result<ConversationOutcome>;

  /// Marca una conversación como completada.
  async fn complete_conversation(&self, conversation_id: &str) -> Result<()>;

  /// Marca una conversación como abandonada, con el estado donde quedó.
  async fn abandon_conversation(&self, conversation_id: &str, last_step: &str) -> Result<()>;

  /// Registra que el usuario aceptó una sugerencia.
  async fn suggestion_used(&self, field: &str, value: &str) -> Result<()>;

  /// Envía la valoración final de la conversación.
  async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<()>;

  /// Guarda un reporte completo; devuelve el id asignado.
  async fn create_report(&self, payload: &ReportPayload) -> Result<String>;

  /// Guarda un reporte express; devuelve el id asignado.
  async fn create_express_report(&self, payload: &ExpressPayload) -> Result<String>;

  /// Busca reportes existentes por el eje indicado.
  async fn search_reports(&self, axis: SearchAxis, query: &str) -> Result<Vec<SearchHit>>;
}
