// Archivo: tracking.rs
// Propósito: costura de telemetría conversacional. Los eventos se envían
// en segundo plano y cualquier fallo se registra y se traga: el flujo
// nunca espera ni depende del tracking.
use std::sync::Arc;

use async_trait::async_trait;

use bot_client::{BotApi, FeedbackRequest, Result as ApiResult};

/// Eventos del ciclo de vida de la conversación.
#[async_trait]
pub trait TrackingSink: Send + Sync {
    /// La conversación quedó registrada; devuelve el id del backend.
    async fn conversation_started(&self, session_id: &str) -> ApiResult<Option<String>>;

    /// La conversación terminó con un reporte guardado.
    async fn conversation_completed(&self, conversation_id: &str, report_id: &str) -> ApiResult<()>;

    /// La conversación se abandonó en el paso indicado.
    async fn conversation_abandoned(&self, conversation_id: &str, last_step: &str) -> ApiResult<()>;

    /// El usuario aceptó una sugerencia de autocompletado.
    async fn suggestion_used(&self, field: &str, value: &str) -> ApiResult<()>;

    /// Valoración de la experiencia al cerrar.
    async fn feedback(&self, conversation_id: &str, rating: u8, comment: Option<String>) -> ApiResult<()>;
}

/// Dispara un evento sin bloquear el flujo.
///
/// El future corre en una tarea aparte; si falla solo queda un warning.
pub fn fire_and_forget<F>(evento: &'static str, fut: F)
    where F: std::future::Future<Output = ApiResult<()>> + Send + 'static
{
    tokio::spawn(async move {
        if let Err(e) = fut.await {
            log::warn!("tracking '{}' falló (ignorado): {}", evento, e);
        }
    });
}

/// `TrackingSink` que reenvía cada evento al backend vía `BotApi`.
pub struct ApiTracking {
    api: Arc<dyn BotApi>,
}

impl ApiTracking {
    pub fn new(api: Arc<dyn BotApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl TrackingSink for ApiTracking {
    async fn conversation_started(&self, session_id: &str) -> ApiResult<Option<String>> {
        let outcome = self.api.create_conversation(session_id).await?;
        Ok(Some(outcome.conversation_id))
    }

    async fn conversation_completed(&self, conversation_id: &str, _report_id: &str) -> ApiResult<()> {
        self.api.complete_conversation(conversation_id).await
    }

    async fn conversation_abandoned(&self, conversation_id: &str, last_step: &str) -> ApiResult<()> {
        self.api.abandon_conversation(conversation_id, last_step).await
    }

    async fn suggestion_used(&self, field: &str, value: &str) -> ApiResult<()> {
        self.api.suggestion_used(field, value).await
    }

    async fn feedback(&self, conversation_id: &str, rating: u8, comment: Option<String>) -> ApiResult<()> {
        let feedback = FeedbackRequest { conversation_id: conversation_id.to_string(),
                                         rating,
                                         comment };
        self.api.submit_feedback(&feedback).await
    }
}