// Archivo: stubs.rs
// Propósito: implementaciones en memoria para pruebas y wiring rápido.
//
// Incluye un almacén de sesiones en memoria (`InMemoryStore`), un backend
// guionado (`StubBotApi`) y un tracker que registra los eventos que
// recibe (`RecordingTracker`). No son durables; sirven para demos y tests.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use bot_client::{ApiError, BotApi, ConversationOutcome, FeedbackRequest, RemoteValidation,
                 Result as ApiResult};
use bot_domain::{ExpressPayload, ReportPayload, SearchAxis, SearchHit};

use crate::errors::{FlowError, Result};
use crate::storage::SessionStore;

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    m.lock().map_err(|e| FlowError::Storage(format!("mutex poisoned: {:?}", e)))
}

/// Almacén de sesiones en memoria (no durable).
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

/// Backend guionado para pruebas.
///
/// Por defecto todo pasa: las validaciones remotas aprueban, las
/// sugerencias están vacías y los guardados devuelven ids secuenciales.
/// Los flags permiten guionar rechazos y fallas de red.
pub struct StubBotApi {
    /// Rechazos guionados de `validate_field`: (campo, valor) -> mensaje.
    pub rejections: Mutex<HashMap<(String, String), String>>,
    /// Sugerencias remotas por campo.
    pub remote_suggestions: Mutex<HashMap<String, Vec<String>>>,
    /// Resultados a devolver en las búsquedas.
    pub search_results: Mutex<Vec<SearchHit>>,
    /// Si está activo, búsquedas y guardados fallan con error de backend.
    pub fail_remote: AtomicBool,
    /// Contadores de guardados recibidos.
    pub report_saves: AtomicUsize,
    pub express_saves: AtomicUsize,
    /// Últimos payloads recibidos, para aserciones.
    pub last_report: Mutex<Option<ReportPayload>>,
    pub last_express: Mutex<Option<ExpressPayload>>,
}

impl Default for StubBotApi {
    fn default() -> Self {
        Self { rejections: Mutex::new(HashMap::new()),
               remote_suggestions: Mutex::new(HashMap::new()),
               search_results: Mutex::new(Vec::new()),
               fail_remote: AtomicBool::new(false),
               report_saves: AtomicUsize::new(0),
               express_saves: AtomicUsize::new(0),
               last_report: Mutex::new(None),
               last_express: Mutex::new(None) }
    }
}

impl StubBotApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn backend_down(&self) -> Option<ApiError> {
        if self.fail_remote.load(Ordering::SeqCst) {
            Some(ApiError::Backend { status: 503, message: "servicio no disponible".to_string() })
        } else {
            None
        }
    }
}

#[async_trait]
impl BotApi for StubBotApi {
    async fn validate_field(&self, field: &str, value: &str) -> ApiResult<RemoteValidation> {
        if let Some(e) = self.backend_down() {
            return Err(e);
        }
        let guard = self.rejections.lock().unwrap_or_else(|e| e.into_inner());
        match guard.get(&(field.to_string(), value.to_string())) {
            Some(msg) => Ok(RemoteValidation { is_valid: false,
                                               message: Some(msg.clone()),
                                               suggestions: Vec::new() }),
            None => Ok(RemoteValidation { is_valid: true, message: None, suggestions: Vec::new() }),
        }
    }

    async fn suggestions(&self, field: &str, _prefix: &str, _limit: usize) -> ApiResult<Vec<String>> {
        if let Some(e) = self.backend_down() {
            return Err(e);
        }
        let guard = self.remote_suggestions.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.get(field).cloned().unwrap_or_default())
    }

    async fn create_conversation(&self, _session_id: &str) -> ApiResult<ConversationOutcome> {
        if let Some(e) = self.backend_down() {
            return Err(e);
        }
        Ok(ConversationOutcome { conversation_id: "conv-1".to_string() })
    }

    async fn complete_conversation(&self, _conversation_id: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn abandon_conversation(&self, _conversation_id: &str, _last_step: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn suggestion_used(&self, _field: &str, _value: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn submit_feedback(&self, _feedback: &FeedbackRequest) -> ApiResult<()> {
        Ok(())
    }

    async fn create_report(&self, payload: &ReportPayload) -> ApiResult<String> {
        if let Some(e) = self.backend_down() {
            return Err(e);
        }
        let n = self.report_saves.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_report.lock().unwrap_or_else(|e| e.into_inner()) = Some(payload.clone());
        Ok(format!("rep-{}", n))
    }

    async fn create_express_report(&self, payload: &ExpressPayload) -> ApiResult<String> {
        if let Some(e) = self.backend_down() {
            return Err(e);
        }
        let n = self.express_saves.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_express.lock().unwrap_or_else(|e| e.into_inner()) = Some(payload.clone());
        Ok(format!("exp-{}", n))
    }

    async fn search_reports(&self, _axis: SearchAxis, query: &str) -> ApiResult<Vec<SearchHit>> {
        if let Some(e) = self.backend_down() {
            return Err(e);
        }
        let guard = self.search_results.lock().unwrap_or_else(|e| e.into_inner());
        let q = query.to_lowercase();
        Ok(guard.iter()
                .filter(|h| {
                    h.nombre.to_lowercase().contains(&q)
                    || h.apellido.to_lowercase().contains(&q)
                    || h.identificacion.to_lowercase().contains(&q)
                })
                .cloned()
                .collect())
    }
}

/// Tracker que acumula los eventos recibidos, para aserciones.
#[derive(Default)]
pub struct RecordingTracker {
    pub events: Mutex<Vec<String>>,
    /// Si está activo, todos los eventos fallan (para probar que el
    /// flujo los traga).
    pub fail: AtomicBool,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: String) -> ApiResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Backend { status: 500, message: "tracking caído".to_string() });
        }
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
        Ok(())
    }
}

#[async_trait]
impl crate::tracking::TrackingSink for RecordingTracker {
    async fn conversation_started(&self, session_id: &str) -> ApiResult<Option<String>> {
        self.record(format!("started:{}", session_id))?;
        Ok(Some("conv-1".to_string()))
    }

    async fn conversation_completed(&self, conversation_id: &str, report_id: &str) -> ApiResult<()> {
        self.record(format!("completed:{}:{}", conversation_id, report_id))
    }

    async fn conversation_abandoned(&self, conversation_id: &str, last_step: &str) -> ApiResult<()> {
        self.record(format!("abandoned:{}:{}", conversation_id, last_step))
    }

    async fn suggestion_used(&self, field: &str, value: &str) -> ApiResult<()> {
        self.record(format!("suggestion:{}:{}", field, value))
    }

    async fn feedback(&self, conversation_id: &str, rating: u8, _comment: Option<String>) -> ApiResult<()> {
        self.record(format!("feedback:{}:{}", conversation_id, rating))
    }
}
