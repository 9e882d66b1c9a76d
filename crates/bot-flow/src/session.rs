// Archivo: session.rs
// Propósito: snapshot persistible de la conversación. Guarda la sesión,
// el estado actual, los borradores y la cola reciente de mensajes; al
// cargar se descartan snapshots con más de 24 horas.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use bot_domain::{ExpressDraft, Message, ReportDraft, SearchDraft, Session};

use crate::errors::{FlowError, Result};
use crate::states::FlowState;
use crate::storage::{SessionStore, SESSION_KEY};

/// Horas tras las cuales un snapshot guardado se considera viejo.
const EXPIRACION_HORAS: i64 = 24;

/// Estado completo que se persiste entre ejecuciones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: Session,
    pub state: FlowState,
    #[serde(rename = "reportDraft")]
    pub report_draft: ReportDraft,
    #[serde(rename = "expressDraft")]
    pub express_draft: ExpressDraft,
    #[serde(rename = "searchDraft")]
    pub search_draft: SearchDraft,
    pub messages: Vec<Message>,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Persiste el snapshot bajo la clave fija de sesión.
    pub fn save(&self, store: &dyn SessionStore) -> Result<()> {
        let raw = serde_json::to_string(self).map_err(|e| FlowError::Storage(e.to_string()))?;
        store.set(SESSION_KEY, &raw)
    }

    /// Carga el snapshot guardado, si existe y sigue vigente.
    ///
    /// Un snapshot ilegible o con más de 24 horas se elimina y se parte
    /// de cero; nunca interrumpe el arranque.
    pub fn load(store: &dyn SessionStore) -> Result<Option<SessionSnapshot>> {
        let Some(raw) = store.get(SESSION_KEY)? else {
            return Ok(None);
        };
        let snapshot: SessionSnapshot = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("snapshot de sesión ilegible, se descarta: {}", e);
                store.remove(SESSION_KEY)?;
                return Ok(None);
            }
        };
        if Utc::now() - snapshot.saved_at > Duration::hours(EXPIRACION_HORAS) {
            log::info!("snapshot de sesión expirado (> {} h), se descarta", EXPIRACION_HORAS);
            store.remove(SESSION_KEY)?;
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    /// Borra el snapshot guardado (conversación completada o reiniciada).
    pub fn discard(store: &dyn SessionStore) -> Result<()> {
        store.remove(SESSION_KEY)
    }
}
