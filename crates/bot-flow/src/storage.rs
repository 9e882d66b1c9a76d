// Archivo: storage.rs
// Propósito: costura de persistencia de sesiones. El motor solo conoce
// un almacén clave→valor de strings opacos; la implementación durable
// vive en otro crate.
use crate::errors::Result;

/// Clave bajo la que se guarda el snapshot de la conversación.
pub const SESSION_KEY: &str = "chatbot_session";

/// Almacén clave→valor para snapshots de sesión.
///
/// Los valores son strings opacos (JSON serializado por el llamador).
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}
