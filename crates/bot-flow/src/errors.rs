// Archivo: errors.rs
// Propósito: definir los errores del motor conversacional y el alias
// Result<T> usado por las APIs del crate.
use thiserror::Error;

/// Errores del motor conversacional.
///
/// - `Busy`: la sesión ya está procesando una entrada.
/// - `Storage`: fallo al leer/escribir el snapshot de sesión.
/// - `Api`: fallo del backend que el flujo decidió no tragar.
/// - `Domain`: error de dominio al armar un payload.
/// - `Other`: cualquier otro error.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Ya hay una entrada en proceso para esta sesión.
    #[error("La sesión está ocupada procesando otra entrada")]
    Busy,
    /// Error del almacenamiento de sesiones.
    #[error("Error de almacenamiento: {0}")]
    Storage(String),
    /// Error del backend propagado al flujo.
    #[error("Error del backend: {0}")]
    Api(#[from] bot_client::ApiError),
    /// Error del dominio (payloads, serialización).
    #[error("Error de dominio: {0}")]
    Domain(#[from] bot_domain::DomainError),
    /// Otro tipo de error.
    #[error("Otro: {0}")]
    Other(String),
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, FlowError>;
