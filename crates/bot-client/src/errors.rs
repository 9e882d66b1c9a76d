// Archivo: errors.rs
// Propósito: errores del cliente HTTP del backend.
use thiserror::Error;

/// Errores al hablar con el backend del bot.
#[derive(Error, Debug)]
pub enum ApiError {
  /// Fallo de transporte (conexión, timeout, TLS).
  #[error("Error de red: {0}")]
  Network(#[from] reqwest::Error),
  /// El backend respondió con un estado de error.
  #[error("El backend respondió {status}: {message}")]
  Backend { status: u16, message: String },
  /// La respuesta no tiene la forma esperada.
  #[error("Respuesta malformada: {0}")]
  Decode(#[from] serde_json::Error),
  /// Falta configuración para construir el cliente.
  #[error("Configuración incompleta: {0}")]
  Config(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
