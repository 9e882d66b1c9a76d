// Archivo: errors.rs
// Propósito: errores del dominio conversacional.
use thiserror::Error;

/// Errores del dominio del bot.
///
/// - `Validation`: un dato no cumple las reglas del campo.
/// - `MissingField`: el borrador no tiene un campo obligatorio al armar
///   el payload de guardado.
/// - `Serialization`: fallo de serde al (de)serializar un tipo del dominio.
#[derive(Error, Debug)]
pub enum DomainError {
  /// Dato inválido según las reglas del campo.
  #[error("Validación: {0}")]
  Validation(String),
  /// Campo obligatorio ausente en el borrador.
  #[error("Campo obligatorio ausente: {0}")]
  MissingField(&'static str),
  /// Error de serialización/deserialización.
  #[error("Serialización: {0}")]
  Serialization(#[from] serde_json::Error),
}
