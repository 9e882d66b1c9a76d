//! Crate `bot-domain` — tipos puros del dominio conversacional.
//!
//! Define los mensajes de la conversación (con contenido etiquetado por
//! tipo de despliegue), los borradores acumulativos de cada flujo
//! (reporte completo, reporte express, búsqueda), la sesión del usuario
//! y los validadores de campo. No realiza I/O: todo lo que hay aquí es
//! construible y verificable en memoria.
mod catalog;
mod drafts;
mod errors;
mod message;
mod session;
mod validators;

pub use catalog::{nacionalidad_options, prefijo_options, NACIONALIDADES, PREFIJOS_PAIS};
pub use drafts::{EvaluationAnswer, ExpressDraft, ExpressPayload, Genero, IdType, Phone, Recommendation,
                 ReportDraft, ReportPayload, SearchAxis, SearchDraft, AuthorInfo, EVALUACIONES,
                 PREGUNTAS_EXPRESS};
pub use errors::DomainError;
pub use message::{Message, MessageContent, MessageOption, SearchHit, Sender};
pub use session::{Role, Session, UserInfo};
pub use validators::{capitalize_words, normalize_comment, validate_cedula, validate_country_code,
                     validate_email, validate_identification, validate_name, validate_passport,
                     validate_phone_number, validate_rating, validate_rut, ValidationResult};
