//! Crate `bot-flow` — motor de la conversación.
//!
//! Orquesta los tres flujos (reporte completo, reporte express y
//! búsqueda) sobre una máquina de estados con tabla de adyacencia
//! estática. Mantiene la transcripción, el historial para retroceder,
//! los borradores y el snapshot persistible de la sesión; habla con el
//! backend a través de las costuras `BotApi` y `TrackingSink`.
mod engine;
mod errors;
mod flows;
mod intent;
mod session;
mod states;
mod storage;
mod suggestions;
mod tracking;
mod transcript;

pub mod stubs;

pub use engine::{ChatEngine, EngineConfig};
pub use errors::{FlowError, Result};
pub use intent::Intent;
pub use session::SessionSnapshot;
pub use states::{FlowKind, FlowState};
pub use storage::{SessionStore, SESSION_KEY};
pub use suggestions::{SuggestionProvider, LIMITE_DEFECTO, LIMITE_MAXIMO};
pub use tracking::{fire_and_forget, ApiTracking, TrackingSink};
pub use transcript::Transcript;
