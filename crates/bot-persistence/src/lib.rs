//! Implementación durable del trait `SessionStore`.
//! Guarda cada clave como un archivo JSON dentro de un directorio
//! configurable; pensada para un proceso único (sin locking entre
//! procesos).

mod file_store;

pub use file_store::{new_from_env, FileStore, StoreError};
