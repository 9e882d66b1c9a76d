// Archivo: file_store.rs
// Propósito: `SessionStore` respaldado en disco. Cada clave se guarda
// como `<dir>/<clave>.json`; la escritura pasa por un archivo temporal
// y rename para no dejar snapshots a medias.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use bot_flow::{FlowError, SessionStore};

/// Variable de entorno con el directorio de almacenamiento.
const ENV_STORAGE_DIR: &str = "BOT_STORAGE_DIR";

/// Errores del almacén en disco.
#[derive(Error, Debug)]
pub enum StoreError {
  /// Error de E/S al leer o escribir un archivo.
  #[error("E/S: {0}")]
  Io(#[from] io::Error),
  /// Falta configuración para ubicar el directorio.
  #[error("Configuración incompleta: {0}")]
  Config(String),
}

/// Almacén clave→valor con un archivo JSON por clave.
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  /// Crea el almacén sobre `dir`, creando el directorio si no existe.
  pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
    let dir = dir.into();
    fs::create_dir_all(&dir)?;
    Ok(Self { dir })
  }

  fn path_for(&self, key: &str) -> PathBuf {
    // Las claves son identificadores fijos del motor; se sanea igual
    // por si llega un separador.
    let safe: String = key.chars()
                          .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
                          .collect();
    self.dir.join(format!("{}.json", safe))
  }

  fn write_atomic(path: &Path, value: &str) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, value)?;
    fs::rename(&tmp, path)?;
    Ok(())
  }
}

impl SessionStore for FileStore {
  fn get(&self, key: &str) -> bot_flow::Result<Option<String>> {
    let path = self.path_for(key);
    match fs::read_to_string(&path) {
      Ok(raw) => Ok(Some(raw)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(FlowError::Storage(format!("no se pudo leer {}: {}", path.display(), e))),
    }
  }

  fn set(&self, key: &str, value: &str) -> bot_flow::Result<()> {
    let path = self.path_for(key);
    Self::write_atomic(&path, value)
        .map_err(|e| FlowError::Storage(format!("no se pudo escribir {}: {}", path.display(), e)))
  }

  fn remove(&self, key: &str) -> bot_flow::Result<()> {
    let path = self.path_for(key);
    match fs::remove_file(&path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(FlowError::Storage(format!("no se pudo eliminar {}: {}", path.display(), e))),
    }
  }
}

/// Construye un `FileStore` leyendo `BOT_STORAGE_DIR` (carga `.env` si
/// existe). Si la variable falta se usa `./.bot-sessions` y se deja
/// registro.
pub fn new_from_env() -> Result<FileStore, StoreError> {
  dotenvy::dotenv().ok();
  let dir = match std::env::var(ENV_STORAGE_DIR) {
    Ok(d) => PathBuf::from(d),
    Err(_) => {
      log::info!("{} no está definida; se usa ./.bot-sessions", ENV_STORAGE_DIR);
      PathBuf::from("./.bot-sessions")
    }
  };
  FileStore::new(dir)
}
