// Pruebas del almacén en disco: ida y vuelta, borrado y claves ausentes.
use std::path::PathBuf;

use bot_flow::SessionStore;
use bot_persistence::FileStore;

fn temp_dir() -> PathBuf {
  std::env::temp_dir().join(format!("bot-store-{}", uuid::Uuid::new_v4()))
}

#[test]
fn guarda_y_recupera_una_clave() {
  let dir = temp_dir();
  let store = FileStore::new(&dir).unwrap();

  assert_eq!(store.get("chatbot_session").unwrap(), None);
  store.set("chatbot_session", r#"{"state":"menu"}"#).unwrap();
  assert_eq!(store.get("chatbot_session").unwrap().as_deref(), Some(r#"{"state":"menu"}"#));

  std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn sobrescribe_el_valor_anterior() {
  let dir = temp_dir();
  let store = FileStore::new(&dir).unwrap();

  store.set("clave", "uno").unwrap();
  store.set("clave", "dos").unwrap();
  assert_eq!(store.get("clave").unwrap().as_deref(), Some("dos"));

  std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn eliminar_es_idempotente() {
  let dir = temp_dir();
  let store = FileStore::new(&dir).unwrap();

  store.set("clave", "valor").unwrap();
  store.remove("clave").unwrap();
  assert_eq!(store.get("clave").unwrap(), None);
  // Borrar lo que no existe no es error.
  store.remove("clave").unwrap();

  std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn las_claves_con_separadores_no_escapan_del_directorio() {
  let dir = temp_dir();
  let store = FileStore::new(&dir).unwrap();

  store.set("../fuera", "valor").unwrap();
  assert_eq!(store.get("../fuera").unwrap().as_deref(), Some("valor"));
  assert!(!dir.parent().unwrap().join("fuera.json").exists());

  std::fs::remove_dir_all(&dir).ok();
}
