// Archivo: message.rs
// Propósito: mensajes de la transcripción y sus contenidos etiquetados.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quién emitió el mensaje.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
  User,
  Bot,
}

/// Opción seleccionable presentada junto a un mensaje del bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageOption {
  pub id: String,
  pub label: String,
  pub value: String,
}

impl MessageOption {
  pub fn new(id: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
    Self { id: id.into(), label: label.into(), value: value.into() }
  }
}

/// Resultado individual de una búsqueda de reportes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
  pub id: String,
  pub nombre: String,
  pub apellido: String,
  pub identificacion: String,
  /// `standard` o `express`, según la colección de origen.
  #[serde(rename = "reportType")]
  pub report_type: String,
}

/// Contenido del mensaje, etiquetado por tipo de despliegue.
///
/// Cada variante lleva únicamente los datos que ese tipo necesita; el
/// texto principal vive en `Message::text`. Las variantes con opciones
/// esperan que la capa de presentación las muestre como botones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
  /// Texto plano sin interacción.
  Text,
  /// El bot espera texto libre del usuario.
  Input,
  /// El bot espera que se elija una de las opciones.
  Options { options: Vec<MessageOption> },
  /// Menú principal (opciones filtradas por permisos).
  Menu { options: Vec<MessageOption> },
  /// Resumen de formulario previo a la confirmación.
  FormSummary { options: Vec<MessageOption> },
  /// Indicador de operación en curso.
  Loading,
  /// Falla recuperable, con opciones de reintento/cancelación.
  Fault { options: Vec<MessageOption> },
  /// Operación completada con éxito.
  Success { options: Vec<MessageOption> },
  /// Aviso informativo sin respuesta esperada.
  Info,
  /// Resultados de búsqueda, ordenados por relevancia.
  SearchResults {
    hits: Vec<SearchHit>,
    options: Vec<MessageOption>,
  },
  /// Eco de la opción elegida por el usuario.
  Choice { option: MessageOption },
}

/// Mensaje inmutable de la transcripción.
///
/// Una vez agregado a la transcripción no se modifica; la transcripción
/// es su única dueña.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
  pub id: Uuid,
  pub sender: Sender,
  pub text: String,
  pub content: MessageContent,
  #[serde(rename = "expectsResponse")]
  pub expects_response: bool,
  pub timestamp: DateTime<Utc>,
}

impl Message {
  /// Crea un mensaje del bot con el contenido indicado.
  pub fn bot(text: impl Into<String>, content: MessageContent, expects_response: bool) -> Self {
    Self { id: Uuid::new_v4(),
           sender: Sender::Bot,
           text: text.into(),
           content,
           expects_response,
           timestamp: Utc::now() }
  }

  /// Crea un mensaje del usuario; si eligió una opción se registra el eco.
  pub fn user(text: impl Into<String>, option: Option<MessageOption>) -> Self {
    let content = match option {
      Some(option) => MessageContent::Choice { option },
      None => MessageContent::Text,
    };
    Self { id: Uuid::new_v4(),
           sender: Sender::User,
           text: text.into(),
           content,
           expects_response: false,
           timestamp: Utc::now() }
  }

  /// Opciones presentadas por este mensaje, si las hay.
  pub fn options(&self) -> Option<&[MessageOption]> {
    match &self.content {
      MessageContent::Options { options }
      | MessageContent::Menu { options }
      | MessageContent::FormSummary { options }
      | MessageContent::Fault { options }
      | MessageContent::Success { options }
      | MessageContent::SearchResults { options, .. } => Some(options.as_slice()),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mensaje_bot_expone_opciones() {
    let opts = vec![MessageOption::new("1", "Sí", "si"), MessageOption::new("2", "No", "no")];
    let m = Message::bot("¿Continuar?", MessageContent::Options { options: opts.clone() }, true);
    assert_eq!(m.sender, Sender::Bot);
    assert_eq!(m.options(), Some(opts.as_slice()));
    assert!(m.expects_response);
  }

  #[test]
  fn mensaje_usuario_registra_eleccion() {
    let opt = MessageOption::new("1", "Buscar", "search");
    let m = Message::user("Buscar", Some(opt.clone()));
    match &m.content {
      MessageContent::Choice { option } => assert_eq!(option, &opt),
      other => panic!("contenido inesperado: {:?}", other),
    }
    assert!(m.options().is_none());
  }

  #[test]
  fn contenido_serializa_con_etiqueta() {
    let m = Message::bot("hola", MessageContent::Info, false);
    let v = serde_json::to_value(&m).unwrap();
    assert_eq!(v["content"]["kind"], "info");
    assert_eq!(v["expectsResponse"], false);
  }
}
