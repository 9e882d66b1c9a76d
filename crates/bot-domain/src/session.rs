// Archivo: session.rs
// Propósito: identidad del usuario conectado y sesión conversacional.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rol del usuario autenticado. Determina qué operaciones del menú
/// están disponibles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Admin,
  Owner,
  Usuario,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Owner => "owner",
      Self::Usuario => "usuario",
    }
  }
}

/// Datos mínimos del usuario autenticado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
  pub uid: String,
  pub email: String,
  pub role: Role,
}

/// Sesión de la conversación.
///
/// `session_id` identifica la conversación local; `backend_session_id`
/// llega al registrar la conversación en el backend y puede faltar si
/// ese registro falló (la conversación continúa igual).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  #[serde(rename = "sessionId")]
  pub session_id: Uuid,
  #[serde(rename = "backendSessionId")]
  pub backend_session_id: Option<String>,
  #[serde(rename = "lastInteraction")]
  pub last_interaction: DateTime<Utc>,
  pub user: Option<UserInfo>,
}

impl Session {
  /// Sesión nueva, anónima hasta que se asocie un usuario.
  pub fn new(user: Option<UserInfo>) -> Self {
    Self { session_id: Uuid::new_v4(),
           backend_session_id: None,
           last_interaction: Utc::now(),
           user }
  }

  pub fn is_authenticated(&self) -> bool {
    self.user.is_some()
  }

  /// Crear reportes requiere rol admin u owner.
  pub fn can_create_reports(&self) -> bool {
    matches!(self.user.as_ref().map(|u| u.role), Some(Role::Admin) | Some(Role::Owner))
  }

  /// Buscar requiere estar autenticado.
  pub fn can_search(&self) -> bool {
    self.is_authenticated()
  }

  /// Registra actividad (reinicia el reloj de expiración).
  pub fn touch(&mut self) {
    self.last_interaction = Utc::now();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn usuario(role: Role) -> UserInfo {
    UserInfo { uid: "u-1".to_string(), email: "u@mail.com".to_string(), role }
  }

  #[test]
  fn anonimo_no_puede_buscar_ni_crear() {
    let s = Session::new(None);
    assert!(!s.is_authenticated());
    assert!(!s.can_search());
    assert!(!s.can_create_reports());
  }

  #[test]
  fn usuario_comun_busca_pero_no_crea() {
    let s = Session::new(Some(usuario(Role::Usuario)));
    assert!(s.can_search());
    assert!(!s.can_create_reports());
  }

  #[test]
  fn owner_y_admin_pueden_crear() {
    assert!(Session::new(Some(usuario(Role::Owner))).can_create_reports());
    assert!(Session::new(Some(usuario(Role::Admin))).can_create_reports());
  }
}
