// Archivo: drafts.rs
// Propósito: borradores acumulativos de cada flujo y los payloads finales
// que se envían al backend al confirmar. Los borradores viven solo en
// memoria; los payloads fijan el contrato JSON (creadoPor, version, etc.).
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::session::UserInfo;

/// Tipo de documento de identidad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
  Rut,
  Cedula,
  Pasaporte,
}

impl IdType {
  /// Interpreta el valor elegido en un menú de opciones.
  pub fn from_value(value: &str) -> Option<Self> {
    match value {
      "rut" => Some(Self::Rut),
      "cedula" => Some(Self::Cedula),
      "pasaporte" => Some(Self::Pasaporte),
      _ => None,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::Rut => "RUT",
      Self::Cedula => "Cédula",
      Self::Pasaporte => "Pasaporte",
    }
  }
}

/// Género declarado del arrendatario reportado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genero {
  Masculino,
  Femenino,
  Transgenero,
  Otro,
  SinDatos,
}

impl Genero {
  pub fn from_value(value: &str) -> Option<Self> {
    match value {
      "masculino" => Some(Self::Masculino),
      "femenino" => Some(Self::Femenino),
      "transgenero" => Some(Self::Transgenero),
      "otro" => Some(Self::Otro),
      "sin_datos" => Some(Self::SinDatos),
      _ => None,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::Masculino => "Masculino",
      Self::Femenino => "Femenino",
      Self::Transgenero => "Transgénero",
      Self::Otro => "Otro",
      Self::SinDatos => "Prefiero no decirlo",
    }
  }
}

/// Respuesta a una pregunta de evaluación del reporte completo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationAnswer {
  Si,
  No,
  AVeces,
  SinDatos,
}

impl EvaluationAnswer {
  pub fn from_value(value: &str) -> Option<Self> {
    match value {
      "si" => Some(Self::Si),
      "no" => Some(Self::No),
      "a_veces" => Some(Self::AVeces),
      "sin_datos" => Some(Self::SinDatos),
      _ => None,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::Si => "Sí",
      Self::No => "No",
      Self::AVeces => "A veces",
      Self::SinDatos => "Sin datos",
    }
  }
}

/// Recomendación final sobre el arrendatario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
  SiMucho,
  Si,
  ACriterio,
  No,
  NoParaNada,
}

impl Recommendation {
  pub fn from_value(value: &str) -> Option<Self> {
    match value {
      "si_mucho" => Some(Self::SiMucho),
      "si" => Some(Self::Si),
      "a_criterio" => Some(Self::ACriterio),
      "no" => Some(Self::No),
      "no_para_nada" => Some(Self::NoParaNada),
      _ => None,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::SiMucho => "Sí, mucho",
      Self::Si => "Sí",
      Self::ACriterio => "A criterio de cada uno",
      Self::No => "No",
      Self::NoParaNada => "No, para nada",
    }
  }
}

/// Teléfono en dos partes, tal como lo guarda el backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
  #[serde(rename = "countryCode")]
  pub country_code: String,
  pub number: String,
}

/// Identidad del autor adjunta a cada payload guardado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInfo {
  pub uid: String,
  pub email: String,
  pub role: String,
}

/// Preguntas de evaluación del reporte completo, en el orden en que se
/// hacen. La clave es la que persiste el backend.
pub const EVALUACIONES: &[(&str, &str)] = &[
  ("paga_puntual", "¿Pagaba el arriendo puntualmente?"),
  ("habitacionLimpiaYOrdenada", "¿Mantenía su habitación limpia y ordenada?"),
  ("tranquilaYOrdenada", "¿Era una persona tranquila y ordenada?"),
  ("buenasRelacionesPasajeros", "¿Mantenía buenas relaciones con los demás pasajeros?"),
  ("tratoClientes", "¿Tenía buen trato con los clientes?"),
  ("avisaConAnticipacionRetirada", "¿Avisó con anticipación su retirada?"),
  ("consumeMarihuana", "¿Consumía marihuana?"),
  ("consumeOtrasDrogas", "¿Consumía otras drogas?"),
  ("consumoAlcoholExcesivo", "¿Consumía alcohol en exceso?"),
  ("destrozos", "¿Causó destrozos en la propiedad?"),
  ("robos", "¿Cometió robos o hurtos?"),
  ("amenazaPolicia", "¿Amenazó con llamar a la policía?"),
  ("amenazaExtranjeros", "¿Amenazó a personas extranjeras?"),
  ("gritaEInsultaArrendatario", "¿Gritaba o insultaba al arrendador?"),
  ("independiente", "¿Era independiente?"),
  ("privado", "¿Respetaba la privacidad de los demás?"),
  ("llavero", "¿Devolvió las llaves al retirarse?"),
  ("meteGenteAjena", "¿Metía gente ajena a la propiedad?"),
];

/// Preguntas del reporte express, calificadas con estrellas de 1 a 5.
pub const PREGUNTAS_EXPRESS: &[(&str, &str)] = &[
  ("pagaYavisa", "Pago puntual y aviso de retirada"),
  ("ordenLimpieza", "Orden y limpieza"),
  ("respeto", "Respeto hacia los demás"),
  ("conducta", "Conducta general"),
  ("profesionalismo", "Profesionalismo"),
];

/// Borrador del reporte completo. Se llena campo a campo a medida que
/// avanza la conversación; `to_payload` exige los obligatorios.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
  pub nombre: Option<String>,
  pub apellido: Option<String>,
  pub id_type: Option<IdType>,
  pub identificacion: Option<String>,
  pub genero: Option<Genero>,
  pub nacionalidad: Option<String>,
  pub telefono: Option<Phone>,
  pub email: Option<String>,
  pub nick_names: Vec<String>,
  pub evaluaciones: BTreeMap<String, EvaluationAnswer>,
  pub recomendacion: Option<Recommendation>,
  pub comentarios: Option<String>,
}

impl ReportDraft {
  /// Próxima pregunta de evaluación sin responder, en orden de catálogo.
  pub fn next_evaluation(&self) -> Option<(&'static str, &'static str)> {
    EVALUACIONES.iter()
                .find(|(key, _)| !self.evaluaciones.contains_key(*key))
                .copied()
  }

  /// Arma el payload final. Falla con `MissingField` si un obligatorio
  /// sigue vacío (no debería ocurrir si el flujo avanzó completo).
  pub fn to_payload(&self, author: &UserInfo) -> Result<ReportPayload, DomainError> {
    if self.evaluaciones.len() < EVALUACIONES.len() {
      return Err(DomainError::MissingField("evaluaciones"));
    }
    Ok(ReportPayload {
      nombre: self.nombre.clone().ok_or(DomainError::MissingField("nombre"))?,
      apellido: self.apellido.clone().ok_or(DomainError::MissingField("apellido"))?,
      id_type: self.id_type.ok_or(DomainError::MissingField("idType"))?,
      identificacion: self.identificacion.clone().ok_or(DomainError::MissingField("identificacion"))?,
      genero: self.genero.unwrap_or(Genero::SinDatos),
      nacionalidad: self.nacionalidad.clone(),
      telefono: vec![self.telefono.clone().ok_or(DomainError::MissingField("telefono"))?],
      email: self.email.clone().unwrap_or_else(|| "notiene@email.com".to_string()),
      nick_names: self.nick_names.clone(),
      evaluaciones: self.evaluaciones.clone(),
      recomendacion: self.recomendacion.ok_or(DomainError::MissingField("recomendacion"))?,
      comentarios_adicionales: self.comentarios.clone().unwrap_or_default(),
      creado_por: "chatbot".to_string(),
      version: "2.0".to_string(),
      created_at: None,
      author_info: AuthorInfo { uid: author.uid.clone(),
                                email: author.email.clone(),
                                role: author.role.as_str().to_string() },
    })
  }
}

/// Borrador del reporte express: datos mínimos más cinco calificaciones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressDraft {
  pub nombre: Option<String>,
  pub apellido: Option<String>,
  pub id_type: Option<IdType>,
  pub identificacion: Option<String>,
  pub genero: Option<Genero>,
  pub telefono: Option<Phone>,
  pub email: Option<String>,
  pub ratings: BTreeMap<String, u8>,
  pub recomendacion: Option<Recommendation>,
  pub comentarios: Option<String>,
}

impl ExpressDraft {
  /// Próxima calificación pendiente, en orden de catálogo.
  pub fn next_rating(&self) -> Option<(&'static str, &'static str)> {
    PREGUNTAS_EXPRESS.iter()
                     .find(|(key, _)| !self.ratings.contains_key(*key))
                     .copied()
  }

  /// Promedio de las calificaciones ingresadas, con un decimal implícito.
  pub fn average_rating(&self) -> f64 {
    if self.ratings.is_empty() {
      return 0.0;
    }
    let suma: u32 = self.ratings.values().map(|r| u32::from(*r)).sum();
    f64::from(suma) / self.ratings.len() as f64
  }

  pub fn to_payload(&self, author: &UserInfo) -> Result<ExpressPayload, DomainError> {
    if self.ratings.len() < PREGUNTAS_EXPRESS.len() {
      return Err(DomainError::MissingField("ratings"));
    }
    Ok(ExpressPayload {
      nombre: self.nombre.clone().ok_or(DomainError::MissingField("nombre"))?,
      apellido: self.apellido.clone().ok_or(DomainError::MissingField("apellido"))?,
      id_type: self.id_type.ok_or(DomainError::MissingField("idType"))?,
      identificacion: self.identificacion.clone().ok_or(DomainError::MissingField("identificacion"))?,
      genero: self.genero.unwrap_or(Genero::SinDatos),
      telefono: vec![self.telefono.clone().ok_or(DomainError::MissingField("telefono"))?],
      email: self.email.clone().unwrap_or_else(|| "notiene@email.com".to_string()),
      ratings: self.ratings.clone(),
      promedio: self.average_rating(),
      recomendacion: self.recomendacion.ok_or(DomainError::MissingField("recomendacion"))?,
      comentarios_adicionales: self.comentarios.clone().unwrap_or_default(),
      evaluation_count: 1,
      creado_por: "chatbot".to_string(),
      version: "2.0".to_string(),
      created_at: None,
      author_info: AuthorInfo { uid: author.uid.clone(),
                                email: author.email.clone(),
                                role: author.role.as_str().to_string() },
    })
  }
}

/// Eje de búsqueda elegido por el usuario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchAxis {
  Nombre,
  Identificacion,
  Telefono,
}

impl SearchAxis {
  pub fn from_value(value: &str) -> Option<Self> {
    match value {
      "nombre" => Some(Self::Nombre),
      "identificacion" => Some(Self::Identificacion),
      "telefono" => Some(Self::Telefono),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Nombre => "nombre",
      Self::Identificacion => "identificacion",
      Self::Telefono => "telefono",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::Nombre => "Nombre",
      Self::Identificacion => "Identificación",
      Self::Telefono => "Teléfono",
    }
  }
}

/// Borrador de búsqueda: eje y término a consultar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchDraft {
  pub axis: Option<SearchAxis>,
  pub query: Option<String>,
}

/// Payload del reporte completo, con el contrato JSON del backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
  pub nombre: String,
  pub apellido: String,
  #[serde(rename = "idType")]
  pub id_type: IdType,
  pub identificacion: String,
  pub genero: Genero,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub nacionalidad: Option<String>,
  pub telefono: Vec<Phone>,
  pub email: String,
  #[serde(rename = "nickNames")]
  pub nick_names: Vec<String>,
  pub evaluaciones: BTreeMap<String, EvaluationAnswer>,
  pub recomendacion: Recommendation,
  #[serde(rename = "comentariosAdicionales")]
  pub comentarios_adicionales: String,
  #[serde(rename = "creadoPor")]
  pub creado_por: String,
  pub version: String,
  #[serde(rename = "createdAt")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(rename = "authorInfo")]
  pub author_info: AuthorInfo,
}

/// Payload del reporte express.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressPayload {
  pub nombre: String,
  pub apellido: String,
  #[serde(rename = "idType")]
  pub id_type: IdType,
  pub identificacion: String,
  pub genero: Genero,
  pub telefono: Vec<Phone>,
  pub email: String,
  pub ratings: BTreeMap<String, u8>,
  pub promedio: f64,
  pub recomendacion: Recommendation,
  #[serde(rename = "comentariosAdicionales")]
  pub comentarios_adicionales: String,
  #[serde(rename = "evaluationCount")]
  pub evaluation_count: u32,
  #[serde(rename = "creadoPor")]
  pub creado_por: String,
  pub version: String,
  #[serde(rename = "createdAt")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(rename = "authorInfo")]
  pub author_info: AuthorInfo,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::session::Role;

  fn autor() -> UserInfo {
    UserInfo { uid: "u-1".to_string(), email: "autor@mail.com".to_string(), role: Role::Owner }
  }

  fn borrador_completo() -> ReportDraft {
    let mut draft = ReportDraft { nombre: Some("Juan".into()),
                                  apellido: Some("Pérez".into()),
                                  id_type: Some(IdType::Rut),
                                  identificacion: Some("12345.678-5".into()),
                                  genero: Some(Genero::Masculino),
                                  nacionalidad: Some("Chilena".into()),
                                  telefono: Some(Phone { country_code: "+56".into(),
                                                         number: "912345678".into() }),
                                  email: None,
                                  nick_names: vec!["Juanito".into()],
                                  ..ReportDraft::default() };
    for (key, _) in EVALUACIONES {
      draft.evaluaciones.insert((*key).to_string(), EvaluationAnswer::SinDatos);
    }
    draft.recomendacion = Some(Recommendation::Si);
    draft
  }

  #[test]
  fn payload_completo_fija_el_contrato() {
    let payload = borrador_completo().to_payload(&autor()).unwrap();
    assert_eq!(payload.creado_por, "chatbot");
    assert_eq!(payload.version, "2.0");
    assert_eq!(payload.email, "notiene@email.com");
    assert!(payload.created_at.is_none());
    assert_eq!(payload.telefono.len(), 1);

    let v = serde_json::to_value(&payload).unwrap();
    assert_eq!(v["creadoPor"], "chatbot");
    assert_eq!(v["createdAt"], serde_json::Value::Null);
    assert_eq!(v["telefono"][0]["countryCode"], "+56");
    assert_eq!(v["nickNames"][0], "Juanito");
    assert_eq!(v["recomendacion"], "si");
  }

  #[test]
  fn payload_exige_evaluaciones_completas() {
    let mut draft = borrador_completo();
    draft.evaluaciones.remove("robos");
    match draft.to_payload(&autor()) {
      Err(DomainError::MissingField(campo)) => assert_eq!(campo, "evaluaciones"),
      other => panic!("se esperaba MissingField: {:?}", other),
    }
  }

  #[test]
  fn siguiente_evaluacion_respeta_el_orden() {
    let mut draft = ReportDraft::default();
    assert_eq!(draft.next_evaluation().map(|(k, _)| k), Some("paga_puntual"));
    draft.evaluaciones.insert("paga_puntual".to_string(), EvaluationAnswer::Si);
    assert_eq!(draft.next_evaluation().map(|(k, _)| k), Some("habitacionLimpiaYOrdenada"));
  }

  #[test]
  fn promedio_express_de_cinco_calificaciones() {
    let mut draft = ExpressDraft::default();
    for ((key, _), rating) in PREGUNTAS_EXPRESS.iter().zip([1u8, 5, 3, 4, 2]) {
      draft.ratings.insert((*key).to_string(), rating);
    }
    assert!((draft.average_rating() - 3.0).abs() < f64::EPSILON);
  }

  #[test]
  fn payload_express_lleva_conteo_uno() {
    let mut draft = ExpressDraft { nombre: Some("Ana".into()),
                                   apellido: Some("Soto".into()),
                                   id_type: Some(IdType::Cedula),
                                   identificacion: Some("1234567".into()),
                                   telefono: Some(Phone { country_code: "+57".into(),
                                                          number: "3001234567".into() }),
                                   recomendacion: Some(Recommendation::ACriterio),
                                   ..ExpressDraft::default() };
    for (key, _) in PREGUNTAS_EXPRESS {
      draft.ratings.insert((*key).to_string(), 4);
    }
    let payload = draft.to_payload(&autor()).unwrap();
    assert_eq!(payload.evaluation_count, 1);
    assert!((payload.promedio - 4.0).abs() < f64::EPSILON);
    let v = serde_json::to_value(&payload).unwrap();
    assert_eq!(v["evaluationCount"], 1);
    assert_eq!(v["recomendacion"], "a_criterio");
  }
}
