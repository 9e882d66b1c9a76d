// Archivo: validators.rs
// Propósito: validadores puros de campo. Cada validador recibe el texto
// crudo y devuelve un `ValidationResult` con el valor normalizado cuando
// pasa, o un mensaje (y sugerencias opcionales) cuando no.
use crate::drafts::IdType;
use serde::{Deserialize, Serialize};

/// Resultado de validar un campo.
///
/// Transitorio: nunca se persiste. `value` trae la forma canónica que
/// debe almacenarse aguas abajo (por ejemplo el RUT reformateado).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
  #[serde(rename = "isValid")]
  pub is_valid: bool,
  pub value: Option<String>,
  pub message: Option<String>,
  pub suggestions: Vec<String>,
}

impl ValidationResult {
  /// Campo válido con su forma normalizada.
  pub fn ok(value: impl Into<String>) -> Self {
    Self { is_valid: true, value: Some(value.into()), message: None, suggestions: Vec::new() }
  }

  /// Campo inválido con el mensaje a re-preguntar.
  pub fn rechazo(message: impl Into<String>) -> Self {
    Self { is_valid: false, value: None, message: Some(message.into()), suggestions: Vec::new() }
  }

  /// Campo inválido con sugerencias de corrección.
  pub fn rechazo_con_sugerencias(message: impl Into<String>, suggestions: Vec<String>) -> Self {
    Self { is_valid: false, value: None, message: Some(message.into()), suggestions }
  }
}

// Letras aceptadas en nombres: latinas básicas más acentuadas del español.
fn es_letra_nombre(c: char) -> bool {
  c.is_ascii_alphabetic() || "áéíóúüñÁÉÍÓÚÜÑ".contains(c)
}

/// Valida nombre o apellido: 2 a 50 caracteres, letras (incluyendo
/// acentuadas), espacios, guiones y apóstrofes.
pub fn validate_name(raw: &str) -> ValidationResult {
  let trimmed = raw.trim();
  if trimmed.chars().count() < 2 {
    return ValidationResult::rechazo("El nombre debe tener al menos 2 caracteres.");
  }
  if trimmed.chars().count() > 50 {
    return ValidationResult::rechazo("El nombre no puede tener más de 50 caracteres.");
  }
  if !trimmed.chars().all(|c| es_letra_nombre(c) || c == ' ' || c == '-' || c == '\'') {
    return ValidationResult::rechazo("El nombre solo puede contener letras, espacios y guiones.");
  }
  ValidationResult::ok(trimmed)
}

/// Valida un RUT chileno contra su dígito verificador (módulo 11 con
/// pesos cíclicos 2..7). Acepta el dígito verificador numérico o 'K'.
/// Normaliza como `NNNNN.NNN-C`.
pub fn validate_rut(raw: &str) -> ValidationResult {
  let clean: String = raw.chars()
                         .filter(|c| !matches!(c, '.' | '-' | ' '))
                         .map(|c| c.to_ascii_uppercase())
                         .collect();
  // Solo ASCII alfanumérico antes de partir cuerpo y dígito verificador.
  if !clean.chars().all(|c| c.is_ascii_alphanumeric()) || !(8..=9).contains(&clean.len()) {
    return ValidationResult::rechazo("RUT debe tener formato 12345678-9 o 12345678-K");
  }
  let digits = &clean[..clean.len() - 1];
  let check = clean.chars().last().unwrap_or('0');
  if !digits.chars().all(|c| c.is_ascii_digit()) || !(check.is_ascii_digit() || check == 'K') {
    return ValidationResult::rechazo("RUT debe tener formato 12345678-9 o 12345678-K");
  }

  // Suma ponderada de derecha a izquierda con pesos 2,3,4,5,6,7 cíclicos.
  let mut sum: u32 = 0;
  let mut mult: u32 = 2;
  for c in digits.chars().rev() {
    sum += c.to_digit(10).unwrap_or(0) * mult;
    mult = if mult == 7 { 2 } else { mult + 1 };
  }
  let rem = sum % 11;
  let expected = match rem {
    0 => '0',
    1 => 'K',
    r => char::from_digit(11 - r, 10).unwrap_or('0'),
  };
  if check != expected {
    return ValidationResult::rechazo("RUT inválido. Verifica el dígito verificador.");
  }

  let cut = digits.len() - 3;
  ValidationResult::ok(format!("{}.{}-{}", &digits[..cut], &digits[cut..], check))
}

/// Valida una cédula: 6 a 15 dígitos.
pub fn validate_cedula(raw: &str) -> ValidationResult {
  let clean: String = raw.chars().filter(|c| !matches!(c, '.' | '-' | ' ')).collect();
  if clean.is_empty() || !clean.chars().all(|c| c.is_ascii_digit()) || !(6..=15).contains(&clean.len()) {
    return ValidationResult::rechazo("Cédula debe contener entre 6 y 15 dígitos");
  }
  ValidationResult::ok(clean)
}

/// Valida un pasaporte: 6 a 12 caracteres alfanuméricos; normaliza en
/// mayúsculas.
pub fn validate_passport(raw: &str) -> ValidationResult {
  let clean: String = raw.chars()
                         .filter(|c| !matches!(c, ' ' | '-'))
                         .map(|c| c.to_ascii_uppercase())
                         .collect();
  if !(6..=12).contains(&clean.len()) || !clean.chars().all(|c| c.is_ascii_alphanumeric()) {
    return ValidationResult::rechazo("Pasaporte debe tener entre 6 y 12 caracteres (letras y números)");
  }
  ValidationResult::ok(clean)
}

/// Valida la identificación según el tipo declarado.
pub fn validate_identification(raw: &str, id_type: IdType) -> ValidationResult {
  match id_type {
    IdType::Rut => validate_rut(raw),
    IdType::Cedula => validate_cedula(raw),
    IdType::Pasaporte => validate_passport(raw),
  }
}

/// Valida un código de país: `+` seguido de 1 a 3 dígitos.
pub fn validate_country_code(raw: &str) -> ValidationResult {
  let clean = raw.trim();
  let digits = clean.strip_prefix('+').unwrap_or("");
  if digits.is_empty() || digits.len() > 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
    return ValidationResult::rechazo_con_sugerencias("Código de país inválido. Formato: +56",
                                                     vec!["+56".into(), "+54".into(), "+55".into(),
                                                          "+57".into(), "+51".into()]);
  }
  ValidationResult::ok(clean)
}

/// Valida el número nacional dado el código de país ya elegido.
///
/// Regla genérica: 8 a 15 dígitos. Cuando el código es conocido se aplica
/// el formato del país: Chile 9 dígitos comenzando en 9; Argentina y
/// Brasil 10 u 11; Colombia exactamente 10.
pub fn validate_phone_number(country_code: &str, raw: &str) -> ValidationResult {
  let clean: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
  if clean.is_empty() || !clean.chars().all(|c| c.is_ascii_digit()) {
    return ValidationResult::rechazo("El teléfono solo puede contener dígitos.");
  }
  let len = clean.len();
  let resultado = match country_code {
    "+56" => {
      if len == 9 && clean.starts_with('9') {
        Ok(())
      } else {
        Err("Teléfono chileno debe ser 9 XXXX XXXX (9 dígitos comenzando en 9)")
      }
    }
    "+54" | "+55" => {
      if (10..=11).contains(&len) {
        Ok(())
      } else {
        Err("El número debe tener 10 u 11 dígitos para este país")
      }
    }
    "+57" => {
      if len == 10 {
        Ok(())
      } else {
        Err("Teléfono colombiano debe tener exactamente 10 dígitos")
      }
    }
    _ => {
      if (8..=15).contains(&len) {
        Ok(())
      } else {
        Err("El número debe tener entre 8 y 15 dígitos")
      }
    }
  };
  match resultado {
    Ok(()) => ValidationResult::ok(clean),
    Err(msg) => ValidationResult::rechazo(msg),
  }
}

/// Valida un email con forma `local@dominio.tld`; normaliza en minúsculas.
pub fn validate_email(raw: &str) -> ValidationResult {
  let trimmed = raw.trim();
  let mut parts = trimmed.splitn(2, '@');
  let local = parts.next().unwrap_or("");
  let domain = parts.next().unwrap_or("");
  let local_ok = !local.is_empty() && !local.contains(char::is_whitespace);
  let domain_ok = domain.contains('.')
                  && !domain.starts_with('.')
                  && !domain.ends_with('.')
                  && !domain.contains(char::is_whitespace)
                  && !domain.contains('@');
  if !local_ok || !domain_ok {
    return ValidationResult::rechazo("Por favor ingresa un email válido (ejemplo@dominio.com)");
  }
  ValidationResult::ok(trimmed.to_lowercase())
}

/// Valida una calificación con estrellas: entero entre 1 y 5.
pub fn validate_rating(raw: &str) -> ValidationResult {
  match raw.trim().parse::<u8>() {
    Ok(n) if (1..=5).contains(&n) => ValidationResult::ok(n.to_string()),
    _ => ValidationResult::rechazo("La calificación debe ser un número entre 1 y 5."),
  }
}

/// Normaliza texto libre (comentarios): colapsa espacios y elimina los
/// delimitadores de marcado `<` y `>`.
pub fn normalize_comment(raw: &str) -> String {
  raw.split_whitespace()
     .collect::<Vec<_>>()
     .join(" ")
     .chars()
     .filter(|c| *c != '<' && *c != '>')
     .collect()
}

/// Capitaliza cada palabra (para mostrar nombres en resúmenes).
pub fn capitalize_words(raw: &str) -> String {
  raw.split_whitespace()
     .map(|w| {
       let mut chars = w.chars();
       match chars.next() {
         Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
         None => String::new(),
       }
     })
     .collect::<Vec<String>>()
     .join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn nombre_minimo_dos_caracteres() {
    assert!(!validate_name("a").is_valid);
    assert!(validate_name("ab").is_valid);
  }

  #[test]
  fn nombre_maximo_cincuenta_caracteres() {
    let justo: String = "a".repeat(50);
    let largo: String = "a".repeat(51);
    assert!(validate_name(&justo).is_valid);
    assert!(!validate_name(&largo).is_valid);
  }

  #[test]
  fn nombre_acepta_acentos_y_guiones() {
    assert!(validate_name("María José").is_valid);
    assert!(validate_name("Ñanco-Pérez").is_valid);
    assert!(validate_name("O'Higgins").is_valid);
  }

  #[test]
  fn nombre_rechaza_digitos_y_marcado() {
    assert!(!validate_name("Juan2").is_valid);
    assert!(!validate_name("<script>alert('x')</script>").is_valid);
  }

  #[test]
  fn rut_valido_con_digito_numerico() {
    // 12345678 -> dv 5
    let r = validate_rut("123456785");
    assert!(r.is_valid);
    assert_eq!(r.value.as_deref(), Some("12345.678-5"));
  }

  #[test]
  fn rut_valido_con_dv_k() {
    // 20416364 -> dv K
    let r = validate_rut("20416364K");
    assert!(r.is_valid, "{:?}", r.message);
    assert_eq!(r.value.as_deref(), Some("20416.364-K"));
  }

  #[test]
  fn rut_acepta_formato_con_puntos_y_guion() {
    let r = validate_rut("12.345.678-5");
    assert!(r.is_valid);
    assert_eq!(r.value.as_deref(), Some("12345.678-5"));
  }

  #[test]
  fn rut_rechaza_dv_corrupto() {
    // Cualquier otro dígito verificador debe fallar.
    for dv in ['0', '1', '2', '3', '4', '6', '7', '8', '9', 'K'] {
      let candidato = format!("12345678{}", dv);
      assert!(!validate_rut(&candidato).is_valid, "dv {} no debió pasar", dv);
    }
  }

  #[test]
  fn cedula_entre_seis_y_quince_digitos() {
    assert!(!validate_cedula("12345").is_valid);
    assert!(validate_cedula("123456").is_valid);
    assert!(validate_cedula("123456789012345").is_valid);
    assert!(!validate_cedula("1234567890123456").is_valid);
    assert!(!validate_cedula("12345a").is_valid);
  }

  #[test]
  fn pasaporte_alfanumerico_en_mayusculas() {
    let r = validate_passport("a1234567");
    assert!(r.is_valid);
    assert_eq!(r.value.as_deref(), Some("A1234567"));
    assert!(!validate_passport("ab.12").is_valid);
  }

  #[test]
  fn telefono_chileno_nueve_digitos() {
    assert!(validate_phone_number("+56", "912345678").is_valid);
    assert!(!validate_phone_number("+56", "812345678").is_valid);
    assert!(!validate_phone_number("+56", "91234567").is_valid);
  }

  #[test]
  fn telefono_colombiano_diez_digitos() {
    assert!(validate_phone_number("+57", "3001234567").is_valid);
    assert!(!validate_phone_number("+57", "300123456").is_valid);
  }

  #[test]
  fn telefono_generico_ocho_a_quince() {
    assert!(validate_phone_number("+34", "612345678").is_valid);
    assert!(!validate_phone_number("+34", "1234567").is_valid);
    assert!(!validate_phone_number("+34", "abc").is_valid);
  }

  #[test]
  fn codigo_de_pais_formato_mas_digitos() {
    assert!(validate_country_code("+56").is_valid);
    assert!(validate_country_code("+591").is_valid);
    assert!(!validate_country_code("56").is_valid);
    assert!(!validate_country_code("+5691").is_valid);
    let r = validate_country_code("cincuenta");
    assert!(!r.suggestions.is_empty());
  }

  #[test]
  fn email_forma_simple() {
    let r = validate_email("Usuario@Dominio.COM");
    assert!(r.is_valid);
    assert_eq!(r.value.as_deref(), Some("usuario@dominio.com"));
    assert!(!validate_email("sin-arroba.com").is_valid);
    assert!(!validate_email("a@b").is_valid);
    assert!(!validate_email("a b@c.cl").is_valid);
  }

  #[test]
  fn calificacion_uno_a_cinco() {
    assert!(validate_rating("1").is_valid);
    assert!(validate_rating(" 5 ").is_valid);
    assert!(!validate_rating("0").is_valid);
    assert!(!validate_rating("6").is_valid);
    assert!(!validate_rating("tres").is_valid);
  }

  #[test]
  fn comentario_normalizado_sin_marcado() {
    assert_eq!(normalize_comment("  hola   <b>mundo</b>  "), "hola bmundo/b");
  }

  #[test]
  fn capitaliza_palabras() {
    assert_eq!(capitalize_words("juan PÉREZ"), "Juan Pérez");
  }
}
