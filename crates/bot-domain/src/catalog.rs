// Archivo: catalog.rs
// Propósito: catálogos estáticos para sugerencias y opciones (nacionalidades
// y prefijos telefónicos por país).
use crate::message::MessageOption;
use once_cell::sync::Lazy;

/// Nacionalidades ofrecidas como sugerencia local.
pub const NACIONALIDADES: &[&str] = &["Chilena", "Argentina", "Brasileña", "Colombiana", "Peruana",
                                      "Boliviana", "Ecuatoriana", "Uruguaya", "Paraguaya", "Venezolana",
                                      "Española", "Italiana", "Francesa", "Alemana", "Estadounidense",
                                      "Canadiense", "Mexicana", "Otra"];

/// Prefijos telefónicos (código, país) para la selección de código de país.
pub const PREFIJOS_PAIS: &[(&str, &str)] = &[("+56", "Chile"),
                                             ("+54", "Argentina"),
                                             ("+55", "Brasil"),
                                             ("+57", "Colombia"),
                                             ("+51", "Perú"),
                                             ("+591", "Bolivia"),
                                             ("+593", "Ecuador"),
                                             ("+598", "Uruguay"),
                                             ("+595", "Paraguay"),
                                             ("+58", "Venezuela"),
                                             ("+34", "España"),
                                             ("+1", "Estados Unidos / Canadá"),
                                             ("+52", "México")];

static NACIONALIDAD_OPTIONS: Lazy<Vec<MessageOption>> = Lazy::new(|| {
  let mut opts: Vec<MessageOption> = NACIONALIDADES.iter()
                                                   .enumerate()
                                                   .map(|(i, n)| MessageOption::new((i + 1).to_string(), *n, *n))
                                                   .collect();
  opts.push(MessageOption::new("0", "Omitir", "omitir"));
  opts
});

static PREFIJO_OPTIONS: Lazy<Vec<MessageOption>> = Lazy::new(|| {
  PREFIJOS_PAIS.iter()
               .enumerate()
               .map(|(i, (code, pais))| {
                 MessageOption::new((i + 1).to_string(), format!("{} ({})", pais, code), *code)
               })
               .collect()
});

/// Opciones de nacionalidad, con "omitir" al final.
pub fn nacionalidad_options() -> &'static [MessageOption] {
  NACIONALIDAD_OPTIONS.as_slice()
}

/// Opciones de código de país para teléfonos.
pub fn prefijo_options() -> &'static [MessageOption] {
  PREFIJO_OPTIONS.as_slice()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn catalogo_de_nacionalidades_incluye_omitir() {
    let opts = nacionalidad_options();
    assert_eq!(opts.len(), NACIONALIDADES.len() + 1);
    assert_eq!(opts.last().unwrap().value, "omitir");
  }

  #[test]
  fn prefijos_llevan_codigo_como_valor() {
    let opts = prefijo_options();
    assert_eq!(opts[0].value, "+56");
    assert!(opts[0].label.contains("Chile"));
  }
}
