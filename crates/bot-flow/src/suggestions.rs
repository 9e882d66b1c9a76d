// Archivo: suggestions.rs
// Propósito: proveedor de sugerencias de autocompletado. Mezcla el
// catálogo estático con sugerencias remotas; si el backend falla se
// degrada al catálogo local. Nunca bloquea el avance del flujo.
use std::sync::Arc;

use bot_client::BotApi;
use bot_domain::{NACIONALIDADES, PREFIJOS_PAIS};

/// Límite por defecto de sugerencias entregadas.
pub const LIMITE_DEFECTO: usize = 5;

/// Límite máximo admitido, aunque el llamador pida más.
pub const LIMITE_MAXIMO: usize = 8;

pub struct SuggestionProvider {
    api: Arc<dyn BotApi>,
}

impl SuggestionProvider {
    pub fn new(api: Arc<dyn BotApi>) -> Self {
        Self { api }
    }

    /// Sugerencias para un campo dado un prefijo.
    ///
    /// Primero el catálogo local filtrado por prefijo, luego las remotas;
    /// se deduplica conservando el orden y se recorta al límite.
    pub async fn suggest(&self, field: &str, prefix: &str, limit: Option<usize>) -> Vec<String> {
        let limite = limit.unwrap_or(LIMITE_DEFECTO).min(LIMITE_MAXIMO);
        let mut resultado = locales(field, prefix);

        match self.api.suggestions(field, prefix, limite).await {
            Ok(remotas) => resultado.extend(remotas),
            Err(e) => log::warn!("sugerencias remotas para '{}' fallaron (se usa catálogo): {}", field, e),
        }

        dedup_conservando_orden(resultado, limite)
    }
}

/// Catálogo estático filtrado por prefijo (sin distinguir mayúsculas).
fn locales(field: &str, prefix: &str) -> Vec<String> {
    let prefijo = prefix.to_lowercase();
    match field {
        "nacionalidad" => NACIONALIDADES.iter()
                                        .filter(|n| n.to_lowercase().starts_with(&prefijo))
                                        .map(|n| (*n).to_string())
                                        .collect(),
        "countryCode" => PREFIJOS_PAIS.iter()
                                      .filter(|(code, pais)| {
                                          code.starts_with(prefix) || pais.to_lowercase().starts_with(&prefijo)
                                      })
                                      .map(|(code, _)| (*code).to_string())
                                      .collect(),
        _ => Vec::new(),
    }
}

fn dedup_conservando_orden(items: Vec<String>, limite: usize) -> Vec<String> {
    let mut vistos = std::collections::HashSet::new();
    items.into_iter()
         .filter(|s| vistos.insert(s.to_lowercase()))
         .take(limite)
         .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplica_conservando_el_orden() {
        let items = vec!["Chilena".to_string(), "chilena".to_string(), "Argentina".to_string()];
        let out = dedup_conservando_orden(items, 5);
        assert_eq!(out, vec!["Chilena", "Argentina"]);
    }

    #[test]
    fn recorta_al_limite() {
        let items: Vec<String> = (0..12).map(|i| format!("s{}", i)).collect();
        assert_eq!(dedup_conservando_orden(items, LIMITE_MAXIMO).len(), 8);
    }

    #[test]
    fn catalogo_local_filtra_por_prefijo() {
        let out = locales("nacionalidad", "ch");
        assert_eq!(out, vec!["Chilena"]);
        let codigos = locales("countryCode", "+5");
        assert!(codigos.contains(&"+56".to_string()));
    }
}
