// Archivo: flows/search.rs
// Propósito: pipeline de búsqueda: eje, término validado según el eje,
// consulta al backend y resultados ordenados. Un fallo remoto ofrece
// reintentar o volver al menú.
use bot_domain::{validate_name, Message, MessageContent, MessageOption, SearchAxis};

use crate::engine::ChatEngine;
use crate::errors::Result;
use crate::states::FlowState;

fn opciones_eje() -> Vec<MessageOption> {
    vec![MessageOption::new("1", "Por identificación", "identificacion"),
         MessageOption::new("2", "Por teléfono", "telefono"),
         MessageOption::new("3", "Por nombre", "nombre")]
}

fn opciones_resultados() -> Vec<MessageOption> {
    vec![MessageOption::new("1", "Buscar otro término", "again"),
         MessageOption::new("2", "Cambiar categoría", "type"),
         MessageOption::new("3", "Volver al menú", "menu")]
}

/// Validación del término según el eje elegido.
fn query_valida(axis: SearchAxis, query: &str) -> std::result::Result<String, &'static str> {
    let q = query.trim();
    match axis {
        SearchAxis::Nombre => {
            let v = validate_name(q);
            if v.is_valid {
                Ok(v.value.unwrap_or_else(|| q.to_string()))
            } else {
                Err("Para buscar por nombre escribe al menos 2 letras.")
            }
        }
        SearchAxis::Identificacion => {
            let limpio: String = q.chars().filter(|c| !matches!(c, '.' | '-' | ' ')).collect();
            if limpio.len() >= 3 && limpio.chars().all(|c| c.is_ascii_alphanumeric()) {
                Ok(limpio)
            } else {
                Err("Ingresa al menos 3 caracteres de la identificación (sin símbolos).")
            }
        }
        SearchAxis::Telefono => {
            let limpio: String = q.chars().filter(|c| c.is_ascii_digit()).collect();
            if (8..=15).contains(&limpio.len()) {
                Ok(limpio)
            } else {
                Err("Ingresa un teléfono de 8 a 15 dígitos.")
            }
        }
    }
}

impl ChatEngine {
    pub(crate) fn search_prompt(&self, state: FlowState) -> Message {
        match state {
            FlowState::SearchType => {
                Message::bot("¿Cómo quieres buscar el reporte?",
                             MessageContent::Options { options: opciones_eje() },
                             true)
            }
            FlowState::SearchInput => {
                let eje = self.search_draft.axis.map(|a| a.label()).unwrap_or("término");
                Message::bot(format!("Escribe el {} a buscar.", eje.to_lowercase()),
                             MessageContent::Input,
                             true)
            }
            FlowState::SearchResults => {
                let texto = if self.search_hits.is_empty() {
                    "No encontré reportes con ese criterio. ¿Qué quieres hacer?".to_string()
                } else {
                    format!("Encontré {} reporte(s), ordenados por relevancia. ¿Qué quieres hacer?",
                            self.search_hits.len())
                };
                Message::bot(texto,
                             MessageContent::SearchResults { hits: self.search_hits.clone(),
                                                             options: opciones_resultados() },
                             true)
            }
            _ => Message::bot("...", MessageContent::Text, false),
        }
    }

    pub(crate) async fn handle_search_input(&mut self, value: &str) -> Result<()> {
        match self.state {
            FlowState::SearchType => match SearchAxis::from_value(value) {
                Some(axis) => {
                    self.search_draft.axis = Some(axis);
                    self.transition_to(FlowState::SearchInput).await;
                }
                None => {
                    self.re_prompt("Elige una categoría de búsqueda:",
                                   MessageContent::Options { options: opciones_eje() })
                        .await;
                }
            },
            FlowState::SearchInput => {
                let Some(axis) = self.search_draft.axis else {
                    self.state = FlowState::SearchType;
                    self.emit_prompt(FlowState::SearchType).await;
                    return Ok(());
                };
                match query_valida(axis, value) {
                    Ok(query) => {
                        self.search_draft.query = Some(query.clone());
                        self.run_search(axis, &query).await;
                    }
                    Err(msg) => self.re_prompt(msg, MessageContent::Input).await,
                }
            }
            FlowState::SearchResults => match value {
                "again" => {
                    self.transition_to(FlowState::SearchInput).await;
                }
                "type" => {
                    self.search_draft = Default::default();
                    self.transition_to(FlowState::SearchType).await;
                }
                "menu" => self.reset_to_menu().await,
                _ => {
                    self.re_prompt("Elige una opción:",
                                   MessageContent::Options { options: opciones_resultados() })
                        .await;
                }
            },
            _ => {}
        }
        Ok(())
    }

    async fn run_search(&mut self, axis: SearchAxis, query: &str) {
        self.emit_bot(Message::bot("Buscando...", MessageContent::Loading, false)).await;
        match self.api.search_reports(axis, query).await {
            Ok(hits) => {
                self.search_hits = hits;
                self.transition_to(FlowState::SearchResults).await;
            }
            Err(e) => {
                log::warn!("la búsqueda falló: {}", e);
                self.fault_text = Some(e.to_string());
                self.transition_to(FlowState::Fault).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn el_termino_se_valida_segun_el_eje() {
        assert!(query_valida(SearchAxis::Nombre, "Juan").is_ok());
        assert!(query_valida(SearchAxis::Nombre, "J").is_err());
        assert_eq!(query_valida(SearchAxis::Identificacion, "12.345.678-5").unwrap(), "123456785");
        assert!(query_valida(SearchAxis::Telefono, "912345678").is_ok());
        assert!(query_valida(SearchAxis::Telefono, "123").is_err());
    }
}
