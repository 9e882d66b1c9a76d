// Archivo: flows/express.rs
// Propósito: pipeline del reporte express. Versión corta: datos mínimos,
// cinco calificaciones con estrellas, recomendación y comentarios.
use bot_domain::{capitalize_words, normalize_comment, prefijo_options, validate_country_code,
                 validate_identification, validate_name, validate_phone_number, validate_rating,
                 IdType, Message, MessageContent, MessageOption, Phone, Recommendation};

use crate::engine::ChatEngine;
use crate::errors::Result;
use crate::flows::report::opciones_recomendacion;
use crate::states::FlowState;

fn opciones_id_type() -> Vec<MessageOption> {
    vec![MessageOption::new("1", "RUT", "rut"),
         MessageOption::new("2", "Cédula", "cedula"),
         MessageOption::new("3", "Pasaporte", "pasaporte")]
}

fn opciones_estrellas() -> Vec<MessageOption> {
    (1..=5u8).map(|n| MessageOption::new(n.to_string(), "⭐".repeat(n as usize), n.to_string()))
             .collect()
}

impl ChatEngine {
    pub(crate) fn express_prompt(&self, state: FlowState) -> Message {
        match state {
            FlowState::CreateExpress => {
                Message::bot("Vamos a crear un reporte express: solo los datos esenciales y cinco \
                              calificaciones. Escribe 'volver' para retroceder o 'cancelar' para salir.",
                             MessageContent::Info,
                             false)
            }
            FlowState::ExpressName => {
                Message::bot("¿Cuál es el nombre del arrendatario?", MessageContent::Input, true)
            }
            FlowState::ExpressLastname => {
                Message::bot("¿Y su apellido?", MessageContent::Input, true)
            }
            FlowState::ExpressIdType => {
                Message::bot("¿Qué tipo de identificación tiene?",
                             MessageContent::Options { options: opciones_id_type() },
                             true)
            }
            FlowState::ExpressIdentification => {
                let tipo = self.express_draft.id_type.map(|t| t.label()).unwrap_or("identificación");
                Message::bot(format!("Ingresa el {} del arrendatario.", tipo), MessageContent::Input, true)
            }
            FlowState::ExpressPhoneCode => {
                Message::bot("¿Cuál es el código de país de su teléfono?",
                             MessageContent::Options { options: prefijo_options().to_vec() },
                             true)
            }
            FlowState::ExpressPhone => {
                Message::bot("Ahora el número de teléfono (solo dígitos).", MessageContent::Input, true)
            }
            FlowState::ExpressRatings => self.rating_prompt(),
            FlowState::ExpressRecommendation => {
                Message::bot("¿Recomendarías arrendar a esta persona?",
                             MessageContent::Options { options: opciones_recomendacion() },
                             true)
            }
            FlowState::ExpressComments => {
                Message::bot("¿Comentarios adicionales? Escríbelos o responde 'omitir'.",
                             MessageContent::Input,
                             true)
            }
            _ => Message::bot("...", MessageContent::Text, false),
        }
    }

    fn rating_prompt(&self) -> Message {
        match self.express_draft.next_rating() {
            Some((_, pregunta)) => {
                Message::bot(format!("Califica de 1 a 5: {}", pregunta),
                             MessageContent::Options { options: opciones_estrellas() },
                             true)
            }
            None => Message::bot("Calificaciones completas.", MessageContent::Text, false),
        }
    }

    pub(crate) async fn handle_express_input(&mut self, value: &str) -> Result<()> {
        match self.state {
            FlowState::CreateExpress => {
                self.transition_to(FlowState::ExpressName).await;
            }
            FlowState::ExpressName => {
                let v = validate_name(value);
                match v.value {
                    Some(nombre) if v.is_valid => {
                        let nombre = capitalize_words(&nombre);
                        self.track_field("nombre", &nombre);
                        self.express_draft.nombre = Some(nombre);
                        self.transition_to(FlowState::ExpressLastname).await;
                    }
                    _ => {
                        let msg = v.message.unwrap_or_else(|| "Nombre inválido.".to_string());
                        self.re_prompt(msg, MessageContent::Input).await;
                    }
                }
            }
            FlowState::ExpressLastname => {
                let v = validate_name(value);
                match v.value {
                    Some(apellido) if v.is_valid => {
                        let apellido = capitalize_words(&apellido);
                        self.track_field("apellido", &apellido);
                        self.express_draft.apellido = Some(apellido);
                        self.transition_to(FlowState::ExpressIdType).await;
                    }
                    _ => {
                        let msg = v.message.unwrap_or_else(|| "Apellido inválido.".to_string());
                        self.re_prompt(msg, MessageContent::Input).await;
                    }
                }
            }
            FlowState::ExpressIdType => match IdType::from_value(value) {
                Some(tipo) => {
                    self.track_field("idType", value);
                    self.express_draft.id_type = Some(tipo);
                    self.transition_to(FlowState::ExpressIdentification).await;
                }
                None => {
                    self.re_prompt("Elige el tipo de identificación:",
                                   MessageContent::Options { options: opciones_id_type() })
                        .await;
                }
            },
            FlowState::ExpressIdentification => {
                let Some(tipo) = self.express_draft.id_type else {
                    self.transition_to(FlowState::ExpressIdType).await;
                    return Ok(());
                };
                let v = validate_identification(value, tipo);
                if !v.is_valid {
                    let msg = v.message.unwrap_or_else(|| "Identificación inválida.".to_string());
                    self.re_prompt(msg, MessageContent::Input).await;
                    return Ok(());
                }
                let normalizada = v.value.unwrap_or_else(|| value.to_string());
                if let Some(remota) = self.remote_check("identificacion", &normalizada).await {
                    if !remota.is_valid {
                        let msg = remota.message
                                        .unwrap_or_else(|| "Esa identificación no es válida.".to_string());
                        self.re_prompt(msg, MessageContent::Input).await;
                        return Ok(());
                    }
                }
                self.track_field("identificacion", &normalizada);
                self.express_draft.identificacion = Some(normalizada);
                self.transition_to(FlowState::ExpressPhoneCode).await;
            }
            FlowState::ExpressPhoneCode => {
                let v = validate_country_code(value);
                match v.value {
                    Some(code) if v.is_valid => {
                        self.track_field("countryCode", &code);
                        self.express_draft.telefono = Some(Phone { country_code: code,
                                                                   number: String::new() });
                        self.transition_to(FlowState::ExpressPhone).await;
                    }
                    _ => {
                        let msg = v.message.unwrap_or_else(|| "Código inválido.".to_string());
                        self.re_prompt(msg, MessageContent::Options { options: prefijo_options().to_vec() })
                            .await;
                    }
                }
            }
            FlowState::ExpressPhone => {
                let code = self.express_draft.telefono.as_ref()
                               .map(|p| p.country_code.clone())
                               .unwrap_or_default();
                let v = validate_phone_number(&code, value);
                match v.value {
                    Some(numero) if v.is_valid => {
                        self.track_field("telefono", &numero);
                        if let Some(phone) = self.express_draft.telefono.as_mut() {
                            phone.number = numero;
                        }
                        self.transition_to(FlowState::ExpressRatings).await;
                    }
                    _ => {
                        let msg = v.message.unwrap_or_else(|| "Teléfono inválido.".to_string());
                        self.re_prompt(msg, MessageContent::Input).await;
                    }
                }
            }
            FlowState::ExpressRatings => self.handle_rating(value).await?,
            FlowState::ExpressRecommendation => match Recommendation::from_value(value) {
                Some(recomendacion) => {
                    self.track_field("recomendacion", value);
                    self.express_draft.recomendacion = Some(recomendacion);
                    self.transition_to(FlowState::ExpressComments).await;
                }
                None => {
                    self.re_prompt("Elige una recomendación:",
                                   MessageContent::Options { options: opciones_recomendacion() })
                        .await;
                }
            },
            FlowState::ExpressComments => {
                if value != "omitir" && value != "no" {
                    let comentarios = normalize_comment(value);
                    self.track_field("comentariosAdicionales", &comentarios);
                    self.express_draft.comentarios = Some(comentarios);
                }
                self.transition_to(FlowState::Confirm).await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_rating(&mut self, value: &str) -> Result<()> {
        let Some((key, _)) = self.express_draft.next_rating() else {
            self.transition_to(FlowState::ExpressRecommendation).await;
            return Ok(());
        };
        let v = validate_rating(value);
        match v.value.and_then(|s| s.parse::<u8>().ok()) {
            Some(rating) if v.is_valid => {
                self.track_field(key, value);
                self.express_draft.ratings.insert(key.to_string(), rating);
                self.attempts = 0;
                if self.express_draft.next_rating().is_some() {
                    let msg = self.rating_prompt();
                    self.emit_bot(msg).await;
                } else {
                    self.transition_to(FlowState::ExpressRecommendation).await;
                }
            }
            _ => {
                self.re_prompt("La calificación debe ser un número entre 1 y 5.",
                               MessageContent::Options { options: opciones_estrellas() })
                    .await;
            }
        }
        Ok(())
    }

    /// Resumen del reporte express, con el promedio de calificaciones.
    pub(crate) fn express_summary(&self) -> String {
        let d = &self.express_draft;
        let telefono = d.telefono.as_ref()
                        .map(|p| format!("{} {}", p.country_code, p.number))
                        .unwrap_or_else(|| "—".to_string());
        format!("• Nombre: {} {}\n• {}: {}\n• Teléfono: {}\n• Promedio de calificaciones: {:.1}\n\
                 • Recomendación: {}\n• Comentarios: {}",
                d.nombre.as_deref().unwrap_or("—"),
                d.apellido.as_deref().unwrap_or("—"),
                d.id_type.map(|t| t.label()).unwrap_or("Identificación"),
                d.identificacion.as_deref().unwrap_or("—"),
                telefono,
                d.average_rating(),
                d.recomendacion.map(|r| r.label()).unwrap_or("—"),
                d.comentarios.as_deref().unwrap_or("—"))
    }
}
