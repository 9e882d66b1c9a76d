// Archivo: flows/report.rs
// Propósito: pipeline del reporte completo. Treinta pasos: datos
// personales, contacto, dieciocho evaluaciones, recomendación y
// comentarios, cerrando en el resumen de confirmación.
use bot_domain::{capitalize_words, nacionalidad_options, normalize_comment, prefijo_options,
                 validate_country_code, validate_email, validate_identification, validate_name,
                 validate_phone_number, EvaluationAnswer, Genero, IdType, Message, MessageContent,
                 MessageOption, Phone, Recommendation};

use crate::engine::ChatEngine;
use crate::errors::Result;
use crate::states::FlowState;

fn opciones_id_type() -> Vec<MessageOption> {
    vec![MessageOption::new("1", "RUT", "rut"),
         MessageOption::new("2", "Cédula", "cedula"),
         MessageOption::new("3", "Pasaporte", "pasaporte")]
}

fn opciones_genero() -> Vec<MessageOption> {
    vec![MessageOption::new("1", "Masculino", "masculino"),
         MessageOption::new("2", "Femenino", "femenino"),
         MessageOption::new("3", "Transgénero", "transgenero"),
         MessageOption::new("4", "Otro", "otro"),
         MessageOption::new("5", "Prefiero no decirlo", "sin_datos")]
}

fn opciones_evaluacion() -> Vec<MessageOption> {
    vec![MessageOption::new("1", "Sí", "si"),
         MessageOption::new("2", "No", "no"),
         MessageOption::new("3", "A veces", "a_veces"),
         MessageOption::new("4", "Sin datos", "sin_datos")]
}

pub(crate) fn opciones_recomendacion() -> Vec<MessageOption> {
    vec![MessageOption::new("1", "Sí, mucho", "si_mucho"),
         MessageOption::new("2", "Sí", "si"),
         MessageOption::new("3", "A criterio de cada uno", "a_criterio"),
         MessageOption::new("4", "No", "no"),
         MessageOption::new("5", "No, para nada", "no_para_nada")]
}

impl ChatEngine {
    /// Prompt de entrada de cada paso del reporte completo.
    pub(crate) fn report_prompt(&self, state: FlowState) -> Message {
        match state {
            FlowState::CreateReport => {
                Message::bot("Vamos a crear un reporte completo. Te haré una serie de preguntas; \
                              puedes escribir 'volver' para retroceder o 'cancelar' para salir.",
                             MessageContent::Info,
                             false)
            }
            FlowState::ReportName => {
                Message::bot("¿Cuál es el nombre del arrendatario?", MessageContent::Input, true)
            }
            FlowState::ReportLastname => {
                Message::bot("¿Y su apellido?", MessageContent::Input, true)
            }
            FlowState::ReportNicknames => {
                Message::bot("¿Tiene apodos o sobrenombres? Sepáralos con comas, o escribe 'omitir'.",
                             MessageContent::Input,
                             true)
            }
            FlowState::ReportIdType => {
                Message::bot("¿Qué tipo de identificación tiene?",
                             MessageContent::Options { options: opciones_id_type() },
                             true)
            }
            FlowState::ReportIdentification => {
                let tipo = self.report_draft.id_type.map(|t| t.label()).unwrap_or("identificación");
                Message::bot(format!("Ingresa el {} del arrendatario.", tipo), MessageContent::Input, true)
            }
            FlowState::ReportPhoneCode => {
                Message::bot("¿Cuál es el código de país de su teléfono?",
                             MessageContent::Options { options: prefijo_options().to_vec() },
                             true)
            }
            FlowState::ReportPhone => {
                Message::bot("Ahora el número de teléfono (solo dígitos).", MessageContent::Input, true)
            }
            FlowState::ReportEmail => {
                Message::bot("¿Conoces su email? Escríbelo, o 'omitir' si no lo tienes.",
                             MessageContent::Input,
                             true)
            }
            FlowState::ReportGender => {
                Message::bot("¿Cuál es su género?",
                             MessageContent::Options { options: opciones_genero() },
                             true)
            }
            FlowState::ReportNationality => {
                Message::bot("¿Cuál es su nacionalidad? Puedes elegir una o escribir 'omitir'.",
                             MessageContent::Options { options: nacionalidad_options().to_vec() },
                             true)
            }
            FlowState::ReportEvaluations => self.evaluation_prompt(),
            FlowState::ReportComments => {
                Message::bot("Para terminar, ¿quieres agregar comentarios adicionales? Escríbelos o \
                              responde 'omitir'.",
                             MessageContent::Input,
                             true)
            }
            _ => Message::bot("...", MessageContent::Text, false),
        }
    }

    /// Pregunta de evaluación pendiente; terminadas las dieciocho, la
    /// recomendación final dentro del mismo estado.
    fn evaluation_prompt(&self) -> Message {
        match self.report_draft.next_evaluation() {
            Some((_, pregunta)) => {
                Message::bot(pregunta, MessageContent::Options { options: opciones_evaluacion() }, true)
            }
            None => Message::bot("¿Recomendarías arrendar a esta persona?",
                                 MessageContent::Options { options: opciones_recomendacion() },
                                 true),
        }
    }

    pub(crate) async fn handle_report_input(&mut self, value: &str) -> Result<()> {
        match self.state {
            FlowState::CreateReport => {
                // Estado de paso: el menú ya encadenó hacia ReportName.
                self.transition_to(FlowState::ReportName).await;
            }
            FlowState::ReportName => {
                let v = validate_name(value);
                match v.value {
                    Some(nombre) if v.is_valid => {
                        let nombre = capitalize_words(&nombre);
                        self.track_field("nombre", &nombre);
                        self.report_draft.nombre = Some(nombre);
                        self.transition_to(FlowState::ReportLastname).await;
                    }
                    _ => {
                        let msg = v.message.unwrap_or_else(|| "Nombre inválido.".to_string());
                        self.re_prompt(msg, MessageContent::Input).await;
                    }
                }
            }
            FlowState::ReportLastname => {
                let v = validate_name(value);
                match v.value {
                    Some(apellido) if v.is_valid => {
                        let apellido = capitalize_words(&apellido);
                        self.track_field("apellido", &apellido);
                        self.report_draft.apellido = Some(apellido);
                        self.transition_to(FlowState::ReportNicknames).await;
                    }
                    _ => {
                        let msg = v.message.unwrap_or_else(|| "Apellido inválido.".to_string());
                        self.re_prompt(msg, MessageContent::Input).await;
                    }
                }
            }
            FlowState::ReportNicknames => {
                if value != "omitir" && value != "no" {
                    self.report_draft.nick_names = value.split(',')
                                                        .map(|s| capitalize_words(s.trim()))
                                                        .filter(|s| !s.is_empty())
                                                        .collect();
                    let apodos = self.report_draft.nick_names.join(", ");
                    self.track_field("nickNames", &apodos);
                }
                self.transition_to(FlowState::ReportIdType).await;
            }
            FlowState::ReportIdType => match IdType::from_value(value) {
                Some(tipo) => {
                    self.track_field("idType", value);
                    self.report_draft.id_type = Some(tipo);
                    self.transition_to(FlowState::ReportIdentification).await;
                }
                None => {
                    self.re_prompt("Elige el tipo de identificación:",
                                   MessageContent::Options { options: opciones_id_type() })
                        .await;
                }
            },
            FlowState::ReportIdentification => {
                let Some(tipo) = self.report_draft.id_type else {
                    self.transition_to(FlowState::ReportIdType).await;
                    return Ok(());
                };
                let v = validate_identification(value, tipo);
                if !v.is_valid {
                    let msg = v.message.unwrap_or_else(|| "Identificación inválida.".to_string());
                    self.re_prompt(msg, MessageContent::Input).await;
                    return Ok(());
                }
                let normalizada = v.value.unwrap_or_else(|| value.to_string());
                // El backend puede rechazar un valor que localmente pasa.
                if let Some(remota) = self.remote_check("identificacion", &normalizada).await {
                    if !remota.is_valid {
                        let msg = remota.message
                                        .unwrap_or_else(|| "Esa identificación no es válida.".to_string());
                        self.re_prompt(msg, MessageContent::Input).await;
                        return Ok(());
                    }
                }
                self.track_field("identificacion", &normalizada);
                self.report_draft.identificacion = Some(normalizada);
                self.transition_to(FlowState::ReportPhoneCode).await;
            }
            FlowState::ReportPhoneCode => {
                let v = validate_country_code(value);
                match v.value {
                    Some(code) if v.is_valid => {
                        self.track_field("countryCode", &code);
                        self.report_draft.telefono = Some(Phone { country_code: code,
                                                                  number: String::new() });
                        self.transition_to(FlowState::ReportPhone).await;
                    }
                    _ => {
                        let msg = v.message.unwrap_or_else(|| "Código inválido.".to_string());
                        self.re_prompt(msg, MessageContent::Options { options: prefijo_options().to_vec() })
                            .await;
                    }
                }
            }
            FlowState::ReportPhone => {
                let code = self.report_draft.telefono.as_ref()
                               .map(|p| p.country_code.clone())
                               .unwrap_or_default();
                let v = validate_phone_number(&code, value);
                match v.value {
                    Some(numero) if v.is_valid => {
                        self.track_field("telefono", &numero);
                        if let Some(phone) = self.report_draft.telefono.as_mut() {
                            phone.number = numero;
                        }
                        self.transition_to(FlowState::ReportEmail).await;
                    }
                    _ => {
                        let msg = v.message.unwrap_or_else(|| "Teléfono inválido.".to_string());
                        self.re_prompt(msg, MessageContent::Input).await;
                    }
                }
            }
            FlowState::ReportEmail => {
                if value == "omitir" || value == "no" {
                    self.transition_to(FlowState::ReportGender).await;
                    return Ok(());
                }
                let v = validate_email(value);
                if !v.is_valid {
                    let msg = v.message.unwrap_or_else(|| "Email inválido.".to_string());
                    self.re_prompt(msg, MessageContent::Input).await;
                    return Ok(());
                }
                let email = v.value.unwrap_or_else(|| value.to_lowercase());
                if let Some(remota) = self.remote_check("email", &email).await {
                    if !remota.is_valid {
                        let msg = remota.message.unwrap_or_else(|| "Ese email no es válido.".to_string());
                        self.re_prompt(msg, MessageContent::Input).await;
                        return Ok(());
                    }
                }
                self.track_field("email", &email);
                self.report_draft.email = Some(email);
                self.transition_to(FlowState::ReportGender).await;
            }
            FlowState::ReportGender => match Genero::from_value(value) {
                Some(genero) => {
                    self.track_field("genero", value);
                    self.report_draft.genero = Some(genero);
                    self.transition_to(FlowState::ReportNationality).await;
                }
                None => {
                    self.re_prompt("Elige una opción de género:",
                                   MessageContent::Options { options: opciones_genero() })
                        .await;
                }
            },
            FlowState::ReportNationality => {
                if value != "omitir" {
                    let v = validate_name(value);
                    if !v.is_valid {
                        // Se ofrecen alternativas del catálogo según lo escrito.
                        let sugeridas = self.suggestions.suggest("nacionalidad", value, None).await;
                        let options: Vec<MessageOption> =
                            sugeridas.iter()
                                     .enumerate()
                                     .map(|(i, n)| MessageOption::new((i + 1).to_string(), n.clone(), n.clone()))
                                     .collect();
                        self.re_prompt("No reconocí esa nacionalidad. ¿Quisiste decir alguna de estas?",
                                       MessageContent::Options { options })
                            .await;
                        return Ok(());
                    }
                    let nacionalidad = v.value.map(|n| capitalize_words(&n));
                    if let Some(n) = &nacionalidad {
                        self.track_field("nacionalidad", n);
                    }
                    self.report_draft.nacionalidad = nacionalidad;
                }
                self.transition_to(FlowState::ReportEvaluations).await;
            }
            FlowState::ReportEvaluations => self.handle_evaluation(value).await?,
            FlowState::ReportComments => {
                if value != "omitir" && value != "no" {
                    let comentarios = normalize_comment(value);
                    self.track_field("comentariosAdicionales", &comentarios);
                    self.report_draft.comentarios = Some(comentarios);
                }
                self.transition_to(FlowState::Confirm).await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_evaluation(&mut self, value: &str) -> Result<()> {
        if let Some((key, _)) = self.report_draft.next_evaluation() {
            match EvaluationAnswer::from_value(value) {
                Some(respuesta) => {
                    self.track_field(key, value);
                    self.report_draft.evaluaciones.insert(key.to_string(), respuesta);
                    self.attempts = 0;
                    // Queda dentro del mismo estado hasta agotar el catálogo.
                    let msg = self.evaluation_prompt();
                    self.emit_bot(msg).await;
                }
                None => {
                    self.re_prompt("Responde con una de las opciones:",
                                   MessageContent::Options { options: opciones_evaluacion() })
                        .await;
                }
            }
            return Ok(());
        }
        match Recommendation::from_value(value) {
            Some(recomendacion) => {
                self.track_field("recomendacion", value);
                self.report_draft.recomendacion = Some(recomendacion);
                self.transition_to(FlowState::ReportComments).await;
            }
            None => {
                self.re_prompt("Elige una recomendación:",
                               MessageContent::Options { options: opciones_recomendacion() })
                    .await;
            }
        }
        Ok(())
    }

    /// Resumen del reporte completo para la confirmación.
    pub(crate) fn report_summary(&self) -> String {
        let d = &self.report_draft;
        let telefono = d.telefono.as_ref()
                        .map(|p| format!("{} {}", p.country_code, p.number))
                        .unwrap_or_else(|| "—".to_string());
        let apodos = if d.nick_names.is_empty() { "—".to_string() } else { d.nick_names.join(", ") };
        format!("• Nombre: {} {}\n• Apodos: {}\n• {}: {}\n• Teléfono: {}\n• Email: {}\n• Género: {}\n\
                 • Nacionalidad: {}\n• Evaluaciones respondidas: {}\n• Recomendación: {}\n• Comentarios: {}",
                d.nombre.as_deref().unwrap_or("—"),
                d.apellido.as_deref().unwrap_or("—"),
                apodos,
                d.id_type.map(|t| t.label()).unwrap_or("Identificación"),
                d.identificacion.as_deref().unwrap_or("—"),
                telefono,
                d.email.as_deref().unwrap_or("notiene@email.com"),
                d.genero.map(|g| g.label()).unwrap_or("Sin datos"),
                d.nacionalidad.as_deref().unwrap_or("—"),
                d.evaluaciones.len(),
                d.recomendacion.map(|r| r.label()).unwrap_or("—"),
                d.comentarios.as_deref().unwrap_or("—"))
    }
}
