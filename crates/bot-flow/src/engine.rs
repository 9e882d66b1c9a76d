// Archivo: engine.rs
// Propósito: motor de la conversación. Mantiene el estado vigente, el
// historial para retroceder, los borradores y la transcripción; delega
// en los módulos de `flows` el procesamiento por estado.
//
// Reglas centrales:
// - Una transición fuera de la tabla de adyacencia se rechaza y se
//   registra; nunca es fatal.
// - Cada paso exitoso agrega exactamente un mensaje del bot, tras una
//   demora de tipeo proporcional al largo del texto.
// - El procesamiento de entradas está serializado con una bandera de
//   ocupado; una llamada reentrante se rechaza con warning.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bot_client::BotApi;
use bot_domain::{ExpressDraft, Message, MessageContent, MessageOption, ReportDraft, SearchDraft,
                 Session, UserInfo};

use crate::errors::{FlowError, Result};
use crate::intent::Intent;
use crate::session::SessionSnapshot;
use crate::states::{FlowKind, FlowState};
use crate::storage::SessionStore;
use crate::suggestions::SuggestionProvider;
use crate::tracking::{fire_and_forget, TrackingSink};
use crate::transcript::Transcript;

/// Parámetros de la demora de tipeo simulada.
///
/// La demora es `base + (len/50, tope 5) * por_bloque`, nunca menor que
/// `minimo`. `instant()` la anula para pruebas.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub typing_base_ms: u64,
    pub typing_block_ms: u64,
    pub typing_min_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { typing_base_ms: 500, typing_block_ms: 400, typing_min_ms: 300 }
    }
}

impl EngineConfig {
    /// Sin demoras: para pruebas y usos no interactivos.
    pub fn instant() -> Self {
        Self { typing_base_ms: 0, typing_block_ms: 0, typing_min_ms: 0 }
    }

    fn typing_delay_ms(&self, text_len: usize) -> u64 {
        let bloques = (text_len / 50).min(5) as u64;
        (self.typing_base_ms + bloques * self.typing_block_ms).max(self.typing_min_ms)
    }
}

/// Entrada del historial: estado y borradores tal como estaban antes de
/// la transición que la empujó.
struct HistoryEntry {
    state: FlowState,
    report: ReportDraft,
    express: ExpressDraft,
    search: SearchDraft,
}

/// Motor conversacional.
pub struct ChatEngine {
    pub(crate) api: Arc<dyn BotApi>,
    store: Arc<dyn SessionStore>,
    pub(crate) tracker: Arc<dyn TrackingSink>,
    pub(crate) suggestions: SuggestionProvider,
    config: EngineConfig,
    pub(crate) session: Session,
    pub(crate) state: FlowState,
    history: Vec<HistoryEntry>,
    pub(crate) transcript: Transcript,
    pub(crate) report_draft: ReportDraft,
    pub(crate) express_draft: ExpressDraft,
    pub(crate) search_draft: SearchDraft,
    pub(crate) active_flow: FlowKind,
    /// Resultados de la última búsqueda (efímeros, no se persisten).
    pub(crate) search_hits: Vec<bot_domain::SearchHit>,
    pub(crate) attempts: u32,
    pub(crate) fault_text: Option<String>,
    pub(crate) last_report_id: Option<String>,
    busy: AtomicBool,
}

impl ChatEngine {
    pub fn new(api: Arc<dyn BotApi>,
               store: Arc<dyn SessionStore>,
               tracker: Arc<dyn TrackingSink>,
               user: Option<UserInfo>,
               config: EngineConfig)
               -> Self {
        let suggestions = SuggestionProvider::new(Arc::clone(&api));
        Self { api,
               store,
               tracker,
               suggestions,
               config,
               session: Session::new(user),
               state: FlowState::Menu,
               history: Vec::new(),
               transcript: Transcript::new(),
               report_draft: ReportDraft::default(),
               express_draft: ExpressDraft::default(),
               search_draft: SearchDraft::default(),
               active_flow: FlowKind::Ninguno,
               search_hits: Vec::new(),
               attempts: 0,
               fault_text: None,
               last_report_id: None,
               busy: AtomicBool::new(false) }
    }

    /// Arranca la conversación: restaura el snapshot vigente o entra al
    /// menú; registra la conversación en el backend si hay usuario.
    pub async fn start(&mut self) -> Result<()> {
        let restored = match SessionSnapshot::load(self.store.as_ref()) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("no se pudo leer el snapshot de sesión: {}", e);
                None
            }
        };

        match restored {
            // Solo se retoma si el usuario guardado es el mismo conectado.
            Some(snapshot) if snapshot.session.user == self.session.user => {
                log::info!("sesión retomada en estado {:?}", snapshot.state);
                self.session = snapshot.session;
                self.state = snapshot.state;
                self.report_draft = snapshot.report_draft;
                self.express_draft = snapshot.express_draft;
                self.search_draft = snapshot.search_draft;
                self.active_flow = self.derive_flow();
                self.transcript.restore(snapshot.messages);
                if !self.transcript.last().map(|m| m.expects_response).unwrap_or(false) {
                    self.emit_prompt(self.state).await;
                }
            }
            Some(_) => {
                log::info!("el usuario cambió desde el último snapshot; se parte de cero");
                SessionSnapshot::discard(self.store.as_ref()).ok();
                self.enter_menu().await;
            }
            None => self.enter_menu().await,
        }

        if self.session.is_authenticated() && self.session.backend_session_id.is_none() {
            let session_id = self.session.session_id.to_string();
            match self.tracker.conversation_started(&session_id).await {
                Ok(backend_id) => self.session.backend_session_id = backend_id,
                Err(e) => log::warn!("no se pudo registrar la conversación (se continúa): {}", e),
            }
        }

        self.persist_quietly();
        Ok(())
    }

    /// Sesión actual (solo lectura).
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Estado vigente.
    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Ventana visible de la transcripción.
    pub fn visible_messages(&self) -> &[Message] {
        self.transcript.visible()
    }

    /// Total de mensajes acumulados (para paginar la salida).
    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }

    /// Borrador del reporte completo (solo lectura, para inspección).
    pub fn report_draft(&self) -> &ReportDraft {
        &self.report_draft
    }

    /// Borrador del reporte express (solo lectura).
    pub fn express_draft(&self) -> &ExpressDraft {
        &self.express_draft
    }

    /// Cambia el usuario conectado. Un cambio a mitad de un flujo aborta
    /// al menú (por ejemplo un logout desde otra pestaña).
    pub async fn set_user(&mut self, user: Option<UserInfo>) {
        if self.session.user == user {
            return;
        }
        log::warn!("el usuario cambió durante la conversación; se vuelve al menú");
        self.session.user = user;
        self.session.backend_session_id = None;
        self.reset_to_menu().await;
    }

    /// Procesa una entrada del usuario. `option` (si eligió un botón)
    /// tiene precedencia sobre el texto libre.
    pub async fn process_input(&mut self, raw: &str, option: Option<MessageOption>) -> Result<()> {
        if self.busy.swap(true, Ordering::SeqCst) {
            log::warn!("entrada descartada: la sesión ya está procesando otra");
            return Err(FlowError::Busy);
        }
        let result = self.process_inner(raw, option).await;
        self.session.touch();
        self.persist_quietly();
        self.busy.store(false, Ordering::SeqCst);
        result
    }

    async fn process_inner(&mut self, raw: &str, option: Option<MessageOption>) -> Result<()> {
        let texto = match &option {
            Some(o) => o.label.clone(),
            None => raw.trim().to_string(),
        };
        let mut value = match &option {
            Some(o) => o.value.clone(),
            None => raw.trim().to_string(),
        };
        self.transcript.push(Message::user(texto, option));

        // Las intenciones de control solo aplican al texto libre; un botón
        // ya trae su valor.
        if value == raw.trim() {
            match Intent::parse(&value) {
                Some(Intent::Menu) | Some(Intent::Cancel) => {
                    self.abandon_if_in_flow();
                    self.reset_to_menu().await;
                    return Ok(());
                }
                Some(Intent::Back) => {
                    if !self.go_back().await {
                        self.emit_bot(Message::bot("No hay un paso anterior. Escribe 'menu' para volver al inicio.",
                                                   MessageContent::Info,
                                                   false))
                            .await;
                    }
                    return Ok(());
                }
                Some(Intent::Help) => {
                    self.emit_help().await;
                    return Ok(());
                }
                Some(Intent::Yes) => value = "si".to_string(),
                Some(Intent::No) => value = "no".to_string(),
                None => {}
            }
        }

        match self.state {
            FlowState::Menu => self.handle_menu(&value).await,
            FlowState::SearchType | FlowState::SearchInput | FlowState::SearchResults => {
                self.handle_search_input(&value).await
            }
            FlowState::CreateReport
            | FlowState::ReportName
            | FlowState::ReportLastname
            | FlowState::ReportNicknames
            | FlowState::ReportIdType
            | FlowState::ReportIdentification
            | FlowState::ReportPhoneCode
            | FlowState::ReportPhone
            | FlowState::ReportEmail
            | FlowState::ReportGender
            | FlowState::ReportNationality
            | FlowState::ReportEvaluations
            | FlowState::ReportComments => self.handle_report_input(&value).await,
            FlowState::CreateExpress
            | FlowState::ExpressName
            | FlowState::ExpressLastname
            | FlowState::ExpressIdType
            | FlowState::ExpressIdentification
            | FlowState::ExpressPhoneCode
            | FlowState::ExpressPhone
            | FlowState::ExpressRatings
            | FlowState::ExpressRecommendation
            | FlowState::ExpressComments => self.handle_express_input(&value).await,
            FlowState::Confirm => self.handle_confirm(&value).await,
            FlowState::Fault => self.handle_fault(&value).await,
            FlowState::Complete => self.handle_complete(&value).await,
        }
    }

    /// Transición controlada por la tabla de adyacencia. Empuja el
    /// historial y emite el prompt del estado destino.
    pub async fn transition_to(&mut self, target: FlowState) -> bool {
        if !self.state.can_transition(target) {
            log::warn!("transición rechazada: {:?} -> {:?}", self.state, target);
            return false;
        }
        self.history.push(HistoryEntry { state: self.state,
                                         report: self.report_draft.clone(),
                                         express: self.express_draft.clone(),
                                         search: self.search_draft.clone() });
        self.state = target;
        self.attempts = 0;
        self.emit_prompt(target).await;
        true
    }

    /// Retrocede un paso restaurando estado y borradores.
    pub async fn go_back(&mut self) -> bool {
        let Some(entry) = self.history.pop() else {
            log::warn!("go_back sin historial; se ignora");
            return false;
        };
        self.state = entry.state;
        self.report_draft = entry.report;
        self.express_draft = entry.express;
        self.search_draft = entry.search;
        self.attempts = 0;
        self.emit_prompt(self.state).await;
        true
    }

    /// Vuelve al menú sin condiciones: limpia historial, borradores y
    /// contadores de intento.
    pub async fn reset_to_menu(&mut self) {
        self.history.clear();
        self.report_draft = ReportDraft::default();
        self.express_draft = ExpressDraft::default();
        self.search_draft = SearchDraft::default();
        self.active_flow = FlowKind::Ninguno;
        self.attempts = 0;
        self.fault_text = None;
        self.enter_menu().await;
    }

    async fn enter_menu(&mut self) {
        self.state = FlowState::Menu;
        self.emit_prompt(FlowState::Menu).await;
    }

    /// Opciones del menú según autenticación y rol.
    pub(crate) fn menu_options(&self) -> Vec<MessageOption> {
        if !self.session.is_authenticated() {
            return vec![MessageOption::new("1", "Iniciar sesión", "login"),
                        MessageOption::new("2", "Ayuda", "help")];
        }
        let mut entradas = vec![("Buscar reportes", "search")];
        if self.session.can_create_reports() {
            entradas.push(("Crear reporte completo", "create_report"));
            entradas.push(("Crear reporte express", "create_express"));
        }
        entradas.push(("Ir al panel", "navigate_dashboard"));
        entradas.push(("Ayuda", "help"));
        // Los ids se numeran después de filtrar por rol, sin huecos.
        entradas.into_iter()
                .enumerate()
                .map(|(i, (label, value))| MessageOption::new((i + 1).to_string(), label, value))
                .collect()
    }

    async fn handle_menu(&mut self, value: &str) -> Result<()> {
        match value {
            "search" => {
                if !self.session.can_search() {
                    self.emit_bot(Message::bot("Necesitas iniciar sesión para buscar reportes.",
                                               MessageContent::Info,
                                               false))
                        .await;
                    return Ok(());
                }
                self.active_flow = FlowKind::Busqueda;
                self.transition_to(FlowState::SearchType).await;
            }
            "create_report" | "create_express" => {
                if !self.session.can_create_reports() {
                    self.emit_bot(Message::bot("Tu cuenta no tiene permisos para crear reportes.",
                                               MessageContent::Info,
                                               false))
                        .await;
                    return Ok(());
                }
                if value == "create_report" {
                    self.active_flow = FlowKind::Reporte;
                    self.transition_to(FlowState::CreateReport).await;
                    self.transition_to(FlowState::ReportName).await;
                } else {
                    self.active_flow = FlowKind::Express;
                    self.transition_to(FlowState::CreateExpress).await;
                    self.transition_to(FlowState::ExpressName).await;
                }
            }
            "navigate_dashboard" => {
                self.emit_bot(Message::bot("Te llevo al panel. Cuando vuelvas, escribe 'menu'.",
                                           MessageContent::Info,
                                           false))
                    .await;
            }
            "login" => {
                self.emit_bot(Message::bot("Inicia sesión desde la aplicación y vuelve a escribirme.",
                                           MessageContent::Info,
                                           false))
                    .await;
            }
            "help" => self.emit_help().await,
            _ => {
                let options = self.menu_options();
                self.re_prompt("No entendí esa opción. Elige una del menú:",
                               MessageContent::Menu { options })
                    .await;
            }
        }
        Ok(())
    }

    async fn handle_complete(&mut self, value: &str) -> Result<()> {
        // Una calificación numérica al cierre se registra como feedback.
        if let Ok(rating) = value.parse::<u8>() {
            if (1..=5).contains(&rating) {
                if let Some(conversation_id) = self.session.backend_session_id.clone() {
                    let tracker = Arc::clone(&self.tracker);
                    fire_and_forget("feedback", async move {
                        tracker.feedback(&conversation_id, rating, None).await
                    });
                }
                self.emit_bot(Message::bot("¡Gracias por tu opinión! Te llevo al menú.",
                                           MessageContent::Info,
                                           false))
                    .await;
            }
        }
        self.reset_to_menu().await;
        Ok(())
    }

    async fn handle_fault(&mut self, value: &str) -> Result<()> {
        match value {
            "retry" => {
                match self.active_flow {
                    FlowKind::Busqueda => {
                        self.transition_to(FlowState::SearchInput).await;
                    }
                    _ => {
                        self.transition_to(FlowState::Confirm).await;
                    }
                }
            }
            "menu" | "cancelar" | "no" => {
                self.abandon_if_in_flow();
                self.reset_to_menu().await;
            }
            _ => {
                let options = fault_options();
                self.re_prompt("Elige una opción:", MessageContent::Fault { options }).await;
            }
        }
        Ok(())
    }

    /// Emite el prompt de entrada del estado. Cada estado agrega
    /// exactamente un mensaje del bot.
    pub(crate) async fn emit_prompt(&mut self, state: FlowState) {
        let msg = match state {
            FlowState::Menu => {
                let options = self.menu_options();
                let saludo = match &self.session.user {
                    Some(u) => format!("Hola {} 👋 ¿Qué quieres hacer?", u.email),
                    None => "Hola 👋 Para buscar o crear reportes necesitas iniciar sesión.".to_string(),
                };
                Message::bot(saludo, MessageContent::Menu { options }, true)
            }
            FlowState::Confirm => self.summary_message(),
            FlowState::Complete => {
                let texto = match &self.last_report_id {
                    Some(id) => format!("✅ Reporte guardado con éxito (id {}). Si quieres, califica la \
                                         experiencia del 1 al 5.",
                                        id),
                    None => "✅ Listo. Si quieres, califica la experiencia del 1 al 5.".to_string(),
                };
                let options = vec![MessageOption::new("1", "Volver al menú", "menu")];
                Message::bot(texto, MessageContent::Success { options }, true)
            }
            FlowState::Fault => {
                let detalle = self.fault_text.take().unwrap_or_else(|| "algo salió mal".to_string());
                let texto = format!("⚠️ No se pudo completar la operación: {}. ¿Qué quieres hacer?", detalle);
                Message::bot(texto, MessageContent::Fault { options: fault_options() }, true)
            }
            s if matches!(s.flow_kind(), FlowKind::Busqueda) => self.search_prompt(s),
            s if matches!(s.flow_kind(), FlowKind::Reporte) => self.report_prompt(s),
            s if matches!(s.flow_kind(), FlowKind::Express) => self.express_prompt(s),
            _ => Message::bot("...", MessageContent::Text, false),
        };
        self.emit_bot(msg).await;
    }

    /// Resumen previo a la confirmación, según el flujo activo.
    fn summary_message(&self) -> Message {
        let cuerpo = match self.active_flow {
            FlowKind::Express => self.express_summary(),
            _ => self.report_summary(),
        };
        let options = vec![MessageOption::new("1", "Sí, guardar", "confirmar"),
                           MessageOption::new("2", "No, cancelar", "cancelar")];
        Message::bot(format!("Revisa los datos antes de guardar:\n{}\n¿Confirmas?", cuerpo),
                     MessageContent::FormSummary { options },
                     true)
    }

    async fn handle_confirm(&mut self, value: &str) -> Result<()> {
        match value {
            "confirmar" | "si" => self.do_save().await,
            "cancelar" | "no" => {
                self.abandon_if_in_flow();
                self.reset_to_menu().await;
                Ok(())
            }
            _ => {
                let msg = self.summary_message();
                let (texto, contenido) = (msg.text, msg.content);
                self.re_prompt(texto, contenido).await;
                Ok(())
            }
        }
    }

    /// Un guardado por confirmación explícita. El reintento solo ocurre
    /// si el usuario lo elige en el estado `Fault`.
    async fn do_save(&mut self) -> Result<()> {
        self.emit_bot(Message::bot("Guardando reporte...", MessageContent::Loading, false)).await;

        let autor = match &self.session.user {
            Some(u) => u.clone(),
            None => {
                self.fault_text = Some("tu sesión expiró".to_string());
                self.transition_to(FlowState::Fault).await;
                return Ok(());
            }
        };

        let outcome = match self.active_flow {
            FlowKind::Express => match self.express_draft.to_payload(&autor) {
                Ok(payload) => self.api.create_express_report(&payload).await,
                Err(e) => return Err(e.into()),
            },
            _ => match self.report_draft.to_payload(&autor) {
                Ok(payload) => self.api.create_report(&payload).await,
                Err(e) => return Err(e.into()),
            },
        };

        match outcome {
            Ok(report_id) => {
                self.last_report_id = Some(report_id.clone());
                self.report_draft = ReportDraft::default();
                self.express_draft = ExpressDraft::default();
                if let Some(conversation_id) = self.session.backend_session_id.clone() {
                    let tracker = Arc::clone(&self.tracker);
                    fire_and_forget("conversation_completed", async move {
                        tracker.conversation_completed(&conversation_id, &report_id).await
                    });
                }
                self.transition_to(FlowState::Complete).await;
            }
            Err(e) => {
                log::warn!("el guardado falló: {}", e);
                self.fault_text = Some(e.to_string());
                self.transition_to(FlowState::Fault).await;
            }
        }
        Ok(())
    }

    /// Notifica en segundo plano que un campo del formulario quedó
    /// registrado. Igual que el resto del tracking, solo con
    /// conversación abierta y sin bloquear el flujo.
    pub(crate) fn track_field(&self, field: &str, value: &str) {
        if self.session.backend_session_id.is_none() {
            return;
        }
        let tracker = Arc::clone(&self.tracker);
        let field = field.to_string();
        let value = value.to_string();
        fire_and_forget("suggestion_used", async move {
            tracker.suggestion_used(&field, &value).await
        });
    }

    /// Registra el abandono del flujo en curso, si lo hay.
    fn abandon_if_in_flow(&self) {
        if self.active_flow == FlowKind::Ninguno {
            return;
        }
        let Some(conversation_id) = self.session.backend_session_id.clone() else {
            return;
        };
        let last_step = self.state.as_str().to_string();
        let tracker = Arc::clone(&self.tracker);
        fire_and_forget("conversation_abandoned", async move {
            tracker.conversation_abandoned(&conversation_id, &last_step).await
        });
    }

    async fn emit_help(&mut self) {
        self.emit_bot(Message::bot("Puedo ayudarte a buscar reportes de arrendatarios o a crear uno \
                                    nuevo. En cualquier momento escribe 'menu' para volver al inicio, \
                                    'volver' para retroceder un paso o 'cancelar' para salir.",
                                   MessageContent::Info,
                                   false))
            .await;
    }

    /// Re-pregunta en el mismo estado, con escalamiento cosmético del
    /// texto según los intentos acumulados. Nunca bloquea el avance.
    pub(crate) async fn re_prompt(&mut self, texto: impl Into<String>, content: MessageContent) {
        self.attempts += 1;
        let mut texto = texto.into();
        if self.attempts >= 3 {
            texto.push_str("\nRecuerda que puedes escribir 'menu' para volver al inicio.");
        }
        self.emit_bot(Message::bot(texto, content, true)).await;
    }

    /// Agrega un mensaje del bot tras la demora de tipeo simulada.
    pub(crate) async fn emit_bot(&mut self, message: Message) {
        let delay = self.config.typing_delay_ms(message.text.chars().count());
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.transcript.push(message);
    }

    /// Validación remota de un campo; un fallo del backend se traga y
    /// vale el resultado local.
    pub(crate) async fn remote_check(&self, field: &str, value: &str) -> Option<bot_client::RemoteValidation> {
        match self.api.validate_field(field, value).await {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("validación remota de '{}' falló (vale la local): {}", field, e);
                None
            }
        }
    }

    fn derive_flow(&self) -> FlowKind {
        match self.state.flow_kind() {
            FlowKind::Ninguno => {
                if self.express_draft != ExpressDraft::default() {
                    FlowKind::Express
                } else if self.report_draft != ReportDraft::default() {
                    FlowKind::Reporte
                } else if self.search_draft != SearchDraft::default() {
                    FlowKind::Busqueda
                } else {
                    FlowKind::Ninguno
                }
            }
            kind => kind,
        }
    }

    fn persist_quietly(&self) {
        let snapshot = SessionSnapshot { session: self.session.clone(),
                                         state: self.state,
                                         report_draft: self.report_draft.clone(),
                                         express_draft: self.express_draft.clone(),
                                         search_draft: self.search_draft.clone(),
                                         messages: self.transcript.snapshot_tail(),
                                         saved_at: chrono::Utc::now() };
        if let Err(e) = snapshot.save(self.store.as_ref()) {
            log::warn!("no se pudo persistir la sesión (se continúa): {}", e);
        }
    }
}

fn fault_options() -> Vec<MessageOption> {
    vec![MessageOption::new("1", "Reintentar", "retry"),
         MessageOption::new("2", "Volver al menú", "menu")]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn la_demora_crece_con_el_largo_y_tiene_piso() {
        let c = EngineConfig::default();
        assert_eq!(c.typing_delay_ms(10), 500);
        assert_eq!(c.typing_delay_ms(100), 500 + 2 * 400);
        // El tope de bloques es 5 aunque el texto sea enorme.
        assert_eq!(c.typing_delay_ms(10_000), 500 + 5 * 400);
        let instantaneo = EngineConfig::instant();
        assert_eq!(instantaneo.typing_delay_ms(10_000), 0);
    }

    #[test]
    fn la_demora_respeta_el_minimo() {
        let c = EngineConfig { typing_base_ms: 100, typing_block_ms: 0, typing_min_ms: 300 };
        assert_eq!(c.typing_delay_ms(1), 300);
    }
}
