// Pruebas de integración del motor: pipelines completos conducidos con
// los stubs en memoria y sin demoras de tipeo.
use std::sync::atomic::Ordering;
use std::sync::Arc;

use bot_client::BotApi;
use bot_domain::{Role, SearchHit, UserInfo};
use bot_flow::stubs::{InMemoryStore, RecordingTracker, StubBotApi};
use bot_flow::{ChatEngine, EngineConfig, FlowState, SessionSnapshot, SessionStore, TrackingSink};

fn owner() -> UserInfo {
    UserInfo { uid: "u-owner".to_string(), email: "owner@mail.com".to_string(), role: Role::Owner }
}

struct Harness {
    api: Arc<StubBotApi>,
    tracker: Arc<RecordingTracker>,
    store: Arc<InMemoryStore>,
    engine: ChatEngine,
}

async fn harness(user: Option<UserInfo>) -> Harness {
    let api = Arc::new(StubBotApi::new());
    let tracker = Arc::new(RecordingTracker::new());
    let store = Arc::new(InMemoryStore::new());
    let mut engine = ChatEngine::new(Arc::clone(&api) as Arc<dyn BotApi>,
                                     Arc::clone(&store) as Arc<dyn SessionStore>,
                                     Arc::clone(&tracker) as Arc<dyn TrackingSink>,
                                     user,
                                     EngineConfig::instant());
    engine.start().await.expect("el arranque no debe fallar");
    Harness { api, tracker, store, engine }
}

async fn say(engine: &mut ChatEngine, texto: &str) {
    engine.process_input(texto, None).await.expect("la entrada no debe fallar");
}

/// Cede el control para que corran las tareas de tracking en segundo plano.
async fn drain_background() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn una_transicion_fuera_de_tabla_se_rechaza_sin_cambiar_estado() {
    let mut h = harness(Some(owner())).await;
    assert_eq!(h.engine.state(), FlowState::Menu);
    assert!(!h.engine.transition_to(FlowState::ReportName).await);
    assert_eq!(h.engine.state(), FlowState::Menu);
}

#[tokio::test]
async fn retroceder_sin_historial_devuelve_false() {
    let mut h = harness(Some(owner())).await;
    assert!(!h.engine.go_back().await);
    assert_eq!(h.engine.state(), FlowState::Menu);
}

#[tokio::test]
async fn el_reporte_completo_guarda_una_sola_vez() {
    let mut h = harness(Some(owner())).await;

    say(&mut h.engine, "create_report").await;
    assert_eq!(h.engine.state(), FlowState::ReportName);

    say(&mut h.engine, "juan").await;
    say(&mut h.engine, "pérez").await;
    say(&mut h.engine, "Juanito, el juana").await;
    say(&mut h.engine, "rut").await;
    say(&mut h.engine, "12.345.678-5").await;
    say(&mut h.engine, "+56").await;
    say(&mut h.engine, "912345678").await;
    say(&mut h.engine, "omitir").await; // email
    say(&mut h.engine, "masculino").await;
    say(&mut h.engine, "Chilena").await;
    assert_eq!(h.engine.state(), FlowState::ReportEvaluations);

    // Dieciocho evaluaciones y la recomendación final.
    for _ in 0..18 {
        say(&mut h.engine, "si").await;
    }
    say(&mut h.engine, "si").await;
    assert_eq!(h.engine.state(), FlowState::ReportComments);

    say(&mut h.engine, "pagó siempre puntual").await;
    assert_eq!(h.engine.state(), FlowState::Confirm);

    say(&mut h.engine, "confirmar").await;
    assert_eq!(h.engine.state(), FlowState::Complete);
    assert_eq!(h.api.report_saves.load(Ordering::SeqCst), 1);

    let payload = h.api.last_report.lock().unwrap().clone().expect("hubo un guardado");
    assert_eq!(payload.creado_por, "chatbot");
    assert_eq!(payload.version, "2.0");
    assert_eq!(payload.email, "notiene@email.com");
    assert_eq!(payload.nombre, "Juan");
    assert_eq!(payload.identificacion, "12345.678-5");
    assert_eq!(payload.telefono[0].country_code, "+56");
    assert_eq!(payload.nick_names, vec!["Juanito", "El Juana"]);
    assert_eq!(payload.evaluaciones.len(), 18);

    // El borrador quedó limpio tras el guardado.
    assert!(h.engine.report_draft().nombre.is_none());
    assert!(h.engine.report_draft().evaluaciones.is_empty());
}

#[tokio::test]
async fn un_telefono_invalido_repregunta_sin_mover_el_paso() {
    let mut h = harness(Some(owner())).await;
    say(&mut h.engine, "create_report").await;
    say(&mut h.engine, "juan").await;
    say(&mut h.engine, "pérez").await;
    say(&mut h.engine, "omitir").await;
    say(&mut h.engine, "rut").await;
    say(&mut h.engine, "12.345.678-5").await;
    say(&mut h.engine, "+56").await;
    assert_eq!(h.engine.state(), FlowState::ReportPhone);

    let draft_antes = h.engine.report_draft().clone();
    say(&mut h.engine, "abc").await;
    assert_eq!(h.engine.state(), FlowState::ReportPhone);
    assert_eq!(h.engine.report_draft(), &draft_antes);

    let ultimo = h.engine.visible_messages().last().unwrap();
    assert!(ultimo.expects_response);
}

#[tokio::test]
async fn el_express_promedia_las_calificaciones_y_llega_a_confirmar() {
    let mut h = harness(Some(owner())).await;
    say(&mut h.engine, "create_express").await;
    say(&mut h.engine, "ana").await;
    say(&mut h.engine, "soto").await;
    say(&mut h.engine, "cedula").await;
    say(&mut h.engine, "1234567").await;
    say(&mut h.engine, "+57").await;
    say(&mut h.engine, "3001234567").await;
    assert_eq!(h.engine.state(), FlowState::ExpressRatings);

    for nota in ["1", "5", "3", "4", "2"] {
        say(&mut h.engine, nota).await;
    }
    assert_eq!(h.engine.state(), FlowState::ExpressRecommendation);
    assert!((h.engine.express_draft().average_rating() - 3.0).abs() < f64::EPSILON);

    say(&mut h.engine, "a_criterio").await;
    say(&mut h.engine, "omitir").await;
    assert_eq!(h.engine.state(), FlowState::Confirm);

    let resumen = h.engine.visible_messages().last().unwrap();
    assert!(resumen.text.contains("3.0"), "el resumen muestra el promedio: {}", resumen.text);

    say(&mut h.engine, "confirmar").await;
    assert_eq!(h.engine.state(), FlowState::Complete);
    assert_eq!(h.api.express_saves.load(Ordering::SeqCst), 1);
    let payload = h.api.last_express.lock().unwrap().clone().unwrap();
    assert!((payload.promedio - 3.0).abs() < f64::EPSILON);
    assert_eq!(payload.evaluation_count, 1);
}

#[tokio::test]
async fn una_calificacion_fuera_de_rango_repregunta() {
    let mut h = harness(Some(owner())).await;
    say(&mut h.engine, "create_express").await;
    say(&mut h.engine, "ana").await;
    say(&mut h.engine, "soto").await;
    say(&mut h.engine, "cedula").await;
    say(&mut h.engine, "1234567").await;
    say(&mut h.engine, "+57").await;
    say(&mut h.engine, "3001234567").await;

    say(&mut h.engine, "7").await;
    assert_eq!(h.engine.state(), FlowState::ExpressRatings);
    assert!(h.engine.express_draft().ratings.is_empty());
}

#[tokio::test]
async fn la_busqueda_cae_a_fault_y_se_reintenta_por_eleccion_explicita() {
    let mut h = harness(Some(owner())).await;
    say(&mut h.engine, "search").await;
    assert_eq!(h.engine.state(), FlowState::SearchType);
    say(&mut h.engine, "nombre").await;
    assert_eq!(h.engine.state(), FlowState::SearchInput);

    h.api.fail_remote.store(true, Ordering::SeqCst);
    say(&mut h.engine, "Juan").await;
    assert_eq!(h.engine.state(), FlowState::Fault);

    h.api.fail_remote.store(false, Ordering::SeqCst);
    h.api.search_results.lock().unwrap().push(SearchHit { id: "r1".to_string(),
                                                          nombre: "Juan".to_string(),
                                                          apellido: "Pérez".to_string(),
                                                          identificacion: "12345.678-5".to_string(),
                                                          report_type: "standard".to_string() });

    say(&mut h.engine, "retry").await;
    assert_eq!(h.engine.state(), FlowState::SearchInput);
    say(&mut h.engine, "Juan").await;
    assert_eq!(h.engine.state(), FlowState::SearchResults);

    let ultimo = h.engine.visible_messages().last().unwrap();
    assert!(ultimo.text.contains("1 reporte"));
}

#[tokio::test]
async fn cancelar_a_mitad_de_flujo_limpia_el_borrador() {
    let mut h = harness(Some(owner())).await;
    say(&mut h.engine, "create_report").await;
    say(&mut h.engine, "juan").await;
    assert!(h.engine.report_draft().nombre.is_some());

    say(&mut h.engine, "cancelar").await;
    assert_eq!(h.engine.state(), FlowState::Menu);
    assert!(h.engine.report_draft().nombre.is_none());
}

#[tokio::test]
async fn sin_permisos_no_se_entra_a_crear() {
    let usuario = UserInfo { uid: "u-comun".to_string(),
                             email: "comun@mail.com".to_string(),
                             role: Role::Usuario };
    let mut h = harness(Some(usuario)).await;
    say(&mut h.engine, "create_report").await;
    assert_eq!(h.engine.state(), FlowState::Menu);
    assert_eq!(h.api.report_saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn el_menu_anonimo_solo_ofrece_login_y_ayuda() {
    let h = harness(None).await;
    let menu = h.engine.visible_messages().last().unwrap();
    let opciones = menu.options().expect("el menú trae opciones");
    let valores: Vec<&str> = opciones.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(valores, vec!["login", "help"]);
}

#[tokio::test]
async fn el_rechazo_remoto_pesa_mas_que_la_validacion_local() {
    let mut h = harness(Some(owner())).await;
    h.api.rejections.lock().unwrap().insert(("identificacion".to_string(), "12345.678-5".to_string()),
                                            "identificación bloqueada".to_string());

    say(&mut h.engine, "create_report").await;
    say(&mut h.engine, "juan").await;
    say(&mut h.engine, "pérez").await;
    say(&mut h.engine, "omitir").await;
    say(&mut h.engine, "rut").await;
    say(&mut h.engine, "12.345.678-5").await;

    assert_eq!(h.engine.state(), FlowState::ReportIdentification);
    assert!(h.engine.report_draft().identificacion.is_none());
}

#[tokio::test]
async fn un_snapshot_viejo_se_descarta_y_se_parte_del_menu() {
    let h = harness(Some(owner())).await;

    // Se guarda a mano un snapshot con fecha de hace 25 horas.
    let raw = h.store.get(bot_flow::SESSION_KEY).unwrap().unwrap();
    let mut snapshot: SessionSnapshot = serde_json::from_str(&raw).unwrap();
    snapshot.state = FlowState::ReportEmail;
    snapshot.saved_at = chrono::Utc::now() - chrono::Duration::hours(25);
    snapshot.save(h.store.as_ref() as &dyn SessionStore).unwrap();

    let mut engine2 = ChatEngine::new(Arc::clone(&h.api) as Arc<dyn BotApi>,
                                      Arc::clone(&h.store) as Arc<dyn SessionStore>,
                                      Arc::clone(&h.tracker) as Arc<dyn TrackingSink>,
                                      Some(owner()),
                                      EngineConfig::instant());
    engine2.start().await.unwrap();
    assert_eq!(engine2.state(), FlowState::Menu);
}

#[tokio::test]
async fn un_snapshot_vigente_reanuda_donde_quedo() {
    let h = harness(Some(owner())).await;
    let mut engine = h.engine;
    say(&mut engine, "create_report").await;
    say(&mut engine, "juan").await;
    assert_eq!(engine.state(), FlowState::ReportLastname);
    drop(engine);

    let mut engine2 = ChatEngine::new(Arc::clone(&h.api) as Arc<dyn BotApi>,
                                      Arc::clone(&h.store) as Arc<dyn SessionStore>,
                                      Arc::clone(&h.tracker) as Arc<dyn TrackingSink>,
                                      Some(owner()),
                                      EngineConfig::instant());
    engine2.start().await.unwrap();
    assert_eq!(engine2.state(), FlowState::ReportLastname);
    assert_eq!(engine2.report_draft().nombre.as_deref(), Some("Juan"));
}

#[tokio::test]
async fn cada_campo_guardado_notifica_al_tracking() {
    let mut h = harness(Some(owner())).await;
    say(&mut h.engine, "create_report").await;
    say(&mut h.engine, "juan").await;
    say(&mut h.engine, "pérez").await;
    drain_background().await;

    let eventos = h.tracker.events.lock().unwrap().clone();
    assert!(eventos.contains(&"suggestion:nombre:Juan".to_string()), "eventos: {:?}", eventos);
    assert!(eventos.contains(&"suggestion:apellido:Pérez".to_string()), "eventos: {:?}", eventos);
}

#[tokio::test]
async fn una_entrada_invalida_no_notifica_al_tracking() {
    let mut h = harness(Some(owner())).await;
    say(&mut h.engine, "create_report").await;
    say(&mut h.engine, "x").await; // nombre demasiado corto
    drain_background().await;

    let eventos = h.tracker.events.lock().unwrap().clone();
    assert!(!eventos.iter().any(|e| e.starts_with("suggestion:")), "eventos: {:?}", eventos);
}

#[tokio::test]
async fn el_menu_de_un_usuario_comun_numera_sin_huecos() {
    let usuario = UserInfo { uid: "u-comun".to_string(),
                             email: "comun@mail.com".to_string(),
                             role: Role::Usuario };
    let h = harness(Some(usuario)).await;
    let menu = h.engine.visible_messages().last().unwrap();
    let opciones = menu.options().expect("el menú trae opciones");
    let ids: Vec<&str> = opciones.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    let valores: Vec<&str> = opciones.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(valores, vec!["search", "navigate_dashboard", "help"]);
}

#[tokio::test]
async fn el_tracking_caido_no_interrumpe_el_flujo() {
    let api = Arc::new(StubBotApi::new());
    let tracker = Arc::new(RecordingTracker::new());
    tracker.fail.store(true, Ordering::SeqCst);
    let store = Arc::new(InMemoryStore::new());
    let mut engine = ChatEngine::new(Arc::clone(&api) as Arc<dyn BotApi>,
                                     Arc::clone(&store) as Arc<dyn SessionStore>,
                                     Arc::clone(&tracker) as Arc<dyn TrackingSink>,
                                     Some(owner()),
                                     EngineConfig::instant());
    engine.start().await.unwrap();
    assert_eq!(engine.state(), FlowState::Menu);
    assert!(engine.session().backend_session_id.is_none());

    say(&mut engine, "create_report").await;
    assert_eq!(engine.state(), FlowState::ReportName);
}
