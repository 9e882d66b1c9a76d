use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use bot_domain::{MessageContent, MessageOption, Role, Sender, UserInfo};
use bot_flow::{ChatEngine, EngineConfig, SessionStore, TrackingSink};

/// Chat interactivo por terminal que conduce el motor conversacional.
///
/// Por defecto usa el backend guionado en memoria; con la feature
/// `http_demo` (y `BOT_API_BASE_URL` definida) habla con el backend real.
/// El usuario se toma de `BOT_USER_EMAIL` / `BOT_USER_ROLE` (admin, owner
/// o usuario); sin esas variables la sesión es anónima.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let store: Arc<dyn SessionStore> = Arc::new(bot_persistence::new_from_env()?);
    let (api, tracker) = build_collaborators()?;
    let user = user_from_env();

    let mut engine = ChatEngine::new(api, store, tracker, user, EngineConfig::default());
    engine.start().await?;

    let mut printed = render_new_messages(&engine, 0);

    loop {
        let raw = prompt("> ")?;
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        if raw == "/quit" {
            println!("¡Hasta luego!");
            break;
        }

        // Un número elige la opción correspondiente del último mensaje.
        let option = resolve_option(&engine, raw);
        if let Err(e) = engine.process_input(raw, option).await {
            eprintln!("[error] {}", e);
        }
        printed = render_new_messages(&engine, printed);
    }

    Ok(())
}

fn build_collaborators()
    -> Result<(Arc<dyn bot_client::BotApi>, Arc<dyn TrackingSink>), Box<dyn Error>> {
    #[cfg(feature = "http_demo")]
    {
        let api: Arc<dyn bot_client::BotApi> = Arc::new(bot_client::HttpBotApi::new_from_env()?);
        let tracker: Arc<dyn TrackingSink> = Arc::new(bot_flow::ApiTracking::new(Arc::clone(&api)));
        Ok((api, tracker))
    }
    #[cfg(not(feature = "http_demo"))]
    {
        let api: Arc<dyn bot_client::BotApi> = Arc::new(bot_flow::stubs::StubBotApi::new());
        let tracker: Arc<dyn TrackingSink> = Arc::new(bot_flow::stubs::RecordingTracker::new());
        Ok((api, tracker))
    }
}

fn user_from_env() -> Option<UserInfo> {
    let email = std::env::var("BOT_USER_EMAIL").ok()?;
    let role = match std::env::var("BOT_USER_ROLE").ok()?.to_lowercase().as_str() {
        "admin" => Role::Admin,
        "owner" => Role::Owner,
        _ => Role::Usuario,
    };
    Some(UserInfo { uid: format!("cli-{}", email), email, role })
}

/// Si la entrada es un número y el último mensaje del bot ofrecía
/// opciones, la traduce a esa opción.
fn resolve_option(engine: &ChatEngine, raw: &str) -> Option<MessageOption> {
    let last_bot = engine.visible_messages()
                         .iter()
                         .rev()
                         .find(|m| m.sender == Sender::Bot)?;
    let options = last_bot.options()?;
    options.iter().find(|o| o.id == raw || o.value == raw).cloned()
}

/// Imprime los mensajes nuevos desde la última llamada y devuelve el
/// total ya mostrado.
fn render_new_messages(engine: &ChatEngine, printed: usize) -> usize {
    let total = engine.message_count();
    let visibles = engine.visible_messages();
    let nuevos = total.saturating_sub(printed).min(visibles.len());
    for m in &visibles[visibles.len() - nuevos..] {
        match m.sender {
            Sender::Bot => {
                println!("bot> {}", m.text);
                render_content(&m.content);
            }
            Sender::User => {}
        }
    }
    total
}

fn render_content(content: &MessageContent) {
    match content {
        MessageContent::SearchResults { hits, options } => {
            for h in hits {
                println!("     - {} {} ({}) [{}]", h.nombre, h.apellido, h.identificacion, h.report_type);
            }
            render_options(options);
        }
        MessageContent::Options { options }
        | MessageContent::Menu { options }
        | MessageContent::FormSummary { options }
        | MessageContent::Fault { options }
        | MessageContent::Success { options } => render_options(options),
        _ => {}
    }
}

fn render_options(options: &[MessageOption]) {
    for o in options {
        println!("     {}) {}", o.id, o.label);
    }
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}
