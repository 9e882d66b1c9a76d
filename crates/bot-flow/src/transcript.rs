// Archivo: transcript.rs
// Propósito: transcripción de la conversación. Solo se agrega al final;
// los mensajes no se modifican una vez incorporados.
use bot_domain::Message;

/// Cantidad de mensajes que expone `visible`.
const VENTANA_VISIBLE: usize = 50;

/// Cantidad de mensajes que viajan en el snapshot de sesión.
const VENTANA_SNAPSHOT: usize = 20;

/// Transcripción acumulativa de la conversación.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un mensaje al final. La transcripción pasa a ser su dueña.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Últimos mensajes para mostrar (ventana de 50).
    pub fn visible(&self) -> &[Message] {
        let desde = self.messages.len().saturating_sub(VENTANA_VISIBLE);
        &self.messages[desde..]
    }

    /// Últimos mensajes que se persisten en el snapshot (ventana de 20).
    pub fn snapshot_tail(&self) -> Vec<Message> {
        let desde = self.messages.len().saturating_sub(VENTANA_SNAPSHOT);
        self.messages[desde..].to_vec()
    }

    /// Último mensaje agregado, si existe.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Reemplaza el contenido completo (rehidratación desde snapshot).
    pub fn restore(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Vacía la transcripción (reinicio de conversación).
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bot_domain::{Message, MessageContent};

    fn bot_msg(i: usize) -> Message {
        Message::bot(format!("mensaje {}", i), MessageContent::Text, false)
    }

    #[test]
    fn visible_recorta_a_cincuenta() {
        let mut t = Transcript::new();
        for i in 0..120 {
            t.push(bot_msg(i));
        }
        let v = t.visible();
        assert_eq!(v.len(), 50);
        assert_eq!(v[0].text, "mensaje 70");
        assert_eq!(v[49].text, "mensaje 119");
    }

    #[test]
    fn snapshot_conserva_los_ultimos_veinte() {
        let mut t = Transcript::new();
        for i in 0..30 {
            t.push(bot_msg(i));
        }
        let tail = t.snapshot_tail();
        assert_eq!(tail.len(), 20);
        assert_eq!(tail[0].text, "mensaje 10");
    }

    #[test]
    fn transcripciones_cortas_se_exponen_completas() {
        let mut t = Transcript::new();
        t.push(bot_msg(0));
        assert_eq!(t.visible().len(), 1);
        assert_eq!(t.snapshot_tail().len(), 1);
    }
}
