// Archivo: intent.rs
// Propósito: intenciones de control reconocidas en texto libre. Se
// evalúan antes que el procesador del estado actual.
/// Intención de control detectada en la entrada del usuario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Volver al menú principal.
    Menu,
    /// Retroceder un paso.
    Back,
    /// Pedir ayuda contextual.
    Help,
    /// Cancelar el flujo en curso.
    Cancel,
    /// Afirmación.
    Yes,
    /// Negación.
    No,
}

impl Intent {
    /// Reconoce una intención en el texto, si la hay.
    pub fn parse(raw: &str) -> Option<Intent> {
        let palabra = raw.trim().to_lowercase();
        match palabra.as_str() {
            "menu" | "menú" | "inicio" => Some(Intent::Menu),
            "volver" | "atras" | "atrás" => Some(Intent::Back),
            "ayuda" | "help" | "?" => Some(Intent::Help),
            "cancelar" | "salir" | "exit" => Some(Intent::Cancel),
            "si" | "sí" | "yes" | "ok" | "vale" => Some(Intent::Yes),
            "no" | "nope" | "nada" => Some(Intent::No),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconoce_variantes_con_acento() {
        assert_eq!(Intent::parse("Menú"), Some(Intent::Menu));
        assert_eq!(Intent::parse("atrás"), Some(Intent::Back));
        assert_eq!(Intent::parse(" SÍ "), Some(Intent::Yes));
    }

    #[test]
    fn texto_comun_no_es_intencion() {
        assert_eq!(Intent::parse("Juan"), None);
        assert_eq!(Intent::parse("no se"), None);
    }
}
