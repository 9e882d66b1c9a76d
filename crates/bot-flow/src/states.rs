// Archivo: states.rs
// Propósito: estados de la conversación y su tabla de adyacencia. La
// tabla es estática: una transición fuera de ella se rechaza y se
// registra, nunca es fatal.
use serde::{Deserialize, Serialize};

/// Estado actual de la conversación. Hay exactamente uno vigente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Menu,
    SearchType,
    SearchInput,
    SearchResults,
    CreateReport,
    CreateExpress,
    ReportName,
    ReportLastname,
    ReportNicknames,
    ReportIdType,
    ReportIdentification,
    ReportPhoneCode,
    ReportPhone,
    ReportEmail,
    ReportGender,
    ReportNationality,
    ReportEvaluations,
    ReportComments,
    ExpressName,
    ExpressLastname,
    ExpressIdType,
    ExpressIdentification,
    ExpressPhoneCode,
    ExpressPhone,
    ExpressRatings,
    ExpressRecommendation,
    ExpressComments,
    Confirm,
    Complete,
    Fault,
}

/// Flujo al que pertenece un estado (para limpiar borradores y para el
/// registro de abandono).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Ninguno,
    Reporte,
    Express,
    Busqueda,
}

impl FlowState {
    /// Estados alcanzables desde `self` según la tabla de adyacencia.
    ///
    /// `reset_to_menu` y `go_back` no pasan por aquí: el primero es
    /// incondicional y el segundo restaura desde el historial.
    pub fn successors(&self) -> &'static [FlowState] {
        use FlowState::*;
        match self {
            Menu => &[SearchType, CreateReport, CreateExpress],
            SearchType => &[SearchInput, Menu],
            SearchInput => &[SearchResults, Fault],
            SearchResults => &[SearchInput, SearchType, Menu],
            CreateReport => &[ReportName],
            CreateExpress => &[ExpressName],
            ReportName => &[ReportLastname],
            ReportLastname => &[ReportNicknames],
            ReportNicknames => &[ReportIdType],
            ReportIdType => &[ReportIdentification],
            ReportIdentification => &[ReportPhoneCode],
            ReportPhoneCode => &[ReportPhone],
            ReportPhone => &[ReportEmail],
            ReportEmail => &[ReportGender],
            ReportGender => &[ReportNationality],
            ReportNationality => &[ReportEvaluations],
            ReportEvaluations => &[ReportComments],
            ReportComments => &[Confirm],
            ExpressName => &[ExpressLastname],
            ExpressLastname => &[ExpressIdType],
            ExpressIdType => &[ExpressIdentification],
            ExpressIdentification => &[ExpressPhoneCode],
            ExpressPhoneCode => &[ExpressPhone],
            ExpressPhone => &[ExpressRatings],
            ExpressRatings => &[ExpressRecommendation],
            ExpressRecommendation => &[ExpressComments],
            ExpressComments => &[Confirm],
            Confirm => &[Complete, Fault, Menu],
            Complete => &[Menu],
            Fault => &[Confirm, SearchInput, Menu],
        }
    }

    /// Verifica si la transición `self -> target` está permitida.
    pub fn can_transition(&self, target: FlowState) -> bool {
        self.successors().contains(&target)
    }

    /// Flujo al que pertenece el estado.
    pub fn flow_kind(&self) -> FlowKind {
        use FlowState::*;
        match self {
            SearchType | SearchInput | SearchResults => FlowKind::Busqueda,
            CreateReport | ReportName | ReportLastname | ReportNicknames | ReportIdType
            | ReportIdentification | ReportPhoneCode | ReportPhone | ReportEmail | ReportGender
            | ReportNationality | ReportEvaluations | ReportComments => FlowKind::Reporte,
            CreateExpress | ExpressName | ExpressLastname | ExpressIdType
            | ExpressIdentification | ExpressPhoneCode | ExpressPhone | ExpressRatings
            | ExpressRecommendation | ExpressComments => FlowKind::Express,
            Menu | Confirm | Complete | Fault => FlowKind::Ninguno,
        }
    }

    /// Nombre estable del estado (persistencia y tracking).
    pub fn as_str(&self) -> &'static str {
        use FlowState::*;
        match self {
            Menu => "menu",
            SearchType => "search_type",
            SearchInput => "search_input",
            SearchResults => "search_results",
            CreateReport => "create_report",
            CreateExpress => "create_express",
            ReportName => "report_name",
            ReportLastname => "report_lastname",
            ReportNicknames => "report_nicknames",
            ReportIdType => "report_id_type",
            ReportIdentification => "report_identification",
            ReportPhoneCode => "report_phone_code",
            ReportPhone => "report_phone",
            ReportEmail => "report_email",
            ReportGender => "report_gender",
            ReportNationality => "report_nationality",
            ReportEvaluations => "report_evaluations",
            ReportComments => "report_comments",
            ExpressName => "express_name",
            ExpressLastname => "express_lastname",
            ExpressIdType => "express_id_type",
            ExpressIdentification => "express_identification",
            ExpressPhoneCode => "express_phone_code",
            ExpressPhone => "express_phone",
            ExpressRatings => "express_ratings",
            ExpressRecommendation => "express_recommendation",
            ExpressComments => "express_comments",
            Confirm => "confirm",
            Complete => "complete",
            Fault => "fault",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_no_salta_directo_a_un_paso_interno() {
        assert!(!FlowState::Menu.can_transition(FlowState::ReportName));
        assert!(!FlowState::Menu.can_transition(FlowState::Confirm));
    }

    #[test]
    fn el_menu_abre_los_tres_flujos() {
        assert!(FlowState::Menu.can_transition(FlowState::SearchType));
        assert!(FlowState::Menu.can_transition(FlowState::CreateReport));
        assert!(FlowState::Menu.can_transition(FlowState::CreateExpress));
    }

    #[test]
    fn la_cadena_del_reporte_avanza_en_orden() {
        use FlowState::*;
        let cadena = [CreateReport, ReportName, ReportLastname, ReportNicknames, ReportIdType,
                      ReportIdentification, ReportPhoneCode, ReportPhone, ReportEmail,
                      ReportGender, ReportNationality, ReportEvaluations, ReportComments, Confirm];
        for par in cadena.windows(2) {
            assert!(par[0].can_transition(par[1]), "{:?} -> {:?}", par[0], par[1]);
        }
    }

    #[test]
    fn confirmar_permite_exito_falla_o_cancelar() {
        assert!(FlowState::Confirm.can_transition(FlowState::Complete));
        assert!(FlowState::Confirm.can_transition(FlowState::Fault));
        assert!(FlowState::Confirm.can_transition(FlowState::Menu));
        assert!(!FlowState::Confirm.can_transition(FlowState::ReportName));
    }

    #[test]
    fn cada_estado_conoce_su_flujo() {
        assert_eq!(FlowState::ReportEmail.flow_kind(), FlowKind::Reporte);
        assert_eq!(FlowState::ExpressRatings.flow_kind(), FlowKind::Express);
        assert_eq!(FlowState::SearchInput.flow_kind(), FlowKind::Busqueda);
        assert_eq!(FlowState::Menu.flow_kind(), FlowKind::Ninguno);
    }
}
