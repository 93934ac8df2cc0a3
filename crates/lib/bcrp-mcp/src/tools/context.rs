use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, PromptMessage, PromptMessageRole},
    prompt,
    prompt_router,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::BcrpMcp;

const DEFAULT_TOPIC: &str = "economía peruana";

/// Payload listing the MCP commands this server exposes.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HelpCommands {
    pub commands: Vec<String>,
}

impl Default for HelpCommands {
    fn default() -> Self {
        Self {
            commands: vec![
                "help - List MCP commands to get context with how this MCP server works."
                    .to_string(),
                "health - Report server status and metadata catalog state."
                    .to_string(),
                "search_series - Resolve a query to one series code, with fuzzy suggestions when nothing resolves."
                    .to_string(),
                "resolve_series - Resolve a query and return only resolved/ambiguous/not_found."
                    .to_string(),
                "list_series - List series ranked by fuzzy similarity to a query."
                    .to_string(),
                "refresh_metadata - Re-download the series catalog."
                    .to_string(),
                "get_data - Fetch observations keyed by series code."
                    .to_string(),
                "get_table - Fetch observations with readable column names."
                    .to_string(),
                "plot_chart - Render series as an SVG line chart."
                    .to_string(),
                "economist_brief - Analysis prompt written from the perspective of a senior BCRP economist."
                    .to_string(),
                "economista_peruano (prompt) - The same analysis prompt served through prompts/get."
                    .to_string(),
            ],
        }
    }
}

/// Parameters for the analysis prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EconomistBriefParams {
    /// Subject to analyze, e.g. "inflación 2024".
    pub topic: Option<String>,
}

fn economist_brief_text(topic: Option<&str>) -> String {
    let topic = topic
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .unwrap_or(DEFAULT_TOPIC);
    format!(
        r#"Actúa como un Economista Senior del Banco Central de Reserva del Perú (BCRP).

Tu objetivo es analizar: {topic}

PERFIL:
- Eres riguroso, técnico pero claro.
- Usas terminología precisa (ej: "Tipo de Cambio Interbancario", "Inflación subyacente").
- Siempre citas el código de la serie (ej: PN01652XM) como fuente de verdad.
- Conoces el contexto económico reciente del Perú (inflación, tipo de cambio, minería).
- Evitas especulaciones políticas; te centras en los fundamentos macroeconómicos.

FORMATO DE RESPUESTA:
1. Resumen Ejecutivo: 2-3 líneas con la conclusión principal.
2. Análisis de Datos: presenta la tabla de datos y destaca tendencias.
3. Contexto: explica por qué ocurre (ej: "por el alza del precio del cobre" o "efecto base").
4. Fuente: cita siempre "Fuente: BCRP (Serie [CODIGO])".

Si te faltan datos, usa search_series, get_table y plot_chart antes de responder."#
    )
}

#[tool_router(router = tool_router_context, vis = "pub")]
impl BcrpMcp {
    #[tool(description = "List the MCP commands to get context with how this MCP server works.")]
    async fn help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::json(HelpCommands::default())?]))
    }

    #[tool(
        description = "Prompt for analyzing a topic as a senior BCRP economist. Defaults to the Peruvian economy."
    )]
    async fn economist_brief(
        &self,
        Parameters(params): Parameters<EconomistBriefParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text(
            economist_brief_text(params.topic.as_deref()),
        )]))
    }
}

#[prompt_router(router = "prompt_router_context", vis = "pub")]
impl BcrpMcp {
    #[prompt(
        name = "economista_peruano",
        description = "Analyze a topic with the rigor of a senior BCRP economist. Defaults to the Peruvian economy."
    )]
    async fn economista_peruano(
        &self,
        Parameters(params): Parameters<EconomistBriefParams>,
    ) -> Result<Vec<PromptMessage>, ErrorData> {
        Ok(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            economist_brief_text(params.topic.as_deref()),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brief_is_listed_as_a_prompt_with_optional_topic() {
        let prompts = BcrpMcp::prompt_router_context().list_all();
        let prompt = prompts
            .iter()
            .find(|prompt| prompt.name == "economista_peruano")
            .expect("economista_peruano prompt");
        let arguments = prompt.arguments.as_ref().expect("prompt arguments");
        let topic = arguments
            .iter()
            .find(|argument| argument.name == "topic")
            .expect("topic argument");
        assert_ne!(topic.required, Some(true));
    }

    #[test]
    fn brief_defaults_topic() {
        let text = economist_brief_text(Some("  "));
        assert!(text.contains("Tu objetivo es analizar: economía peruana"));
    }

    #[test]
    fn brief_uses_topic() {
        let text = economist_brief_text(Some("inflación 2024"));
        assert!(text.contains("Tu objetivo es analizar: inflación 2024"));
    }

    #[test]
    fn help_lists_every_tool() {
        let help = HelpCommands::default();
        for tool in ["search_series", "get_table", "plot_chart", "economist_brief"] {
            assert!(help.commands.iter().any(|c| c.starts_with(tool)), "{tool}");
        }
    }
}
