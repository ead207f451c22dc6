//! HTTP-backed default implementations of the `Curator`/`Analyst`
//! capabilities, grounded in `pipeline_v2/curador_llm.py` and
//! `pipeline_v2/analista_llm.py` (the chat-completions call shape, prompt
//! structure, and usage-based cost accounting).
//!
//! `USE_LLM=false` swaps these for `pipeline::NoopCurator`/`NoopAnalyst` in
//! `apps/job-worker` (SPEC_FULL.md §6) so the pipeline runs end to end in
//! environments without an OpenAI key.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::pipeline::{
    Analyst, Case, CapabilityError, Curator, EnrichedDocument, Fluxo, Interessado, LegislacaoRef, Pedido,
    PipelineMeta, Resumo, Situacao,
};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    /// Dollars per million prompt/completion tokens, distinct per role:
    /// curador_llm.py's gpt-4o-mini-class pricing is $0.15/$0.60, while
    /// analista_llm.py's gpt-4.1-mini-class pricing is $0.4/$1.6.
    price_per_m_prompt: f64,
    price_per_m_completion: f64,
}

impl OpenAiClient {
    pub fn new(
        http: reqwest::Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
        price_per_m_prompt: f64,
        price_per_m_completion: f64,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            price_per_m_prompt,
            price_per_m_completion,
        }
    }

    async fn complete(&self, system: &str, prompt: String) -> Result<(serde_json::Value, PipelineMeta), CapabilityError> {
        let started = std::time::Instant::now();
        let payload = json!({
            "model": self.model,
            "max_tokens": 4000,
            "temperature": 0.1,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
        });

        let response = self
            .http
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CapabilityError::Transient(e.to_string()))?;

        if response.status().is_server_error() || response.status().as_u16() == 429 {
            return Err(CapabilityError::Transient(format!("llm http {}", response.status())));
        }
        if !response.status().is_success() {
            return Err(CapabilityError::Permanent(format!("llm http {}", response.status())));
        }

        #[derive(Deserialize)]
        struct Usage {
            prompt_tokens: u64,
            completion_tokens: u64,
            total_tokens: u64,
        }
        #[derive(Deserialize)]
        struct Message {
            content: String,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct ChatCompletion {
            choices: Vec<Choice>,
            usage: Usage,
        }

        let body: ChatCompletion = response
            .json()
            .await
            .map_err(|e| CapabilityError::Permanent(format!("malformed llm response: {e}")))?;

        let content = body
            .choices
            .first()
            .ok_or_else(|| CapabilityError::Permanent("llm returned no choices".to_string()))?
            .message
            .content
            .trim();
        let content = strip_code_fence(content);

        let parsed: serde_json::Value =
            serde_json::from_str(content).map_err(|e| CapabilityError::Permanent(format!("non-JSON llm output: {e}")))?;

        let meta = PipelineMeta {
            modelo: self.model.clone(),
            tokens: body.usage.total_tokens,
            duracao_s: started.elapsed().as_secs_f64(),
            custo: (body.usage.prompt_tokens as f64 * self.price_per_m_prompt
                + body.usage.completion_tokens as f64 * self.price_per_m_completion)
                / 1_000_000.0,
        };

        Ok((parsed, meta))
    }
}

fn strip_code_fence(content: &str) -> &str {
    if let Some(start) = content.find("```") {
        let rest = &content[start + 3..];
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end) = rest.find("```") {
            return rest[..end].trim();
        }
    }
    content
}

/// Selects the 8-12 essential documents via an LLM prompt (curation gate
/// already decided by `pipeline::curation_triggered` before this is called).
pub struct OpenAiCurator {
    client: OpenAiClient,
}

impl OpenAiCurator {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Curator for OpenAiCurator {
    async fn curate(&self, documents: &[EnrichedDocument]) -> Result<Vec<String>, CapabilityError> {
        let lista = documents
            .iter()
            .map(|d| format!("[{}] {:?} prio={}", d.document.doc_id, d.document.tipo_documento, d.prioridade))
            .collect::<Vec<_>>()
            .join("\n");
        let total_chars: usize = documents.iter().map(|d| d.document.char_count).sum();

        let prompt = format!(
            "Selecione os documentos ESSENCIAIS deste processo.\n\nTOTAL: {} documentos | {} caracteres\n\n{}\n\nRETORNE JSON: {{\"docs_selecionados\": [\"doc_id\", ...]}}",
            documents.len(),
            total_chars,
            lista,
        );

        let (value, _meta) = self.client.complete("Responda APENAS JSON válido.", prompt).await?;
        let selected = value
            .get("docs_selecionados")
            .and_then(|v| v.as_array())
            .ok_or_else(|| CapabilityError::Permanent("curator response missing docs_selecionados".to_string()))?
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        Ok(selected)
    }
}

/// Produces the final structured `Resumo`, grounded in `analista_llm.py`'s
/// prompt shape (interessado/pedido/situacao/fluxo/prazos/resumo_executivo).
pub struct OpenAiAnalyst {
    client: OpenAiClient,
}

impl OpenAiAnalyst {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Analyst for OpenAiAnalyst {
    async fn analyze(&self, documents: &[EnrichedDocument], case: &Case) -> Result<Resumo, CapabilityError> {
        let docs_texto = documents
            .iter()
            .map(|d| format!("---\n[{}] {:?}\n{}\n---", d.document.doc_id, d.document.tipo_documento, preview(&d.document.texto)))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Analise os documentos do processo e extraia informações estruturadas.\n\n\
             SITUAÇÃO ATUAL: {}\n\n## DOCUMENTOS:\n{}\n\n## RETORNE JSON:\n\
             {{\n  \"interessado\": {{\"nome\": \"...\", \"posto_grad\": \"...\", \"unidade\": \"...\", \"vinculo\": \"Militar|Servidor|Civil|Órgão externo\"}},\n  \
             \"pedido\": {{\"tipo\": \"...\", \"descricao\": \"...\", \"motivo\": \"...\"}},\n  \
             \"situacao\": {{\"status\": \"EM_ANALISE|DEFERIDO|INDEFERIDO|PENDENTE_PUBLICACAO|ARQUIVADO\", \"etapa_atual\": \"...\", \"proximo_passo\": \"...\"}},\n  \
             \"fluxo\": {{\"origem\": \"...\", \"destino_final\": \"...\", \"caminho\": [\"SIGLA1\", \"SIGLA2\"], \"unidade_atual\": \"...\"}},\n  \
             \"prazos_destaque\": [\"...\"],\n  \
             \"legislacao\": [{{\"tipo\": \"Lei|Decreto\", \"numero\": \"...\", \"artigo\": \"...\"}}],\n  \
             \"resumo_executivo\": \"2-3 frases resumindo o processo\",\n  \
             \"contexto_para_ia\": \"...\",\n  \
             \"trechos_relevantes\": [\"...\"],\n  \
             \"alertas\": [\"Pontos de atenção\"],\n  \
             \"sugestao\": \"Encaminhamento sugerido\",\n  \
             \"confianca\": 0.85\n}}\n\n\
             REGRAS:\n- Se não encontrar, use null\n- Seja FIEL aos documentos\n- Priorize documentos recentes",
            case.situacao_atual, docs_texto,
        );

        let (value, meta) = self
            .client
            .complete("Você é um analista de processos. Responda APENAS JSON válido.", prompt)
            .await?;

        Ok(Resumo {
            resumo_executivo: value
                .get("resumo_executivo")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            contexto_para_ia: value
                .get("contexto_para_ia")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            prazos_destaque: value
                .get("prazos_destaque")
                .and_then(|v| v.as_array())
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default(),
            trechos_relevantes: value
                .get("trechos_relevantes")
                .and_then(|v| v.as_array())
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default(),
            flags: Default::default(),
            interessado: value.get("interessado").and_then(|v| parse_interessado(v)),
            pedido: value.get("pedido").and_then(|v| parse_pedido(v)),
            situacao: value.get("situacao").and_then(|v| parse_situacao(v)),
            fluxo: value.get("fluxo").and_then(|v| parse_fluxo(v)),
            legislacao: value
                .get("legislacao")
                .and_then(|v| v.as_array())
                .map(|a| a.iter().filter_map(parse_legislacao_ref).collect())
                .unwrap_or_default(),
            alertas: value
                .get("alertas")
                .and_then(|v| v.as_array())
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default(),
            sugestao: value.get("sugestao").and_then(|v| v.as_str()).map(str::to_string),
            confianca: value.get("confianca").and_then(|v| v.as_f64()),
            pipeline: meta,
            modo: String::new(),
            docs_analisados: 0,
        })
    }
}

fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn parse_interessado(value: &serde_json::Value) -> Option<Interessado> {
    if !value.is_object() {
        return None;
    }
    Some(Interessado {
        nome: str_field(value, "nome"),
        posto_grad: str_field(value, "posto_grad"),
        unidade: str_field(value, "unidade"),
        vinculo: str_field(value, "vinculo"),
    })
}

fn parse_pedido(value: &serde_json::Value) -> Option<Pedido> {
    if !value.is_object() {
        return None;
    }
    Some(Pedido {
        tipo: str_field(value, "tipo"),
        descricao: str_field(value, "descricao"),
        motivo: str_field(value, "motivo"),
    })
}

fn parse_situacao(value: &serde_json::Value) -> Option<Situacao> {
    if !value.is_object() {
        return None;
    }
    Some(Situacao {
        status: str_field(value, "status"),
        etapa_atual: str_field(value, "etapa_atual"),
        proximo_passo: str_field(value, "proximo_passo"),
    })
}

fn parse_fluxo(value: &serde_json::Value) -> Option<Fluxo> {
    if !value.is_object() {
        return None;
    }
    let caminho = value
        .get("caminho")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    Some(Fluxo {
        origem: str_field(value, "origem"),
        destino_final: str_field(value, "destino_final"),
        caminho,
        unidade_atual: str_field(value, "unidade_atual"),
    })
}

fn parse_legislacao_ref(value: &serde_json::Value) -> Option<LegislacaoRef> {
    if !value.is_object() {
        return None;
    }
    Some(LegislacaoRef {
        tipo: str_field(value, "tipo"),
        numero: str_field(value, "numero"),
        artigo: str_field(value, "artigo"),
    })
}

fn preview(texto: &str) -> String {
    const MAX_PREVIEW_CHARS: usize = 2500;
    texto.chars().take(MAX_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_json() {
        let raw = "```json\n{\"a\":1}\n```";
        assert_eq!(strip_code_fence(raw), "{\"a\":1}");
    }

    #[test]
    fn leaves_plain_json_untouched() {
        let raw = "{\"a\":1}";
        assert_eq!(strip_code_fence(raw), raw);
    }
}
