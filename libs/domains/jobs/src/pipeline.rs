//! Artifact schemas and the stage traits that produce them (SPEC_FULL.md
//! §3.2/§4.3, grounded in
//! `examples/original_source/plattargus-detalhar/app/schemas/*.py` and
//! `app/pipeline_v2/*.py`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::HashMap;

/// Opaque credentials handed to the extractor, never inspected by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TipoDocumento {
    Despacho,
    Requerimento,
    Memorando,
    Oficio,
    Informacao,
    Parecer,
    NotaTecnica,
    Decisao,
    TermoEncerramento,
    Anexo,
    Portaria,
    Outros,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SituacaoDocumento {
    Assinado,
    Minuta,
    Cancelado,
    Juntado,
    Rascunho,
    Desconhecido,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetodoExtracao {
    ViewerHtml,
    PdfText,
    Ocr,
    Mixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Autor {
    pub nome: String,
    pub cargo: Option<String>,
    pub unidade: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assinatura {
    pub nome: String,
    pub cargo: Option<String>,
    pub datahora: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Referencias {
    pub responde_a: Option<String>,
    #[serde(default)]
    pub menciona_docs: Vec<String>,
}

/// A single document of a process dump, the Rust analogue of `doc_v1.DocV1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub doc_id: String,
    pub tipo_documento: TipoDocumento,
    pub situacao_documento: SituacaoDocumento,
    pub metodo_extracao: MetodoExtracao,
    pub autor: Option<Autor>,
    #[serde(default)]
    pub assinaturas: Vec<Assinatura>,
    pub texto: String,
    pub char_count: usize,
    pub sha1: String,
    #[serde(default)]
    pub referencias: Referencias,
    #[serde(default)]
    pub tags_tecnicas: Vec<String>,
}

impl ExtractedDocument {
    /// Builds the document, computing `char_count`/`sha1` from `texto`
    /// (mirrors `DocV1.atualizar_hash`).
    pub fn new(
        doc_id: impl Into<String>,
        tipo_documento: TipoDocumento,
        situacao_documento: SituacaoDocumento,
        metodo_extracao: MetodoExtracao,
        texto: impl Into<String>,
    ) -> Self {
        let texto = texto.into();
        let mut hasher = Sha1::new();
        hasher.update(texto.as_bytes());
        Self {
            doc_id: doc_id.into(),
            tipo_documento,
            situacao_documento,
            metodo_extracao,
            autor: None,
            assinaturas: Vec::new(),
            char_count: texto.chars().count(),
            sha1: hex::encode(hasher.finalize()),
            texto,
            referencias: Referencias::default(),
            tags_tecnicas: Vec::new(),
        }
    }
}

/// `raw/{job_id}.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExtraction {
    pub nup: String,
    pub documents: Vec<ExtractedDocument>,
    pub extracted_at: DateTime<Utc>,
}

/// A document annotated by the heuristic filter. `enriched/{job_id}.json`
/// carries a full list of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedDocument {
    #[serde(flatten)]
    pub document: ExtractedDocument,
    /// 1 (low) .. 5 (high), computed from tags/type/recency.
    pub prioridade: u8,
    pub relevante: bool,
}

/// `heur_v2/{job_id}.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicDocRef {
    pub doc_id: String,
    pub prioridade: u8,
    pub relevante: bool,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicSummary {
    pub document_count: usize,
    pub total_chars: usize,
    pub documents: Vec<HeuristicDocRef>,
    pub curation_triggered: bool,
}

/// Curation gate from spec.md §4.3 step 3: strict `>`, not `>=` (§8 boundary tests).
pub const CURATION_DOCUMENT_COUNT_THRESHOLD: usize = 10;
pub const CURATION_TOTAL_CHARS_THRESHOLD: usize = 120_000;

pub fn curation_triggered(document_count: usize, total_chars: usize) -> bool {
    document_count > CURATION_DOCUMENT_COUNT_THRESHOLD || total_chars > CURATION_TOTAL_CHARS_THRESHOLD
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtoSemantico {
    Pedido,
    Decisao,
    Encaminhamento,
    Encerramento,
    Outro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultadoAto {
    Deferido,
    Indeferido,
    Pendente,
    NaoAplicavel,
}

/// `triage/{job_id}.json` item, grounded in `triage_v1.TriageV1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageItem {
    pub doc_id: String,
    pub ato_semantico: AtoSemantico,
    pub resultado_ato: ResultadoAto,
    #[serde(default)]
    pub citacoes: Vec<String>,
    #[serde(default)]
    pub prazos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triage {
    pub itens: Vec<TriageItem>,
    pub gerado_em: DateTime<Utc>,
}

/// One row of a process's procedural timeline, part of `Case`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventoTimeline {
    pub doc_id: String,
    pub descricao: String,
    pub data: Option<DateTime<Utc>>,
}

/// `case/{job_id}.json`, grounded in `case_v1.CaseV1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub situacao_atual: String,
    pub pedido_vigente: Option<String>,
    pub ultimo_comando: Option<String>,
    #[serde(default)]
    pub pendencias: Vec<String>,
    pub timeline: Vec<EventoTimeline>,
    pub fluxo_tramitacao: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineMeta {
    pub modelo: String,
    pub tokens: u64,
    pub duracao_s: f64,
    pub custo: f64,
}

/// `interessado` block of `PROMPT_ANALISTA`: who the process is about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Interessado {
    pub nome: Option<String>,
    pub posto_grad: Option<String>,
    pub unidade: Option<String>,
    pub vinculo: Option<String>,
}

/// `pedido` block: what is being requested and why.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pedido {
    pub tipo: Option<String>,
    pub descricao: Option<String>,
    pub motivo: Option<String>,
}

/// `situacao` block: where the process currently stands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Situacao {
    pub status: Option<String>,
    pub etapa_atual: Option<String>,
    pub proximo_passo: Option<String>,
}

/// `fluxo` block: the routing path the process has taken/will take.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fluxo {
    pub origem: Option<String>,
    pub destino_final: Option<String>,
    #[serde(default)]
    pub caminho: Vec<String>,
    pub unidade_atual: Option<String>,
}

/// One `legislacao` entry: a law/decree/article citation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegislacaoRef {
    pub tipo: Option<String>,
    pub numero: Option<String>,
    pub artigo: Option<String>,
}

/// `resumo/{job_id}.json`, grounded in `resumo_v1.ResumoV1` and
/// `PROMPT_ANALISTA`'s JSON schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resumo {
    pub resumo_executivo: String,
    pub contexto_para_ia: String,
    #[serde(default)]
    pub prazos_destaque: Vec<String>,
    #[serde(default)]
    pub trechos_relevantes: Vec<String>,
    #[serde(default)]
    pub flags: HashMap<String, bool>,
    #[serde(default)]
    pub interessado: Option<Interessado>,
    #[serde(default)]
    pub pedido: Option<Pedido>,
    #[serde(default)]
    pub situacao: Option<Situacao>,
    #[serde(default)]
    pub fluxo: Option<Fluxo>,
    #[serde(default)]
    pub legislacao: Vec<LegislacaoRef>,
    #[serde(default)]
    pub alertas: Vec<String>,
    /// Not present in `PROMPT_ANALISTA`'s own schema but named by spec.md's
    /// analysis-stage contract alongside confidence; left `None` when the
    /// model doesn't volunteer one.
    #[serde(default)]
    pub sugestao: Option<String>,
    #[serde(default)]
    pub confianca: Option<f64>,
    pub pipeline: PipelineMeta,
    /// `modo` field named in spec.md §8 scenario 6 (`"CURADOR+ANALISTA"` vs
    /// the unconditional `"ANALISTA"` path).
    pub modo: String,
    pub docs_analisados: usize,
}

/// `result_json` (spec.md §4.3 step 5): a compact projection of `Resumo`,
/// not the full artifact written to `resumo/{job_id}.json` — summary,
/// situation, flow, interested party, alerts, and cost/timing metrics.
#[derive(Debug, Clone, Serialize)]
pub struct ResultProjection<'a> {
    pub resumo_executivo: &'a str,
    pub situacao: &'a Option<Situacao>,
    pub fluxo: &'a Option<Fluxo>,
    pub interessado: &'a Option<Interessado>,
    pub alertas: &'a [String],
    pub pipeline: &'a PipelineMeta,
    pub modo: &'a str,
    pub docs_analisados: usize,
}

impl Resumo {
    pub fn result_projection(&self) -> ResultProjection<'_> {
        ResultProjection {
            resumo_executivo: &self.resumo_executivo,
            situacao: &self.situacao,
            fluxo: &self.fluxo,
            interessado: &self.interessado,
            alertas: &self.alertas,
            pipeline: &self.pipeline,
            modo: &self.modo,
            docs_analisados: self.docs_analisados,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("transient capability failure: {0}")]
    Transient(String),
    #[error("permanent capability failure: {0}")]
    Permanent(String),
}

impl CapabilityError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CapabilityError::Transient(_))
    }
}

/// The opaque `Extract(nup, credentials) → ProcessDump` capability
/// (spec.md §1, out of scope beyond its interface).
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, nup: &str, credentials: &Credentials) -> Result<RawExtraction, CapabilityError>;
}

/// The opaque `Curate(dump) → selection` capability, grounded in
/// `pipeline_v2/curador_llm.curar_processo`.
#[async_trait]
pub trait Curator: Send + Sync {
    async fn curate(&self, documents: &[EnrichedDocument]) -> Result<Vec<String>, CapabilityError>;
}

/// The opaque `Analyze(dump) → structuredJSON` capability, grounded in
/// `pipeline_v2/analista_llm.analisar_processo`.
#[async_trait]
pub trait Analyst: Send + Sync {
    async fn analyze(&self, documents: &[EnrichedDocument], case: &Case) -> Result<Resumo, CapabilityError>;
}

/// `USE_LLM=false` curator (SPEC_FULL.md §6): keeps every document,
/// skipping the LLM call entirely.
pub struct NoopCurator;

#[async_trait]
impl Curator for NoopCurator {
    async fn curate(&self, documents: &[EnrichedDocument]) -> Result<Vec<String>, CapabilityError> {
        Ok(documents.iter().map(|d| d.document.doc_id.clone()).collect())
    }
}

/// `USE_LLM=false` analyst: assembles a `Resumo` straight from the
/// deterministic `Case`, with no model cost/latency.
pub struct NoopAnalyst;

#[async_trait]
impl Analyst for NoopAnalyst {
    async fn analyze(&self, documents: &[EnrichedDocument], case: &Case) -> Result<Resumo, CapabilityError> {
        Ok(Resumo {
            resumo_executivo: case.situacao_atual.clone(),
            contexto_para_ia: format!("{} documentos analisados sem LLM", documents.len()),
            prazos_destaque: Vec::new(),
            trechos_relevantes: documents.iter().take(3).map(|d| preview(&d.document.texto)).collect(),
            flags: HashMap::new(),
            interessado: None,
            pedido: None,
            situacao: None,
            fluxo: None,
            legislacao: Vec::new(),
            alertas: Vec::new(),
            sugestao: None,
            confianca: None,
            pipeline: PipelineMeta {
                modelo: "noop".to_string(),
                tokens: 0,
                duracao_s: 0.0,
                custo: 0.0,
            },
            modo: String::new(),
            docs_analisados: 0,
        })
    }
}

/// Deterministic heuristic filter (spec.md §4.3 step 2): classify each
/// document's priority and relevance from its tags/type, no LLM involved.
pub fn run_heuristic(raw: &RawExtraction) -> (Vec<EnrichedDocument>, HeuristicSummary) {
    let enriched: Vec<EnrichedDocument> = raw
        .documents
        .iter()
        .map(|doc| {
            let prioridade = heuristic_priority(doc);
            let relevante = prioridade >= 3 || !doc.tags_tecnicas.is_empty();
            EnrichedDocument {
                document: doc.clone(),
                prioridade,
                relevante,
            }
        })
        .collect();

    let total_chars: usize = raw.documents.iter().map(|d| d.char_count).sum();
    let document_count = raw.documents.len();

    let summary = HeuristicSummary {
        document_count,
        total_chars,
        documents: enriched
            .iter()
            .map(|e| HeuristicDocRef {
                doc_id: e.document.doc_id.clone(),
                prioridade: e.prioridade,
                relevante: e.relevante,
                preview: preview(&e.document.texto),
            })
            .collect(),
        curation_triggered: curation_triggered(document_count, total_chars),
    };

    (enriched, summary)
}

fn heuristic_priority(doc: &ExtractedDocument) -> u8 {
    use TipoDocumento::*;
    let base = match doc.tipo_documento {
        Decisao | TermoEncerramento => 5,
        Parecer | NotaTecnica | Despacho => 4,
        Requerimento | Memorando | Oficio => 3,
        Informacao => 2,
        Portaria | Anexo | Outros => 1,
    };
    let bump = if doc.tags_tecnicas.iter().any(|t| t == "TEM_DECISAO" || t == "TEM_PRAZO") {
        1
    } else {
        0
    };
    (base + bump).min(5)
}

fn preview(texto: &str) -> String {
    const MAX_PREVIEW_CHARS: usize = 240;
    texto.chars().take(MAX_PREVIEW_CHARS).collect()
}

/// Deterministic triage pass (SPEC_FULL §4.3 step 3, always runs): classify
/// each enriched document's act/outcome without LLM involvement.
pub fn run_triage(documents: &[EnrichedDocument]) -> Triage {
    let itens = documents
        .iter()
        .map(|doc| TriageItem {
            doc_id: doc.document.doc_id.clone(),
            ato_semantico: classify_ato(doc),
            resultado_ato: classify_resultado(doc),
            citacoes: doc.document.referencias.menciona_docs.clone(),
            prazos: extract_prazos(&doc.document.texto),
        })
        .collect();

    Triage {
        itens,
        gerado_em: Utc::now(),
    }
}

fn classify_ato(doc: &EnrichedDocument) -> AtoSemantico {
    match doc.document.tipo_documento {
        TipoDocumento::Requerimento => AtoSemantico::Pedido,
        TipoDocumento::Decisao => AtoSemantico::Decisao,
        TipoDocumento::TermoEncerramento => AtoSemantico::Encerramento,
        TipoDocumento::Memorando | TipoDocumento::Oficio => AtoSemantico::Encaminhamento,
        _ => AtoSemantico::Outro,
    }
}

fn classify_resultado(doc: &EnrichedDocument) -> ResultadoAto {
    let upper = doc.document.texto.to_uppercase();
    if upper.contains("DEFERIDO") || upper.contains("AUTORIZO") {
        ResultadoAto::Deferido
    } else if upper.contains("INDEFERIDO") || upper.contains("NEGADO") {
        ResultadoAto::Indeferido
    } else if doc.document.tipo_documento == TipoDocumento::Decisao {
        ResultadoAto::Pendente
    } else {
        ResultadoAto::NaoAplicavel
    }
}

fn extract_prazos(texto: &str) -> Vec<String> {
    // Deterministic keyword scan, not a full date parser: a stand-in for
    // the original's regex-based prazo detector, sufficient to surface
    // "needs a deadline" to downstream stages.
    texto
        .split(|c: char| c == '.' || c == '\n')
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            lower.contains("prazo") || lower.contains("dias")
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tipo: TipoDocumento, texto: &str) -> ExtractedDocument {
        ExtractedDocument::new(
            "DOC-1",
            tipo,
            SituacaoDocumento::Assinado,
            MetodoExtracao::ViewerHtml,
            texto,
        )
    }

    #[test]
    fn curation_threshold_is_strictly_greater_than() {
        assert!(!curation_triggered(10, 100));
        assert!(curation_triggered(11, 100));
        assert!(!curation_triggered(5, 120_000));
        assert!(curation_triggered(5, 120_001));
    }

    #[test]
    fn heuristic_priority_ranks_decisions_above_attachments() {
        let decisao = doc(TipoDocumento::Decisao, "texto qualquer");
        let anexo = doc(TipoDocumento::Anexo, "texto qualquer");
        assert!(heuristic_priority(&decisao) > heuristic_priority(&anexo));
    }

    #[test]
    fn run_heuristic_counts_documents_and_chars() {
        let raw = RawExtraction {
            nup: "X".to_string(),
            documents: vec![
                doc(TipoDocumento::Decisao, "abc"),
                doc(TipoDocumento::Anexo, "abcdef"),
            ],
            extracted_at: Utc::now(),
        };
        let (enriched, summary) = run_heuristic(&raw);
        assert_eq!(enriched.len(), 2);
        assert_eq!(summary.document_count, 2);
        assert_eq!(summary.total_chars, 9);
        assert!(!summary.curation_triggered);
    }

    #[test]
    fn triage_classifies_deferimento_from_text() {
        let enriched = EnrichedDocument {
            document: doc(TipoDocumento::Decisao, "DEFERIDO o pedido."),
            prioridade: 5,
            relevante: true,
        };
        let triage = run_triage(std::slice::from_ref(&enriched));
        assert_eq!(triage.itens[0].resultado_ato, ResultadoAto::Deferido);
        assert_eq!(triage.itens[0].ato_semantico, AtoSemantico::Decisao);
    }

    #[test]
    fn extract_prazos_finds_deadline_sentences() {
        let prazos = extract_prazos("Responda no prazo de 10 dias. Sem mais.");
        assert_eq!(prazos.len(), 1);
        assert!(prazos[0].to_lowercase().contains("prazo"));
    }
}
