//! Drives the full six-stage pipeline (spec.md §4.3/§8) end to end against
//! a real Postgres, with fake Extractor/Curator/Analyst capabilities in
//! place of the opaque LLM/viewer integrations.

mod support;

use std::sync::Arc;

use async_trait::async_trait;
use domain_jobs::artifacts::ArtifactStore;
use domain_jobs::pipeline::{
    Analyst, CapabilityError, Case, Credentials, Curator, EnrichedDocument, Extractor, ExtractedDocument, Fluxo,
    Interessado, MetodoExtracao, NoopAnalyst, NoopCurator, PipelineMeta, RawExtraction, Resumo, Situacao,
    SituacaoDocumento, TipoDocumento,
};
use domain_jobs::repository::NewJob;
use domain_jobs::{JobMessage, JobProcessor, JobRepository, JobStage, JobStatus, PgJobRepository};
use stream_worker::StreamProcessor;
use support::TestDatabase;

struct FakeExtractor {
    documents: Vec<ExtractedDocument>,
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract(&self, nup: &str, _credentials: &Credentials) -> Result<RawExtraction, CapabilityError> {
        Ok(RawExtraction {
            nup: nup.to_string(),
            documents: self.documents.clone(),
            extracted_at: chrono::Utc::now(),
        })
    }
}

/// Keeps only the first 10 documents, matching scenario 6's curator
/// contract (`docs_analisados == 10` after curation).
struct TenDocCurator;

#[async_trait]
impl Curator for TenDocCurator {
    async fn curate(&self, documents: &[EnrichedDocument]) -> Result<Vec<String>, CapabilityError> {
        Ok(documents.iter().take(10).map(|d| d.document.doc_id.clone()).collect())
    }
}

/// Populates the fields `PROMPT_ANALISTA` asks for, so `result_json`'s
/// compact projection (spec.md §4.3 step 5) can be asserted on without an
/// OpenAI key.
struct RichAnalyst;

#[async_trait]
impl Analyst for RichAnalyst {
    async fn analyze(&self, documents: &[EnrichedDocument], case: &Case) -> Result<Resumo, CapabilityError> {
        Ok(Resumo {
            resumo_executivo: case.situacao_atual.clone(),
            contexto_para_ia: "contexto".to_string(),
            prazos_destaque: Vec::new(),
            trechos_relevantes: Vec::new(),
            flags: Default::default(),
            interessado: Some(Interessado {
                nome: Some("Fulano de Tal".to_string()),
                posto_grad: None,
                unidade: None,
                vinculo: Some("Militar".to_string()),
            }),
            pedido: None,
            situacao: Some(Situacao {
                status: Some("EM_ANALISE".to_string()),
                etapa_atual: None,
                proximo_passo: None,
            }),
            fluxo: Some(Fluxo {
                origem: Some("UNIDADE-A".to_string()),
                destino_final: Some("UNIDADE-B".to_string()),
                caminho: vec!["UNIDADE-A".to_string()],
                unidade_atual: Some("UNIDADE-A".to_string()),
            }),
            legislacao: Vec::new(),
            alertas: vec!["prazo próximo do vencimento".to_string()],
            sugestao: Some("encaminhar para decisão".to_string()),
            confianca: Some(0.85),
            pipeline: PipelineMeta {
                modelo: "rich-test".to_string(),
                tokens: 0,
                duracao_s: 0.0,
                custo: 0.0,
            },
            modo: String::new(),
            docs_analisados: documents.len(),
        })
    }
}

fn document(doc_id: &str, texto: String) -> ExtractedDocument {
    ExtractedDocument::new(
        doc_id,
        TipoDocumento::Despacho,
        SituacaoDocumento::Assinado,
        MetodoExtracao::ViewerHtml,
        texto,
    )
}

async fn processor(
    repo: Arc<PgJobRepository>,
    tmp_dir: &std::path::Path,
    documents: Vec<ExtractedDocument>,
    curator: Arc<dyn Curator>,
) -> JobProcessor<PgJobRepository> {
    processor_with_analyst(repo, tmp_dir, documents, curator, Arc::new(NoopAnalyst)).await
}

async fn processor_with_analyst(
    repo: Arc<PgJobRepository>,
    tmp_dir: &std::path::Path,
    documents: Vec<ExtractedDocument>,
    curator: Arc<dyn Curator>,
    analyst: Arc<dyn Analyst>,
) -> JobProcessor<PgJobRepository> {
    JobProcessor::new(
        repo,
        ArtifactStore::new(tmp_dir),
        Arc::new(FakeExtractor { documents }),
        curator,
        analyst,
        Credentials {
            username: "svc".to_string(),
            secret: "secret".to_string(),
        },
        "worker-test",
        15,
    )
}

async fn insert_job(repo: &PgJobRepository, nup: &str) -> uuid::Uuid {
    let job_id = repo
        .insert(NewJob {
            nup: nup.to_string(),
            scope: None,
            requester: None,
            mode: "detalhar".to_string(),
            priority: 5,
            max_attempts: 3,
            dedup_key: format!("dedup-{nup}"),
        })
        .await
        .unwrap();
    job_id
}

fn tmp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("domain-jobs-pipeline-test-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn small_process_skips_curation_and_completes() {
    let db = TestDatabase::new().await;
    let repo = Arc::new(PgJobRepository::new(db.connection()));
    let nup = "0609.012097.00016/2026-69";
    let job_id = insert_job(&repo, nup).await;

    let dir = tmp_dir();
    let documents = (0..3)
        .map(|i| document(&format!("doc-{i}"), "texto de despacho".repeat(10)))
        .collect();
    let proc = processor(Arc::clone(&repo), &dir, documents, Arc::new(NoopCurator)).await;

    proc.process(&JobMessage::new(job_id, 5)).await.unwrap();

    let job = repo.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.status_stage, Some(JobStage::Resumo));
    assert!(job.finished_at.is_some());

    let result = job.result_json.expect("done job must carry result_json");
    let resumo_executivo = result.get("resumo_executivo").and_then(|v| v.as_str()).unwrap_or("");
    assert!(!resumo_executivo.is_empty());
    assert_eq!(result.get("modo").and_then(|v| v.as_str()), Some("ANALISTA"));

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn large_process_triggers_curation_and_narrows_to_ten_documents() {
    let db = TestDatabase::new().await;
    let repo = Arc::new(PgJobRepository::new(db.connection()));
    let nup = "0609.012097.00300/2026-20";
    let job_id = insert_job(&repo, nup).await;

    let dir = tmp_dir();
    // 40 documents, ~300000 chars total: both curation thresholds exceeded.
    let documents = (0..40)
        .map(|i| document(&format!("doc-{i}"), "x".repeat(7_500)))
        .collect();
    let proc = processor(Arc::clone(&repo), &dir, documents, Arc::new(TenDocCurator)).await;

    proc.process(&JobMessage::new(job_id, 5)).await.unwrap();

    let job = repo.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Done);

    let result = job.result_json.unwrap();
    assert_eq!(result.get("modo").and_then(|v| v.as_str()), Some("CURADOR+ANALISTA"));
    assert_eq!(result.get("docs_analisados").and_then(|v| v.as_u64()), Some(10));

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn result_json_folds_situation_flow_party_and_alerts() {
    let db = TestDatabase::new().await;
    let repo = Arc::new(PgJobRepository::new(db.connection()));
    let nup = "0609.012097.00303/2026-23";
    let job_id = insert_job(&repo, nup).await;

    let dir = tmp_dir();
    let documents = (0..3)
        .map(|i| document(&format!("doc-{i}"), "texto de despacho".repeat(10)))
        .collect();
    let proc = processor_with_analyst(
        Arc::clone(&repo),
        &dir,
        documents,
        Arc::new(NoopCurator),
        Arc::new(RichAnalyst),
    )
    .await;

    proc.process(&JobMessage::new(job_id, 5)).await.unwrap();

    let job = repo.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Done);

    let result = job.result_json.expect("done job must carry result_json");
    assert_eq!(
        result.get("situacao").and_then(|v| v.get("status")).and_then(|v| v.as_str()),
        Some("EM_ANALISE")
    );
    assert_eq!(
        result.get("fluxo").and_then(|v| v.get("destino_final")).and_then(|v| v.as_str()),
        Some("UNIDADE-B")
    );
    assert_eq!(
        result.get("interessado").and_then(|v| v.get("nome")).and_then(|v| v.as_str()),
        Some("Fulano de Tal")
    );
    assert_eq!(
        result.get("alertas").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(1)
    );
    // The full Resumo artifact carries fields the compact projection omits.
    assert!(result.get("sugestao").is_none());
    assert!(result.get("confianca").is_none());

    let resumo_artifact: serde_json::Value =
        serde_json::from_str(&tokio::fs::read_to_string(job.result_path.unwrap()).await.unwrap()).unwrap();
    assert_eq!(resumo_artifact.get("sugestao").and_then(|v| v.as_str()), Some("encaminhar para decisão"));
    assert_eq!(resumo_artifact.get("confianca").and_then(|v| v.as_f64()), Some(0.85));

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn boundary_counts_do_not_trigger_curation() {
    let db = TestDatabase::new().await;
    let repo = Arc::new(PgJobRepository::new(db.connection()));
    let nup = "0609.012097.00301/2026-21";
    let job_id = insert_job(&repo, nup).await;

    let dir = tmp_dir();
    // Exactly 10 documents of exactly 12000 chars each: document_count == 10
    // and total_chars == 120000, both at the threshold, neither over it.
    let documents = (0..10).map(|i| document(&format!("doc-{i}"), "y".repeat(12_000))).collect();
    let proc = processor(Arc::clone(&repo), &dir, documents, Arc::new(TenDocCurator)).await;

    proc.process(&JobMessage::new(job_id, 5)).await.unwrap();

    let job = repo.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Done);
    let result = job.result_json.unwrap();
    assert_eq!(result.get("modo").and_then(|v| v.as_str()), Some("ANALISTA"));

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn empty_document_list_is_a_terminal_error_not_an_llm_call() {
    let db = TestDatabase::new().await;
    let repo = Arc::new(PgJobRepository::new(db.connection()));
    let nup = "0609.012097.00302/2026-22";
    let job_id = insert_job(&repo, nup).await;

    let dir = tmp_dir();
    let proc = processor(Arc::clone(&repo), &dir, Vec::new(), Arc::new(NoopCurator)).await;

    proc.process(&JobMessage::new(job_id, 5)).await.unwrap();

    let job = repo.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Error);
    assert!(job.error.unwrap().contains("no documents"));
    // Curation/analysis never ran: no Case/Resumo stage was recorded.
    assert!(job.status_stage.is_none() || job.status_stage == Some(JobStage::Extracted));

    let _ = tokio::fs::remove_dir_all(&dir).await;
}
