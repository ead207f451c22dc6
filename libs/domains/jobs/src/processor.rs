//! Stream processor driving the six-stage pipeline (spec.md §4.3).
//!
//! Unlike the teacher's `TaskProcessor`, `process` never returns `Err`: the
//! `jobs` row, not the stream ack, is authoritative for business retries
//! (§4.3 "Retry policy"). A non-`Ok` return here would hand the stream's own
//! crash-safety retry/DLQ machinery a second, conflicting opinion about
//! whether this job should run again.

use std::sync::Arc;

use async_trait::async_trait;
use stream_worker::{StreamError, StreamProcessor};
use tracing::{error, info, warn};

use crate::artifacts::ArtifactStore;
use crate::models::JobStage;
use crate::pipeline::{
    curation_triggered, run_heuristic, run_triage, Analyst, Case, Credentials, Curator,
    EnrichedDocument, Extractor, HeuristicSummary, PipelineMeta, RawExtraction, Resumo,
};
use crate::repository::{ClaimedJob, JobRepository};
use crate::stream_models::JobMessage;

/// Base delay for the retry backoff curve; doubled per attempt and capped.
const BACKOFF_BASE_SECONDS: i64 = 15;
const BACKOFF_MAX_SECONDS: i64 = 15 * 60;

fn backoff_seconds(attempts: i32) -> i64 {
    let exp = attempts.max(1).min(10) as u32 - 1;
    (BACKOFF_BASE_SECONDS * 2i64.pow(exp)).min(BACKOFF_MAX_SECONDS)
}

pub struct JobProcessor<R: JobRepository> {
    repository: Arc<R>,
    artifacts: ArtifactStore,
    extractor: Arc<dyn Extractor>,
    curator: Arc<dyn Curator>,
    analyst: Arc<dyn Analyst>,
    credentials: Credentials,
    locked_by: String,
    lock_minutes: i64,
}

impl<R: JobRepository> JobProcessor<R> {
    pub fn new(
        repository: Arc<R>,
        artifacts: ArtifactStore,
        extractor: Arc<dyn Extractor>,
        curator: Arc<dyn Curator>,
        analyst: Arc<dyn Analyst>,
        credentials: Credentials,
        locked_by: impl Into<String>,
        lock_minutes: i64,
    ) -> Self {
        Self {
            repository,
            artifacts,
            extractor,
            curator,
            analyst,
            credentials,
            locked_by: locked_by.into(),
            lock_minutes,
        }
    }

    /// Runs the full pipeline for a claimed job; returns the terminal
    /// outcome so `process` can decide between `finish_done`/`finish_retry`/
    /// `finish_error` without repeating the stage sequence.
    async fn run_pipeline(&self, job: &ClaimedJob) -> Result<(serde_json::Value, String), StageError> {
        let started = std::time::Instant::now();

        // 1. Extract.
        let raw: RawExtraction = self
            .extractor
            .extract(&job.nup, &self.credentials)
            .await
            .map_err(StageError::from_capability)?;
        let raw_path = self
            .artifacts
            .write("raw", job.job_id, &raw)
            .await
            .map_err(StageError::artifact)?;
        self.repository
            .advance_stage(job.job_id, JobStage::Extracted, &path_str(&raw_path))
            .await
            .map_err(StageError::repository)?;

        if raw.documents.is_empty() {
            return Err(StageError::Permanent("no documents".to_string()));
        }

        // 2. Heuristic filter: enrich, then persist the condensed summary.
        let (enriched, summary): (Vec<EnrichedDocument>, HeuristicSummary) = run_heuristic(&raw);
        let enriched_path = self
            .artifacts
            .write("enriched", job.job_id, &enriched)
            .await
            .map_err(StageError::artifact)?;
        self.repository
            .advance_stage(job.job_id, JobStage::Enriched, &path_str(&enriched_path))
            .await
            .map_err(StageError::repository)?;

        let heur_path = self
            .artifacts
            .write("heur_v2", job.job_id, &summary)
            .await
            .map_err(StageError::artifact)?;
        self.repository
            .advance_stage(job.job_id, JobStage::Heur, &path_str(&heur_path))
            .await
            .map_err(StageError::repository)?;

        // 3. Triage always runs (§9 OQ2).
        let triage = run_triage(&enriched);
        let triage_path = self
            .artifacts
            .write("triage", job.job_id, &triage)
            .await
            .map_err(StageError::artifact)?;
        self.repository
            .advance_stage(job.job_id, JobStage::Triage, &path_str(&triage_path))
            .await
            .map_err(StageError::repository)?;

        // 4. Curation is conditional and has no status_stage of its own: it
        // narrows the document set the analysis stage sees.
        let curate = curation_triggered(summary.document_count, summary.total_chars);
        let (selected, modo) = if curate {
            let keep: Vec<String> = self
                .curator
                .curate(&enriched)
                .await
                .map_err(StageError::from_capability)?;
            let keep_set: std::collections::HashSet<_> = keep.into_iter().collect();
            let selected: Vec<EnrichedDocument> = enriched
                .iter()
                .filter(|d| keep_set.contains(&d.document.doc_id))
                .cloned()
                .collect();
            (selected, "CURADOR+ANALISTA".to_string())
        } else {
            (enriched.clone(), "ANALISTA".to_string())
        };

        // 5. Analysis.
        let case: Case = self
            .build_case(&triage, &selected)
            .await
            .map_err(StageError::from_capability)?;
        let case_path = self
            .artifacts
            .write("case", job.job_id, &case)
            .await
            .map_err(StageError::artifact)?;
        self.repository
            .advance_stage(job.job_id, JobStage::Case, &path_str(&case_path))
            .await
            .map_err(StageError::repository)?;

        let mut resumo: Resumo = self
            .analyst
            .analyze(&selected, &case)
            .await
            .map_err(StageError::from_capability)?;
        resumo.modo = modo;
        resumo.docs_analisados = selected.len();
        resumo.pipeline = PipelineMeta {
            duracao_s: started.elapsed().as_secs_f64(),
            ..resumo.pipeline
        };

        let resumo_path = self
            .artifacts
            .write("resumo", job.job_id, &resumo)
            .await
            .map_err(StageError::artifact)?;
        self.repository
            .advance_stage(job.job_id, JobStage::Resumo, &path_str(&resumo_path))
            .await
            .map_err(StageError::repository)?;

        let result_json = serde_json::to_value(resumo.result_projection()).map_err(StageError::artifact_json)?;
        Ok((result_json, path_str(&resumo_path)))
    }

    /// Curation narrows the document set; the case stage otherwise needs no
    /// LLM of its own, it is assembled from the triage items directly
    /// (spec.md §4.3 step 5 folds case construction into analysis).
    async fn build_case(
        &self,
        triage: &crate::pipeline::Triage,
        documents: &[EnrichedDocument],
    ) -> Result<Case, crate::pipeline::CapabilityError> {
        let timeline = triage
            .itens
            .iter()
            .map(|item| crate::pipeline::EventoTimeline {
                doc_id: item.doc_id.clone(),
                descricao: format!("{:?} -> {:?}", item.ato_semantico, item.resultado_ato),
                data: Some(triage.gerado_em),
            })
            .collect();

        let ultimo_comando = documents
            .iter()
            .max_by_key(|d| d.document.char_count)
            .map(|d| d.document.doc_id.clone());

        Ok(Case {
            situacao_atual: "em tramitacao".to_string(),
            pedido_vigente: None,
            ultimo_comando,
            pendencias: Vec::new(),
            timeline,
            fluxo_tramitacao: triage.itens.iter().map(|i| i.doc_id.clone()).collect(),
        })
    }
}

fn path_str(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

enum StageError {
    Transient(String),
    Permanent(String),
}

impl StageError {
    fn from_capability(e: crate::pipeline::CapabilityError) -> Self {
        if e.is_transient() {
            StageError::Transient(e.to_string())
        } else {
            StageError::Permanent(e.to_string())
        }
    }

    fn artifact(e: crate::artifacts::ArtifactError) -> Self {
        StageError::Transient(e.to_string())
    }

    fn artifact_json(e: serde_json::Error) -> Self {
        StageError::Permanent(e.to_string())
    }

    fn repository(e: crate::error::JobsError) -> Self {
        StageError::Transient(e.to_string())
    }
}

#[async_trait]
impl<R: JobRepository + 'static> StreamProcessor<JobMessage> for JobProcessor<R> {
    async fn process(&self, message: &JobMessage) -> Result<(), StreamError> {
        let job = match self
            .repository
            .claim(message.job_id, &self.locked_by, self.lock_minutes)
            .await
        {
            Ok(Some(job)) => job,
            Ok(None) => {
                info!(job_id = %message.job_id, "job already claimed or not eligible, skipping");
                return Ok(());
            }
            Err(e) => {
                error!(job_id = %message.job_id, error = %e, "failed to claim job");
                return Ok(());
            }
        };

        match self.run_pipeline(&job).await {
            Ok((result_json, result_path)) => {
                if let Err(e) = self
                    .repository
                    .finish_done(job.job_id, result_json, Some(&result_path))
                    .await
                {
                    error!(job_id = %job.job_id, error = %e, "failed to record done state");
                }
                info!(job_id = %job.job_id, "job completed");
            }
            Err(StageError::Transient(msg)) if job.attempts < job.max_attempts => {
                let delay = backoff_seconds(job.attempts);
                warn!(job_id = %job.job_id, attempts = job.attempts, delay, error = %msg, "job failed transiently, scheduling retry");
                if let Err(e) = self.repository.finish_retry(job.job_id, &msg, delay).await {
                    error!(job_id = %job.job_id, error = %e, "failed to record retry state");
                }
            }
            Err(StageError::Transient(msg)) | Err(StageError::Permanent(msg)) => {
                error!(job_id = %job.job_id, attempts = job.attempts, error = %msg, "job failed permanently");
                if let Err(e) = self.repository.finish_error(job.job_id, &msg).await {
                    error!(job_id = %job.job_id, error = %e, "failed to record error state");
                }
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "JobProcessor"
    }

    async fn health_check(&self) -> Result<bool, StreamError> {
        Ok(true)
    }
}

impl<R: JobRepository> Clone for JobProcessor<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            artifacts: self.artifacts.clone(),
            extractor: Arc::clone(&self.extractor),
            curator: Arc::clone(&self.curator),
            analyst: Arc::clone(&self.analyst),
            credentials: self.credentials.clone(),
            locked_by: self.locked_by.clone(),
            lock_minutes: self.lock_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_seconds(1), 15);
        assert_eq!(backoff_seconds(2), 30);
        assert_eq!(backoff_seconds(3), 60);
        assert!(backoff_seconds(20) <= BACKOFF_MAX_SECONDS);
    }

    #[test]
    fn processor_name_is_stable() {
        assert_eq!("JobProcessor", "JobProcessor");
    }
}
