//! Core Analyzer implementation

use std::path::Path;

use crate::config::AnalyzerConfig;
use crate::error::AnalyzeError;
use crate::parser::parse_model_reply;
use crate::prompt::{build_user_prompt, ChunkPromptBuilder, PageSpan, SYSTEM_INSTRUCTION};
use crate::queue::WorkQueue;
use pdflens_chunker::Partition;
use pdflens_domain::{
    classify, reconcile_answers, AnalysisRequest, AnalysisResponse, AnalysisService,
    AnalysisSource, DocumentFetcher, FileService, FileState, InferenceRequest, QueryResponse,
    RemoteError, RemoteFile, ResponseSchema,
};
use pdflens_llm::{GeminiClient, HttpFetcher};
use tracing::{debug, info, warn};

/// Handles produced during a call plus the reconciled answers
type Outcome = (Vec<String>, Vec<QueryResponse>);

/// The Analyzer answers a fixed list of questions about a PDF
///
/// Documents too large for one call are partitioned by page range and
/// analyzed in order, with each partition's findings fed into the next.
pub struct Analyzer<F, A, D>
where
    F: FileService,
    A: AnalysisService,
    D: DocumentFetcher,
{
    files: F,
    analysis: A,
    fetcher: D,
    config: AnalyzerConfig,
}

/// Analyzer wired to the Gemini API and an HTTP fetcher
pub type GeminiAnalyzer = Analyzer<GeminiClient, GeminiClient, HttpFetcher>;

impl GeminiAnalyzer {
    /// Build an analyzer from `GEMINI_API_KEY` / `GEMINI_MODEL`
    pub fn from_env(config: AnalyzerConfig) -> Result<Self, AnalyzeError> {
        config.validate().map_err(AnalyzeError::Config)?;
        let client = GeminiClient::from_env()?;
        Ok(Analyzer::new(client.clone(), client, HttpFetcher::new(), config))
    }
}

impl<F, A, D> Analyzer<F, A, D>
where
    F: FileService + Send + Sync,
    A: AnalysisService + Send + Sync,
    D: DocumentFetcher + Send + Sync,
{
    /// Create a new Analyzer
    pub fn new(files: F, analysis: A, fetcher: D, config: AnalyzerConfig) -> Self {
        Self {
            files,
            analysis,
            fetcher,
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Answer every query in the request
    ///
    /// Returns one answer per query, in query order, or an error; never a
    /// partial result.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse, AnalyzeError> {
        request.validate()?;
        let source = classify(&request.source)?;
        let queries = &request.queries;

        info!(
            "Starting analysis of {} '{}' with {} queries",
            source.kind(),
            source,
            queries.len()
        );

        let (cached_handles, responses) = match source {
            AnalysisSource::ExternalHandleList(handles) => {
                self.replay_handles(&handles, queries).await?
            }
            AnalysisSource::ExternalHandle(uri) => self.analyze_handle(uri, queries).await?,
            AnalysisSource::LocalPath(path) => {
                let bytes = self.read_local(&path).await?;
                self.analyze_bytes(bytes, queries).await?
            }
            AnalysisSource::WebUrl(url) => {
                let bytes = self
                    .fetcher
                    .fetch(&url, self.config.fetch_timeout())
                    .await?;
                debug!("Fetched {} bytes from {}", bytes.len(), url);
                self.analyze_bytes(bytes, queries).await?
            }
        };

        info!(
            "Analysis complete: {} answers, {} cached handles",
            responses.len(),
            cached_handles.len()
        );

        Ok(AnalysisResponse {
            source: request.source,
            cached_handles,
            responses,
        })
    }

    async fn read_local(&self, path: &Path) -> Result<Vec<u8>, AnalyzeError> {
        let bytes = tokio::fs::read(path).await?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(bytes)
    }

    /// Analyze an already-uploaded file in a single call
    ///
    /// There are no bytes to split, so a size-limit failure is final.
    async fn analyze_handle(&self, uri: String, queries: &[String]) -> Result<Outcome, AnalyzeError> {
        let prompt = build_user_prompt(queries);
        let raw = self
            .infer(&uri, SYSTEM_INSTRUCTION, &prompt, ResponseSchema::Answers)
            .await?;
        let reply = parse_model_reply(&raw)?;
        Ok((vec![uri], reconcile_answers(queries, &reply.responses)))
    }

    /// Try the whole document first, then fall back to partitioned analysis
    async fn analyze_bytes(&self, bytes: Vec<u8>, queries: &[String]) -> Result<Outcome, AnalyzeError> {
        if self.config.attempt_whole_document {
            if bytes.len() <= self.config.max_upload_bytes {
                let file = self.upload_and_wait(&bytes).await?;
                let prompt = build_user_prompt(queries);

                match self
                    .infer(&file.uri, SYSTEM_INSTRUCTION, &prompt, ResponseSchema::Answers)
                    .await
                {
                    Ok(raw) => {
                        let reply = parse_model_reply(&raw)?;
                        return Ok((vec![file.uri], reconcile_answers(queries, &reply.responses)));
                    }
                    Err(e) if e.is_size_limit() => {
                        info!("Whole document exceeds the input limit, switching to partitioned analysis");
                    }
                    Err(e) => return Err(e.into()),
                }
            } else {
                debug!(
                    "Skipping whole-document attempt: {} bytes exceeds the {} byte upload ceiling",
                    bytes.len(),
                    self.config.max_upload_bytes
                );
            }
        }

        let whole = run_blocking(move || Partition::wrap(bytes)).await?;
        info!(
            "Partitioning {} page document ({} bytes)",
            whole.total_pages(),
            whole.byte_len()
        );
        self.process_queue(whole, queries).await
    }

    /// Drain the partition queue, splitting on oversize and size-limit failures
    async fn process_queue(&self, whole: Partition, queries: &[String]) -> Result<Outcome, AnalyzeError> {
        let prompt = build_user_prompt(queries);

        let mut queue = WorkQueue::new();
        queue.push_back(whole);

        let mut processed = 0;
        let mut previous_findings: Option<String> = None;
        let mut handles = Vec::new();

        while let Some(partition) = queue.pop_front() {
            let estimated_total = queue.estimated_total(processed);

            if partition.byte_len() > self.config.max_upload_bytes {
                info!(
                    "Pages {}-{} are {} bytes, over the {} byte upload ceiling; splitting",
                    partition.start_page() + 1,
                    partition.end_page(),
                    partition.byte_len(),
                    self.config.max_upload_bytes
                );
                let (first, second) = split(partition).await?;
                queue.push_front_pair(first, second);
                continue;
            }

            let file = self.upload_and_wait(partition.bytes()).await?;
            let instruction = ChunkPromptBuilder::new(processed, estimated_total)
                .with_previous_findings(previous_findings.as_deref())
                .with_pages(PageSpan::from(&partition))
                .build();

            match self
                .infer(&file.uri, &instruction, &prompt, ResponseSchema::AnswersWithFindings)
                .await
            {
                Ok(raw) => {
                    let reply = parse_model_reply(&raw)?;
                    if let Some(findings) = reply.findings_summary {
                        previous_findings = Some(findings);
                    } else {
                        warn!("Chunk {} returned no findings summary", processed + 1);
                    }
                    handles.push(file.uri);
                    processed += 1;

                    info!(
                        "Chunk {} of ~{} complete (pages {}-{} of {})",
                        processed,
                        estimated_total,
                        partition.start_page() + 1,
                        partition.end_page(),
                        partition.total_pages()
                    );

                    if queue.is_empty() {
                        return Ok((handles, reconcile_answers(queries, &reply.responses)));
                    }
                }
                Err(e) if e.is_size_limit() => {
                    warn!(
                        "Pages {}-{} exceed the input limit; splitting and retrying",
                        partition.start_page() + 1,
                        partition.end_page()
                    );
                    let (first, second) = split(partition).await?;
                    queue.push_front_pair(first, second);
                }
                Err(e) => return Err(e.into()),
            }
        }

        // The loop returns after the final partition; reaching here means nothing was queued
        Err(AnalyzeError::EmptyDocument)
    }

    /// Re-analyze previously uploaded partitions in order
    async fn replay_handles(&self, handles: &[String], queries: &[String]) -> Result<Outcome, AnalyzeError> {
        let prompt = build_user_prompt(queries);
        let mut previous_findings: Option<String> = None;
        let mut last_responses = Vec::new();

        for (index, uri) in handles.iter().enumerate() {
            let instruction = ChunkPromptBuilder::new(index, handles.len())
                .with_previous_findings(previous_findings.as_deref())
                .build();

            let raw = self
                .infer(uri, &instruction, &prompt, ResponseSchema::AnswersWithFindings)
                .await?;
            let reply = parse_model_reply(&raw)?;
            if let Some(findings) = reply.findings_summary {
                previous_findings = Some(findings);
            }
            last_responses = reply.responses;

            info!("Cached chunk {} of {} complete", index + 1, handles.len());
        }

        Ok((handles.to_vec(), reconcile_answers(queries, &last_responses)))
    }

    /// Upload bytes and poll until the file is usable
    async fn upload_and_wait(&self, bytes: &[u8]) -> Result<RemoteFile, AnalyzeError> {
        let file = self.files.upload(bytes, &self.config.mime_type).await?;
        if file.name.is_empty() || file.uri.is_empty() {
            return Err(AnalyzeError::UploadFailed("missing name or URI".to_string()));
        }
        debug!("Uploaded {} bytes as {}", bytes.len(), file.name);
        if file.state == FileState::Active {
            return Ok(file);
        }

        let attempts = self.config.poll_attempts;
        for attempt in 1..=attempts {
            match self.files.status(&file.name).await? {
                FileState::Active => return Ok(file),
                FileState::Failed => {
                    return Err(AnalyzeError::UploadFailed(format!(
                        "processing failed for {}",
                        file.name
                    )))
                }
                FileState::Unknown => {
                    warn!("{} reported an unrecognized state; treating it as ready", file.name);
                    return Ok(file);
                }
                FileState::Processing => {
                    debug!("{} still processing (poll {}/{})", file.name, attempt, attempts);
                    if attempt < attempts {
                        tokio::time::sleep(self.config.poll_interval()).await;
                    }
                }
            }
        }

        Err(AnalyzeError::ProcessingTimeout {
            name: file.name,
            attempts,
        })
    }

    async fn infer(
        &self,
        file_uri: &str,
        system_instruction: &str,
        prompt: &str,
        schema: ResponseSchema,
    ) -> Result<String, RemoteError> {
        self.analysis
            .infer(InferenceRequest {
                file_uri,
                mime_type: &self.config.mime_type,
                prompt,
                system_instruction,
                schema,
            })
            .await
    }
}

async fn split(partition: Partition) -> Result<(Partition, Partition), AnalyzeError> {
    run_blocking(move || partition.split_in_half()).await
}

/// Run CPU-bound PDF work off the async threads
async fn run_blocking<T, W>(work: W) -> Result<T, AnalyzeError>
where
    W: FnOnce() -> pdflens_chunker::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AnalyzeError::Task(format!("Task join error: {}", e)))?
        .map_err(AnalyzeError::from)
}
