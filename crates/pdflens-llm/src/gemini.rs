//! Gemini Provider Implementation
//!
//! Talks to the Gemini REST API:
//!
//! - `POST /upload/v1beta/files` (multipart) to upload a document
//! - `GET /v1beta/{name}` to poll its processing state
//! - `POST /v1beta/models/{model}:generateContent` for structured analysis
//!
//! Uploaded files are retained by the service for 48 hours.

use std::time::{SystemTime, UNIX_EPOCH};

use pdflens_domain::{
    AnalysisService, FileService, FileState, InferenceRequest, RemoteError, RemoteFile,
    ResponseSchema,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::GeminiConfig;
use crate::LlmError;

/// Gemini API client implementing the file-handle and analysis services
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

/// Upload response: `{"file": {...}}`
#[derive(Deserialize)]
struct UploadResponse {
    file: FileResource,
}

#[derive(Deserialize)]
struct FileResource {
    #[serde(default)]
    name: String,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    state: Option<FileState>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Create a client from a validated configuration
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { config, http })
    }

    /// Create a client from `GEMINI_API_KEY` / `GEMINI_MODEL`
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// The active configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1beta/{}", self.config.base_url, path)
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/v1beta/files", self.config.base_url)
    }

    /// Send a request and decode a JSON body, mapping error statuses
    async fn send_json<T>(&self, request: reqwest::RequestBuilder) -> Result<T, RemoteError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = request
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| RemoteError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Communication(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| RemoteError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

impl FileService for GeminiClient {
    async fn upload(&self, bytes: &[u8], mime_type: &str) -> Result<RemoteFile, RemoteError> {
        let boundary = format!(
            "----pdflens{:x}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let body = multipart_body(&boundary, bytes, mime_type);

        debug!("Uploading {} bytes ({})", bytes.len(), mime_type);

        let request = self
            .http
            .post(self.upload_url())
            .header("X-Goog-Upload-Protocol", "multipart")
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body);

        let response: UploadResponse = self.send_json(request).await?;
        let file = response.file;

        Ok(RemoteFile {
            name: file.name,
            uri: file.uri,
            state: file.state.unwrap_or(FileState::Processing),
        })
    }

    async fn status(&self, name: &str) -> Result<FileState, RemoteError> {
        let request = self.http.get(self.api_url(name));
        let file: FileResource = self.send_json(request).await?;
        Ok(file.state.unwrap_or(FileState::Unknown))
    }
}

impl AnalysisService for GeminiClient {
    async fn infer(&self, request: InferenceRequest<'_>) -> Result<String, RemoteError> {
        let mut generation_config = json!({
            "responseMimeType": "application/json",
            "responseSchema": response_schema(request.schema),
        });
        if let Some(level) = &self.config.thinking_level {
            generation_config["thinkingConfig"] = json!({ "thinkingLevel": level });
        }

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "fileData": { "fileUri": request.file_uri, "mimeType": request.mime_type } },
                    { "text": request.prompt },
                ],
            }],
            "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
            "generationConfig": generation_config,
        });

        let url = self.api_url(&format!("models/{}:generateContent", self.config.model));
        debug!("generateContent on {} with model {}", request.file_uri, self.config.model);

        let response: GenerateResponse = self.send_json(self.http.post(url).json(&body)).await?;
        response_text(response)
    }
}

/// Build a `multipart/related` body: JSON metadata part, then the file part
fn multipart_body(boundary: &str, bytes: &[u8], mime_type: &str) -> Vec<u8> {
    let metadata = json!({ "file": { "displayName": "document.pdf" } });

    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

/// Pull the service's message out of an error body, or fall back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

/// Concatenate the non-thought text parts of the first candidate
fn response_text(response: GenerateResponse) -> Result<String, RemoteError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(RemoteError::InvalidResponse(format!(
                "Prompt blocked: {}",
                reason
            )));
        }
        return Ok(String::new());
    };

    Ok(candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

/// OpenAPI-subset schema for structured output
fn response_schema(schema: ResponseSchema) -> Value {
    let answers = json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "query": { "type": "STRING", "description": "The original question" },
                "answer": { "type": "STRING", "description": "The answer based on PDF content" },
            },
            "required": ["query", "answer"],
        },
        "description": "Array of query-answer pairs",
    });

    match schema {
        ResponseSchema::Answers => json!({
            "type": "OBJECT",
            "properties": { "responses": answers },
            "required": ["responses"],
        }),
        ResponseSchema::AnswersWithFindings => json!({
            "type": "OBJECT",
            "properties": {
                "responses": answers,
                "findings_summary": {
                    "type": "STRING",
                    "description": "Summary of findings so far across all processed chunks. Include page citations, partial answers, and what remains unanswered.",
                },
            },
            "required": ["responses", "findings_summary"],
        }),
    }
}
