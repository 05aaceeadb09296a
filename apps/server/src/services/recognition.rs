//! Client for the external face recognition service.
//!
//! `POST {base}/encode` builds the face encodings of one student from their
//! photos. `POST {base}/merge-encodings` merges the encodings of a class's
//! students into one model artifact stored back into the blob store.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::config::RecognitionSettings;
use crate::error::{AppError, AppResult};

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of encoding one student's photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EncodeOutcome {
    pub student_id: String,
    pub message: String,
    pub encoded_faces: u32,
    pub uploaded: bool,
    /// Blob store key of the encoding file
    pub output_path: Option<String>,
}

/// Result of merging a class section's encodings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MergeOutcome {
    pub class_section_id: String,
    pub message: String,
    pub total_encoded_faces: u32,
    pub students_processed: Vec<String>,
    pub students_failed: Vec<String>,
    pub uploaded: bool,
    /// Blob store key of the merged model
    pub model_path: Option<String>,
}

#[async_trait]
pub trait RecognitionService: Send + Sync {
    async fn encode(&self, student_id: &str) -> AppResult<EncodeOutcome>;

    async fn merge_encodings(
        &self,
        class_section_id: &str,
        student_ids: &[String],
    ) -> AppResult<MergeOutcome>;
}

// Wire format of the recognition service

#[derive(Serialize)]
struct EncodeRequest<'a> {
    nim: &'a str,
}

#[derive(Deserialize)]
struct EncodeResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    encoded_faces: u32,
    #[serde(default, rename = "uploaded_to_supabase")]
    uploaded: bool,
    #[serde(default, rename = "supabase_output_path")]
    output_path: Option<String>,
}

#[derive(Serialize)]
struct MergeRequest<'a> {
    #[serde(rename = "kodeKelas")]
    class_code: &'a str,
    nim_list: &'a [String],
}

#[derive(Deserialize)]
struct MergeResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    total_encoded_faces: u32,
    #[serde(default)]
    nims_processed: Vec<String>,
    #[serde(default)]
    nims_failed: Vec<String>,
    #[serde(default, rename = "uploaded_to_supabase_model")]
    uploaded: bool,
    #[serde(default, rename = "supabase_combined_file_path_model")]
    model_path: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "detail", alias = "error")]
    message: String,
}

/// HTTP implementation of [`RecognitionService`].
#[derive(Clone)]
pub struct HttpRecognitionService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecognitionService {
    pub fn new(settings: &RecognitionSettings) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Recognition(format!("Failed to build HTTP client: {}", e)))?;

        info!("Recognition service client initialized (base_url={})", settings.base_url);

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<R> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            warn!("Recognition: request to {} failed: {}", url, e);
            AppError::Recognition(format!("Recognition service unreachable: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|b| b.message)
                .unwrap_or_else(|_| status.to_string());
            warn!("Recognition: {} returned {}: {}", url, status, message);
            return Err(AppError::Recognition(message));
        }

        response.json::<R>().await.map_err(|e| {
            warn!("Recognition: invalid response from {}: {}", url, e);
            AppError::Recognition(format!("Invalid response from recognition service: {}", e))
        })
    }
}

#[async_trait]
impl RecognitionService for HttpRecognitionService {
    async fn encode(&self, student_id: &str) -> AppResult<EncodeOutcome> {
        let response: EncodeResponse = self
            .post("encode", &EncodeRequest { nim: student_id })
            .await?;

        Ok(EncodeOutcome {
            student_id: student_id.to_string(),
            message: response.message,
            encoded_faces: response.encoded_faces,
            uploaded: response.uploaded,
            output_path: response.output_path,
        })
    }

    async fn merge_encodings(
        &self,
        class_section_id: &str,
        student_ids: &[String],
    ) -> AppResult<MergeOutcome> {
        let response: MergeResponse = self
            .post(
                "merge-encodings",
                &MergeRequest {
                    class_code: class_section_id,
                    nim_list: student_ids,
                },
            )
            .await?;

        Ok(MergeOutcome {
            class_section_id: class_section_id.to_string(),
            message: response.message,
            total_encoded_faces: response.total_encoded_faces,
            students_processed: response.nims_processed,
            students_failed: response.nims_failed,
            uploaded: response.uploaded,
            model_path: response.model_path,
        })
    }
}
