//! Job-related API endpoints

use crate::error::{ClientError, Result};
use crate::{API_KEY_HEADER, ScrapezyClient};
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use scrapezy_core::domain::{Credential, ExtractionRequest, JobHandle};
use scrapezy_core::dto::job::{PollJobResponse, SubmitJob, SubmitJobResponse};

impl ScrapezyClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit a new extraction job
    ///
    /// # Arguments
    /// * `req` - The page and prompt to extract with
    /// * `credential` - API key sent in the `x-api-key` header
    ///
    /// # Returns
    /// The parsed response; callers must check it for a job identifier
    pub async fn submit_job(
        &self,
        req: &ExtractionRequest,
        credential: &Credential,
    ) -> Result<SubmitJobResponse> {
        let url = format!("{}/extract", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, credential.expose())
            .json(&SubmitJob::from(req))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the current status of a job
    ///
    /// # Arguments
    /// * `job` - Handle returned by a previous submit
    /// * `credential` - API key sent in the `x-api-key` header
    pub async fn poll_job(&self, job: &JobHandle, credential: &Credential) -> Result<PollJobResponse> {
        let url = self.job_url(job)?;
        let response = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, credential.expose())
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Builds `{base}/extract/{job_id}` with the id as one encoded segment
    fn job_url(&self, job: &JobHandle) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid base url: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .push("extract")
            .push(&job.job_id);

        Ok(url)
    }
}
