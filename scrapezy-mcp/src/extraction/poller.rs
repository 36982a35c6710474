//! Job poller
//!
//! Drives one remote extraction job from submission to its terminal outcome.
//! Each run submits once, then polls on a fixed cadence until the job leaves
//! the pending state, the attempt budget runs out, or the caller cancels.

use scrapezy_client::ExtractionApi;
use scrapezy_core::domain::outcome::{CANCELLED_MESSAGE, SUBMIT_FAILED_MESSAGE, TIMED_OUT_MESSAGE};
use scrapezy_core::domain::{
    Credential, ExtractionOutcome, ExtractionRequest, FailureKind, JobHandle, JobStatus,
};
use scrapezy_core::dto::job::PollJobResponse;
use std::sync::Arc;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;

/// Runs extraction jobs to completion against an [`ExtractionApi`]
///
/// Holds no per-run state, so one poller can serve concurrent runs.
pub struct JobPoller {
    api: Arc<dyn ExtractionApi>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl JobPoller {
    /// Creates a new job poller
    pub fn new(config: &Config, api: Arc<dyn ExtractionApi>) -> Self {
        Self {
            api,
            poll_interval: config.poll_interval,
            max_attempts: config.max_poll_attempts,
        }
    }

    /// Runs one extraction job and returns its outcome
    ///
    /// Never fails: submission errors, job failures, timeouts and
    /// cancellation all come back as [`ExtractionOutcome::Failure`].
    pub async fn run(
        &self,
        req: &ExtractionRequest,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> ExtractionOutcome {
        let job = match self.submit(req, credential, cancel).await {
            Ok(job) => job,
            Err(outcome) => return outcome,
        };

        info!("Submitted extraction job {} for {}", job, req.url());

        let outcome = self.poll_until_done(&job, credential, cancel).await;

        match &outcome {
            ExtractionOutcome::Success { .. } => {
                info!("Extraction job {} completed", job);
            }
            ExtractionOutcome::Failure(failure) => {
                info!(
                    "Extraction job {} ended with {} failure: {}",
                    job, failure.kind, failure.message
                );
            }
        }

        outcome
    }

    /// Creates the remote job, or returns the failure outcome to end the run with
    async fn submit(
        &self,
        req: &ExtractionRequest,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<JobHandle, ExtractionOutcome> {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled()),
            response = self.api.submit_job(req, credential) => response,
        };

        match response {
            Ok(resp) => resp.job_handle().ok_or_else(|| {
                match &resp.error {
                    Some(error) => {
                        warn!("Extraction service rejected job for {}: {}", req.url(), error)
                    }
                    None => warn!("Extraction service returned no job id for {}", req.url()),
                }
                ExtractionOutcome::failure(FailureKind::Submission, SUBMIT_FAILED_MESSAGE)
            }),
            Err(e) => {
                warn!("Failed to submit extraction job for {}: {}", req.url(), e);
                Err(ExtractionOutcome::failure(
                    FailureKind::Transport,
                    SUBMIT_FAILED_MESSAGE,
                ))
            }
        }
    }

    /// Polls until the job leaves the pending state or attempts run out
    ///
    /// The delay comes before every poll, the first one included. A poll
    /// that errors still uses up its attempt.
    async fn poll_until_done(
        &self,
        job: &JobHandle,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> ExtractionOutcome {
        let mut attempts = 0;

        while attempts < self.max_attempts {
            attempts += 1;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(),
                _ = time::sleep(self.poll_interval) => {}
            }

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(),
                response = self.api.poll_job(job, credential) => response,
            };

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_pending() {
                        return terminal_outcome(job, status, &resp);
                    }
                    debug!(
                        "Job {} still pending (attempt {}/{})",
                        job, attempts, self.max_attempts
                    );
                }
                Err(e) => {
                    warn!(
                        "Failed to poll job {} (attempt {}/{}): {}",
                        job, attempts, self.max_attempts, e
                    );
                }
            }
        }

        warn!("Job {} still pending after {} polls", job, attempts);
        ExtractionOutcome::failure(FailureKind::Timeout, TIMED_OUT_MESSAGE)
    }
}

/// Maps a non-pending poll response to an outcome
///
/// A result payload wins over the reported status.
fn terminal_outcome(job: &JobHandle, status: JobStatus, resp: &PollJobResponse) -> ExtractionOutcome {
    debug!("Job {} reached status {:?}", job, status);

    match resp.payload() {
        Some(data) => ExtractionOutcome::success(data.clone()),
        None => ExtractionOutcome::failure(FailureKind::Job, resp.error_message()),
    }
}

fn cancelled() -> ExtractionOutcome {
    ExtractionOutcome::failure(FailureKind::Cancelled, CANCELLED_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapezy_client::{ClientError, Result as ClientResult};
    use scrapezy_core::dto::job::SubmitJobResponse;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// In-memory API that replays scripted responses and counts calls
    ///
    /// Once the poll script is exhausted every further poll reports pending.
    struct ScriptedApi {
        submit: Mutex<Option<ClientResult<SubmitJobResponse>>>,
        polls: Mutex<VecDeque<ClientResult<PollJobResponse>>>,
        submit_calls: AtomicUsize,
        poll_calls: AtomicUsize,
    }

    impl ScriptedApi {
        fn new(submit: ClientResult<SubmitJobResponse>) -> Self {
            Self {
                submit: Mutex::new(Some(submit)),
                polls: Mutex::new(VecDeque::new()),
                submit_calls: AtomicUsize::new(0),
                poll_calls: AtomicUsize::new(0),
            }
        }

        fn accepting() -> Self {
            Self::new(Ok(submit_body(json!({"jobId": "job-1"}))))
        }

        fn then_poll(self, response: ClientResult<PollJobResponse>) -> Self {
            self.polls.lock().unwrap().push_back(response);
            self
        }

        fn then_pending(self, count: usize) -> Self {
            (0..count).fold(self, |api, _| {
                api.then_poll(Ok(poll_body(json!({"status": "pending"}))))
            })
        }

        fn submit_calls(&self) -> usize {
            self.submit_calls.load(Ordering::SeqCst)
        }

        fn poll_calls(&self) -> usize {
            self.poll_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ExtractionApi for ScriptedApi {
        async fn submit_job(
            &self,
            _req: &ExtractionRequest,
            _credential: &Credential,
        ) -> ClientResult<SubmitJobResponse> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            self.submit
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(ClientError::InvalidRequest("submitted twice".into())))
        }

        async fn poll_job(
            &self,
            job: &JobHandle,
            _credential: &Credential,
        ) -> ClientResult<PollJobResponse> {
            assert_eq!(job.job_id, "job-1");
            self.poll_calls.fetch_add(1, Ordering::SeqCst);
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(poll_body(json!({"status": "pending"}))))
        }
    }

    fn submit_body(value: Value) -> SubmitJobResponse {
        serde_json::from_value(value).unwrap()
    }

    fn poll_body(value: Value) -> PollJobResponse {
        serde_json::from_value(value).unwrap()
    }

    fn request() -> ExtractionRequest {
        ExtractionRequest::new("https://example.com/team", "List team members and roles").unwrap()
    }

    async fn run(api: &Arc<ScriptedApi>) -> ExtractionOutcome {
        let poller = JobPoller::new(&Config::default(), api.clone());
        poller
            .run(&request(), &Credential::new("key"), &CancellationToken::new())
            .await
    }

    fn kind(outcome: &ExtractionOutcome) -> Option<FailureKind> {
        match outcome {
            ExtractionOutcome::Failure(failure) => Some(failure.kind),
            ExtractionOutcome::Success { .. } => None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_job_id_skips_polling() {
        let api = Arc::new(ScriptedApi::new(Ok(submit_body(
            json!({"error": "Invalid API key"}),
        ))));

        let outcome = run(&api).await;

        assert_eq!(outcome.error_message(), Some("Failed to submit extraction job"));
        assert_eq!(kind(&outcome), Some(FailureKind::Submission));
        assert_eq!(api.submit_calls() + api.poll_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_transport_error_keeps_message() {
        let api = Arc::new(ScriptedApi::new(Err(ClientError::api_error(
            503,
            "Service Unavailable",
        ))));

        let outcome = run(&api).await;

        assert_eq!(outcome.error_message(), Some("Failed to submit extraction job"));
        assert_eq!(kind(&outcome), Some(FailureKind::Transport));
        assert_eq!(api.poll_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_pending_times_out_after_thirty_polls() {
        let api = Arc::new(ScriptedApi::accepting());
        let start = Instant::now();

        let outcome = run(&api).await;

        assert_eq!(outcome.error_message(), Some("Extraction job timed out"));
        assert_eq!(kind(&outcome), Some(FailureKind::Timeout));
        assert_eq!(api.poll_calls(), 30);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_on_thirtieth_poll_wins_over_timeout() {
        let api = Arc::new(
            ScriptedApi::accepting()
                .then_pending(29)
                .then_poll(Ok(poll_body(json!({"status": "completed", "result": [1, 2]})))),
        );

        let outcome = run(&api).await;

        assert_eq!(outcome, ExtractionOutcome::success(json!([1, 2])));
        assert_eq!(api.poll_calls(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_stops_polling() {
        let payload = json!({"members": [{"name": "Ada", "role": "CTO"}]});
        let api = Arc::new(
            ScriptedApi::accepting()
                .then_pending(3)
                .then_poll(Ok(poll_body(json!({"status": "completed", "result": payload.clone()})))),
        );
        let start = Instant::now();

        let outcome = run(&api).await;

        assert_eq!(outcome, ExtractionOutcome::success(payload));
        assert_eq!(api.poll_calls(), 4);
        assert!(start.elapsed() >= Duration::from_secs(8));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_waits_for_interval() {
        let api = Arc::new(ScriptedApi::accepting().then_poll(Ok(poll_body(
            json!({"status": "completed", "result": {"ok": true}}),
        ))));
        let start = Instant::now();

        let outcome = run(&api).await;

        assert!(outcome.is_success());
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(api.poll_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_with_message() {
        let api = Arc::new(ScriptedApi::accepting().then_poll(Ok(poll_body(
            json!({"status": "failed", "error": "Page returned 404"}),
        ))));

        let outcome = run(&api).await;

        assert_eq!(outcome.error_message(), Some("Page returned 404"));
        assert_eq!(kind(&outcome), Some(FailureKind::Job));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_without_message() {
        let api = Arc::new(
            ScriptedApi::accepting().then_poll(Ok(poll_body(json!({"status": "failed"})))),
        );

        let outcome = run(&api).await;

        assert_eq!(outcome.error_message(), Some("Unknown error"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_without_result_is_failure() {
        let api = Arc::new(
            ScriptedApi::accepting().then_poll(Ok(poll_body(json!({"status": "completed"})))),
        );

        let outcome = run(&api).await;

        assert_eq!(outcome.error_message(), Some("Unknown error"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_error_uses_attempt_and_continues() {
        let api = Arc::new(
            ScriptedApi::accepting()
                .then_poll(Err(ClientError::ParseError("unexpected eof".into())))
                .then_poll(Ok(poll_body(json!({"status": "completed", "result": "done"})))),
        );

        let outcome = run(&api).await;

        assert_eq!(outcome, ExtractionOutcome::success(json!("done")));
        assert_eq!(api.poll_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_errors_until_exhausted_time_out() {
        let api = (0..30).fold(ScriptedApi::accepting(), |api, _| {
            api.then_poll(Err(ClientError::api_error(500, "boom")))
        });
        let api = Arc::new(api);

        let outcome = run(&api).await;

        assert_eq!(kind(&outcome), Some(FailureKind::Timeout));
        assert_eq!(api.poll_calls(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_submit() {
        let api = Arc::new(ScriptedApi::accepting());
        let poller = JobPoller::new(&Config::default(), api.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = poller.run(&request(), &Credential::new("key"), &cancel).await;

        assert_eq!(kind(&outcome), Some(FailureKind::Cancelled));
        assert_eq!(api.submit_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_waiting_is_not_a_timeout() {
        let api = Arc::new(ScriptedApi::accepting());
        let poller = JobPoller::new(&Config::default(), api.clone());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(7)).await;
            trigger.cancel();
        });

        let outcome = poller.run(&request(), &Credential::new("key"), &cancel).await;

        assert_eq!(outcome.error_message(), Some("Extraction job cancelled"));
        assert_eq!(api.poll_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_result_reports_error() {
        let api = Arc::new(ScriptedApi::accepting().then_poll(Ok(poll_body(
            json!({"status": "completed", "result": "", "error": "Nothing matched the prompt"}),
        ))));

        let outcome = run(&api).await;

        assert_eq!(outcome.error_message(), Some("Nothing matched the prompt"));
        assert_eq!(kind(&outcome), Some(FailureKind::Job));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_result_without_error_is_unknown_error() {
        let api = Arc::new(ScriptedApi::accepting().then_poll(Ok(poll_body(
            json!({"status": "completed", "result": 0, "error": 0}),
        ))));

        let outcome = run(&api).await;

        assert_eq!(outcome.error_message(), Some("Unknown error"));
    }

    #[tokio::test]
    async fn test_stalled_server_still_yields_outcome() {
        use scrapezy_client::ScrapezyClient;

        // Accepts connections and holds them open without ever answering
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = Config {
            api_url: format!("http://{}", addr),
            poll_interval: Duration::from_millis(10),
            max_poll_attempts: 2,
            request_timeout: Duration::from_millis(200),
        };
        let client =
            ScrapezyClient::with_timeout(config.api_url.clone(), config.request_timeout).unwrap();
        let poller = JobPoller::new(&config, Arc::new(client));

        let outcome = time::timeout(
            Duration::from_secs(10),
            poller.run(&request(), &Credential::new("key"), &CancellationToken::new()),
        )
        .await
        .expect("run must finish once the request timeout fires");

        assert_eq!(outcome.error_message(), Some("Failed to submit extraction job"));
        assert_eq!(kind(&outcome), Some(FailureKind::Transport));
    }
}
