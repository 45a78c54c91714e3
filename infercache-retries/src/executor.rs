//! Retry executor for running queries against a transport.

use crate::backoff::{estimated_time, ResponseClass, WaitReason};
use crate::config::RetryConfig;
use crate::error::{excerpt, TransportError};
use crate::transport::{Transport, TransportResponse};
use async_trait::async_trait;
use infercache_core::{ensure_model, Payload, QueryError, QueryExecutor, QueryResult, ResponseBody};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// State of a single `execute` call.
#[derive(Debug, Clone)]
pub struct RetryState {
    /// Current attempt number (1-indexed).
    pub attempt: u32,
    /// Attempt budget.
    pub max_attempts: u32,
    /// Base delay in effect.
    pub base_delay: Duration,
    /// Status of the last response received.
    pub last_status: Option<u16>,
    /// Truncated body of the last response received.
    pub last_body_excerpt: String,
    /// Total time spent waiting.
    pub total_wait_time: Duration,
    /// History of attempts.
    pub history: Vec<AttemptInfo>,
}

impl RetryState {
    fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            base_delay: config.base_delay,
            last_status: None,
            last_body_excerpt: String::new(),
            total_wait_time: Duration::ZERO,
            history: Vec::new(),
        }
    }

    /// Waits performed after each attempt, in order.
    pub fn waits(&self) -> Vec<Duration> {
        self.history
            .iter()
            .map(|a| a.wait_time)
            .filter(|w| !w.is_zero())
            .collect()
    }

    fn record(&mut self, outcome: AttemptOutcome, wait_time: Duration) {
        self.total_wait_time += wait_time;
        self.history.push(AttemptInfo {
            attempt: self.attempt,
            outcome,
            status: match outcome {
                AttemptOutcome::TimedOut | AttemptOutcome::TransportFailure => None,
                _ => self.last_status,
            },
            wait_time,
        });
    }
}

/// Information about a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptInfo {
    /// Attempt number.
    pub attempt: u32,
    /// How the attempt ended.
    pub outcome: AttemptOutcome,
    /// Status code, when a response was received.
    pub status: Option<u16>,
    /// Time waited after this attempt.
    pub wait_time: Duration,
}

/// How an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Success status with a usable body.
    Success,
    /// Success status with an unusable body.
    InvalidBody,
    /// Model still loading.
    ModelLoading,
    /// Rate limited.
    RateLimited,
    /// Non-retryable status.
    Fatal,
    /// The request timed out.
    TimedOut,
    /// Transport failure other than a timeout.
    TransportFailure,
}

/// Cancellation observed at a suspension point.
struct Interrupted;

/// Executes queries, absorbing cold starts, rate limits and timeouts.
///
/// # Example
///
/// ```ignore
/// use infercache_retries::{ResilientExecutor, ReqwestTransport, RetryConfig};
///
/// let transport = ReqwestTransport::new(ApiToken::from_env()?);
/// let executor = ResilientExecutor::new(transport, RetryConfig::default())?;
/// let body = executor.execute("openrouter/auto", &payload).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ResilientExecutor<T> {
    transport: T,
    config: RetryConfig,
    cancel: Option<CancellationToken>,
}

impl<T: Transport> ResilientExecutor<T> {
    /// Create an executor, validating the config.
    pub fn new(transport: T, config: RetryConfig) -> QueryResult<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            config,
            cancel: None,
        })
    }

    /// Abort in-flight attempts and backoff waits when `token` fires.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Get a reference to the retry config.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute and get state information alongside the result.
    pub async fn execute_with_state(
        &self,
        model: &str,
        payload: &Payload,
    ) -> (QueryResult<ResponseBody>, RetryState) {
        let mut state = RetryState::new(&self.config);
        let result = self.run(model, payload, &mut state).await;
        (result, state)
    }

    async fn run(
        &self,
        model: &str,
        payload: &Payload,
        state: &mut RetryState,
    ) -> QueryResult<ResponseBody> {
        ensure_model(model)?;

        let max_attempts = self.config.max_attempts;

        for attempt_index in 0..max_attempts {
            state.attempt = attempt_index + 1;
            let is_last = state.attempt == max_attempts;

            debug!(
                model,
                attempt = state.attempt,
                max_attempts,
                "Executing query attempt"
            );

            let sent = self
                .send_once(model, payload)
                .await
                .map_err(|Interrupted| QueryError::Cancelled)?;

            let (reason, outcome) = match sent {
                Ok(response) => {
                    state.last_status = Some(response.status);
                    state.last_body_excerpt = excerpt(&response.body, self.config.excerpt_len);

                    match ResponseClass::of(response.status) {
                        ResponseClass::Success => {
                            return match parse_body(&response) {
                                Ok(body) => {
                                    state.record(AttemptOutcome::Success, Duration::ZERO);
                                    Ok(body)
                                }
                                Err(e) => {
                                    state.record(AttemptOutcome::InvalidBody, Duration::ZERO);
                                    Err(e)
                                }
                            };
                        }
                        ResponseClass::ModelLoading => (
                            WaitReason::ModelLoading {
                                estimated: estimated_time(&response.body),
                            },
                            AttemptOutcome::ModelLoading,
                        ),
                        ResponseClass::RateLimited => {
                            (WaitReason::RateLimited, AttemptOutcome::RateLimited)
                        }
                        ResponseClass::Fatal => {
                            state.record(AttemptOutcome::Fatal, Duration::ZERO);
                            warn!(
                                model,
                                status = response.status,
                                "Non-retryable status, giving up"
                            );
                            return Err(QueryError::fatal_http(response.status, response.body));
                        }
                    }
                }
                Err(TransportError::Timeout) => {
                    warn!(
                        model,
                        attempt = state.attempt,
                        max_attempts,
                        "Request timed out"
                    );
                    if is_last {
                        state.record(AttemptOutcome::TimedOut, Duration::ZERO);
                        return Err(QueryError::TimeoutExhausted {
                            attempts: state.attempt,
                            timeout: self.config.request_timeout,
                        });
                    }
                    (WaitReason::Timeout, AttemptOutcome::TimedOut)
                }
                Err(e) => {
                    state.record(AttemptOutcome::TransportFailure, Duration::ZERO);
                    return Err(QueryError::Transport(e.to_string()));
                }
            };

            if is_last {
                state.record(outcome, Duration::ZERO);
                break;
            }

            let wait = reason.wait(&self.config, attempt_index);
            state.record(outcome, wait);

            warn!(
                model,
                attempt = state.attempt,
                max_attempts,
                reason = ?reason,
                wait_ms = wait.as_millis(),
                "Waiting before retry"
            );

            self.pause(wait)
                .await
                .map_err(|Interrupted| QueryError::Cancelled)?;
        }

        warn!(
            model,
            attempts = state.attempt,
            last_status = ?state.last_status,
            "Retries exhausted"
        );

        Err(QueryError::RetriesExhausted {
            attempts: state.attempt,
            last_status: state.last_status,
            body_excerpt: state.last_body_excerpt.clone(),
        })
    }

    /// One bounded request; the outer `Err` means cancelled.
    async fn send_once(
        &self,
        model: &str,
        payload: &Payload,
    ) -> Result<Result<TransportResponse, TransportError>, Interrupted> {
        let bounded = timeout(self.config.request_timeout, self.transport.send(model, payload));

        let result = match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(Interrupted),
                r = bounded => r,
            },
            None => bounded.await,
        };

        Ok(result.unwrap_or(Err(TransportError::Timeout)))
    }

    async fn pause(&self, wait: Duration) -> Result<(), Interrupted> {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(Interrupted),
                _ = sleep(wait) => Ok(()),
            },
            None => {
                sleep(wait).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<T: Transport> QueryExecutor for ResilientExecutor<T> {
    async fn execute(&self, model: &str, payload: &Payload) -> QueryResult<ResponseBody> {
        self.execute_with_state(model, payload).await.0
    }
}

fn parse_body(response: &TransportResponse) -> QueryResult<ResponseBody> {
    match serde_json::from_str::<serde_json::Value>(&response.body) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(QueryError::invalid_response(
            "response body is not a JSON object",
        )),
        Err(e) => Err(QueryError::invalid_response(format!(
            "response body is not valid JSON: {}",
            e
        ))),
    }
}
