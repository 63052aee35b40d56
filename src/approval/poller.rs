use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::machine::{ApprovalMachine, ApprovalState};
use super::status::ApprovalStatus;
use crate::errors::{AppError, AppResult};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Where the poller reads the current approval status from.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// `AppError::Unauthorized` means the session is gone; anything else is retried.
    async fn fetch_status(&self) -> AppResult<ApprovalStatus>;
}

/// Calls `GET /api/approval-status` on a running server with a bearer token.
pub struct HttpStatusSource {
    client: Client,
    url: Url,
    token: String,
}

impl HttpStatusSource {
    pub fn new(base_url: &str, token: impl Into<String>) -> AppResult<Self> {
        let mut url = Url::parse(base_url)
            .map_err(|err| AppError::configuration(format!("invalid server url: {err}")))?;

        url.path_segments_mut()
            .map_err(|_| AppError::configuration("server url cannot be a base url"))?
            .pop_if_empty()
            .extend(["api", "approval-status"]);

        Ok(Self {
            client: Client::new(),
            url,
            token: token.into(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch_status(&self) -> AppResult<ApprovalStatus> {
        let response = self
            .client
            .get(self.url.clone())
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(AppError::unauthorized("session is no longer valid")),
            status if status.is_success() => Ok(response.json::<ApprovalStatus>().await?),
            status => Err(AppError::upstream(format!("approval status returned {status}"))),
        }
    }
}

/// Background task re-checking approval until it is granted.
///
/// The first check runs immediately, then once per interval or on
/// [`ApprovalPoller::check_now`]. Every transition is published on a watch
/// channel. The task ends on approval, sign-out, [`ApprovalPoller::stop`] or drop.
pub struct ApprovalPoller {
    state: Arc<watch::Sender<ApprovalMachine>>,
    cancel: CancellationToken,
    wake: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl ApprovalPoller {
    pub fn start(source: Arc<dyn StatusSource>, interval: Duration) -> Self {
        let mut machine = ApprovalMachine::new();
        machine.session_established();

        let (sender, _) = watch::channel(machine);
        let state = Arc::new(sender);
        let cancel = CancellationToken::new();
        let wake = Arc::new(Notify::new());

        let handle = tokio::spawn(run(
            source,
            interval,
            state.clone(),
            cancel.clone(),
            wake.clone(),
        ));

        Self {
            state,
            cancel,
            wake,
            handle: Some(handle),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ApprovalMachine> {
        self.state.subscribe()
    }

    pub fn current(&self) -> ApprovalMachine {
        self.state.borrow().clone()
    }

    /// Skips the rest of the current wait. No effect once the loop has ended.
    pub fn check_now(&self) {
        self.wake.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "approval poller task ended abnormally");
            }
        }
    }

    pub async fn sign_out(&mut self) {
        self.stop().await;
        self.state.send_modify(ApprovalMachine::sign_out);
    }

    /// Resolves with the status once approved, or `None` if the session ends first.
    pub async fn wait_until_approved(&self) -> Option<ApprovalStatus> {
        let mut receiver = self.subscribe();
        let machine = receiver
            .wait_for(|machine| {
                matches!(
                    machine.state(),
                    ApprovalState::Approved | ApprovalState::Unauthenticated
                )
            })
            .await
            .ok()?;

        if machine.is_approved() {
            machine.last_status().cloned()
        } else {
            None
        }
    }
}

impl Drop for ApprovalPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    source: Arc<dyn StatusSource>,
    interval: Duration,
    state: Arc<watch::Sender<ApprovalMachine>>,
    cancel: CancellationToken,
    wake: Arc<Notify>,
) {
    loop {
        let mut should_check = false;
        state.send_if_modified(|machine| {
            let before = machine.state();
            should_check = machine.begin_check();
            machine.state() != before
        });
        if !should_check {
            break;
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = source.fetch_status() => result,
        };

        match result {
            Ok(status) => {
                tracing::debug!(is_approved = status.is_approved, "approval status received");
                state.send_modify(|machine| machine.record_status(status));
            }
            Err(AppError::Unauthorized(message)) => {
                tracing::info!(%message, "session ended while waiting for approval");
                state.send_modify(ApprovalMachine::sign_out);
                break;
            }
            Err(err) => {
                tracing::warn!(error = %err, "approval status check failed, will retry");
                state.send_modify(|machine| machine.record_failure(err.to_string()));
            }
        }

        if state.borrow().is_approved() {
            tracing::info!("account approved");
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
            _ = wake.notified() => {}
        }
    }
}
