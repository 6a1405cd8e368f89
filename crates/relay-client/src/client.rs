//! HTTP client for the chat endpoint.

use relay_pacing::{Clock, TokioClock};
use relay_protocol::{ChatRequest, CHAT_PATH};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::render::{Renderer, Reply};
use crate::reveal::{RevealAnimator, DEFAULT_REVEAL_INTERVAL};
use crate::view::{MessageView, Role};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends chat messages and renders the streamed replies into a view.
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    view: Arc<dyn MessageView>,
    clock: Arc<dyn Clock>,
    reveal_interval: Duration,
}

impl ChatClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str, view: Arc<dyn MessageView>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: format!("{}{CHAT_PATH}", base_url.trim_end_matches('/')),
            view,
            clock: Arc::new(TokioClock),
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one message and render the reply.
    ///
    /// Validation and transport failures are shown as a warning on the view
    /// and returned. Once the stream opens, every outcome (including an
    /// `error` event or a cut-off stream) is a [`Reply`].
    pub async fn send(&self, input: &str) -> Result<Reply> {
        let request = match ChatRequest::for_send(input) {
            Ok(request) => request,
            Err(err) => return Err(self.fail(err.into())),
        };

        self.view.add_message(Role::User, &request.message);
        self.view.show_typing_indicator();

        let response = match self.post(&request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, endpoint = %self.endpoint, "chat request failed");
                self.view.remove_typing_indicator();
                return Err(self.fail(err));
            }
        };

        let animator = RevealAnimator::new(Arc::clone(&self.view), Arc::clone(&self.clock))
            .with_interval(self.reveal_interval);
        let reply = Renderer::new(Arc::clone(&self.view), animator)
            .run(response.bytes_stream())
            .await;
        tracing::debug!(status = ?reply.status, chars = reply.content.chars().count(), "reply rendered");
        Ok(reply)
    }

    async fn post(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn fail(&self, err: ClientError) -> ClientError {
        self.view.warn(&err.user_message());
        err
    }
}
