//! Client for the hosted chat-completions API.

use async_trait::async_trait;
use relay_protocol::{Upstream, UpstreamError, UpstreamResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::UpstreamConfig;

/// Longest slice of an error body kept for logs.
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [CompletionMessage<'a>; 1],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<Value>,
}

impl CompletionResponse {
    /// `choices[0].message.content`, accepting either a plain string or a
    /// list of text chunks.
    fn into_content(self) -> UpstreamResult<String> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Malformed("no choices".to_string()))?;
        let content = choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| UpstreamError::Malformed("choice has no content".to_string()))?;

        match content {
            Value::String(text) => Ok(text),
            Value::Array(chunks) => chunks
                .iter()
                .map(|chunk| match chunk.get("text").and_then(Value::as_str) {
                    Some(text) => Ok(text),
                    None => Err(UpstreamError::Malformed(
                        "content chunk without text".to_string(),
                    )),
                })
                .collect(),
            other => Err(UpstreamError::Malformed(format!(
                "unexpected content type: {other}"
            ))),
        }
    }
}

/// One blocking round trip per call: no retries, no upstream streaming.
#[derive(Clone)]
pub struct MistralClient {
    client: Client,
    config: UpstreamConfig,
}

impl MistralClient {
    pub fn new(config: UpstreamConfig) -> UpstreamResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }
}

fn transport_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(err.to_string())
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > ERROR_BODY_LIMIT {
        let mut cut = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[async_trait]
impl Upstream for MistralClient {
    async fn complete(&self, message: &str) -> UpstreamResult<String> {
        let request = CompletionRequest {
            model: &self.config.model,
            messages: [CompletionMessage {
                role: "user",
                content: message,
            }],
        };

        tracing::debug!(model = %self.config.model, chars = message.chars().count(), "calling upstream");

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let payload: CompletionResponse = serde_json::from_slice(&body)
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        payload.into_content()
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> UpstreamResult<String> {
        serde_json::from_str::<CompletionResponse>(json)
            .unwrap()
            .into_content()
    }

    #[test]
    fn string_content() {
        let text = parse(r#"{"choices":[{"message":{"role":"assistant","content":"Hi!"}}]}"#);
        assert_eq!(text.unwrap(), "Hi!");
    }

    #[test]
    fn chunked_content_is_joined() {
        let text = parse(
            r#"{"choices":[{"message":{"content":[{"type":"text","text":"Hel"},{"type":"text","text":"lo"}]}}]}"#,
        );
        assert_eq!(text.unwrap(), "Hello");
    }

    #[test]
    fn missing_pieces_are_malformed() {
        for json in [
            r#"{}"#,
            r#"{"choices":[]}"#,
            r#"{"choices":[{}]}"#,
            r#"{"choices":[{"message":{}}]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":42}}]}"#,
        ] {
            assert!(
                matches!(parse(json), Err(UpstreamError::Malformed(_))),
                "{json}"
            );
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "字".repeat(ERROR_BODY_LIMIT);
        let cut = truncate(body);
        assert!(cut.len() <= ERROR_BODY_LIMIT);
        assert!(cut.chars().all(|c| c == '字'));
    }

    #[test]
    fn request_shape() {
        let request = CompletionRequest {
            model: "m",
            messages: [CompletionMessage {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "m", "messages": [{"role": "user", "content": "hi"}]})
        );
    }
}
