use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::provider::{read_json, text_at, LlmError, LlmProvider, Message};

/// Local models through Ollama's `/api/chat`, non-streaming.
pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn request_body(&self, messages: &[Message], temperature: f32, max_tokens: u32) -> Value {
        let messages: Vec<Value> = messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();
        json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": temperature,
                "num_predict": max_tokens,
            },
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.url);
        debug!(%url, model = %self.model, "Ollama request");

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(&messages, temperature, max_tokens))
            .send()
            .await?;

        let resp = read_json(response).await?;
        text_at(&resp, "/message/content")
    }

    fn describe(&self) -> String {
        format!("ollama/{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_disables_streaming_and_caps_output() {
        let provider = OllamaProvider::new("http://localhost:11434/".into(), "llama3.2".into());
        let body = provider.request_body(&[Message::user("hi")], 0.5, 1000);
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 1000);
        assert_eq!(provider.url, "http://localhost:11434");
    }
}
