use serde::{Deserialize, Serialize};

/// A chat-completions request in the OpenAI wire shape. Also the body of
/// `POST /langchain/completions`, so it derives `Deserialize` too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Convenience single-prompt form; folded into `messages` by callers.
    #[serde(default, skip_serializing)]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            prompt: None,
            max_tokens: None,
            temperature: None,
            stream: None,
        }
    }

    /// Folds the single-prompt convenience field into `messages`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if let Some(prompt) = self.prompt.take() {
            if self.messages.is_empty() {
                self.messages.push(ChatMessage::user(prompt));
            }
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_owned(), content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_owned(), content: content.into() }
    }
}

#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub(crate) struct Choice {
    pub message: ResponseMessage,
}

#[derive(Deserialize)]
pub(crate) struct ResponseMessage {
    pub content: String,
}

/// One chunk of a streamed chat response.
#[derive(Deserialize)]
pub(crate) struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
pub(crate) struct StreamChoice {
    #[serde(default)]
    pub delta: StreamDelta,
}

#[derive(Deserialize, Default)]
pub(crate) struct StreamDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Substitute `{name}` placeholders in a prompt template.
#[must_use]
pub fn render_prompt(template: &str, variables: &[(&str, &str)]) -> String {
    let mut rendered = template.to_owned();
    for (name, value) in variables {
        rendered = rendered.replace(&format!("{{{name}}}"), value);
    }
    rendered
}
