use serde::{Deserialize, Serialize};

// Body of POST /generate
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub conversation_history: Option<Vec<String>>,
    pub secret: String,
}

// Response of POST /generate
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct GenerateResponse {
    pub generated_text: String,
}

// Response of GET /
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct StatusResponse {
    pub message: String,
    pub timestamp: String,
}

// Chat completions API request format
#[derive(Serialize, Debug)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

// Chat completions API response format, only the fields we read
#[derive(Deserialize, Debug)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}
