use super::traits::{VisionError, VisionService};
use crate::{config::Config, domain::analysis::entity::AnalysisResult};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str = "You are a strict vision classifier. \
    From a SIDE-ON photo of a handstand, output exactly one label: \"good form\" or \"banana back\". \
    banana back = a clear lumbar arch, ribs flaring forward, hips in front of the shoulders and \
    legs drifting behind the body so the line forms a C or banana shape. \
    good form = wrists, shoulders, hips and ankles stacked vertically, neutral spine, ribs tucked, \
    no visible curve through the midsection. \
    Output ONLY one of these strings, with no punctuation or explanation.";

const FEW_SHOT: [(&str, &str); 2] = [
    (
        "Side-on handstand description: hips are ahead of the shoulder line, lower back is \
         arched, chest and ribs flaring, legs trailing behind.",
        "banana back",
    ),
    (
        "Side-on handstand description: wrists, shoulders, hips and ankles form one vertical \
         line; spine looks neutral; ribs tucked; toes stacked over hips.",
        "good form",
    ),
];

const CLASSIFY_INSTRUCTION: &str =
    "Classify this SIDE-ON handstand image as exactly one label: \"good form\" or \"banana back\".";

const MAX_REPLY_TOKENS: u32 = 5;

/// Posture classifier backed by an OpenAI-compatible chat completions API.
pub struct OpenAiVisionService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    models: Vec<String>,
    verify_key: bool,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl ChatMessage {
    fn text(role: &'static str, text: &str) -> Self {
        Self {
            role,
            content: MessageContent::Text(text.to_string()),
        }
    }
}

impl OpenAiVisionService {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        models: Vec<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            models,
            verify_key: true,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.vision_models.clone(),
            Duration::from_secs(config.vision_timeout_seconds),
        )?
        .verify_key(config.openai_verify_key))
    }

    /// Toggle the `/models` key check performed before each analysis.
    pub fn verify_key(mut self, enabled: bool) -> Self {
        self.verify_key = enabled;
        self
    }

    async fn check_api_key(&self, api_key: &str) -> Result<(), VisionError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Vision API key rejected");
            return Err(VisionError::KeyRejected(status.as_u16()));
        }
        Ok(())
    }

    fn build_request<'a>(model: &'a str, encoded_image: &str, content_type: &str) -> ChatRequest<'a> {
        let mut messages = vec![ChatMessage::text("system", SYSTEM_PROMPT)];
        for (description, label) in FEW_SHOT {
            messages.push(ChatMessage::text("user", description));
            messages.push(ChatMessage::text("assistant", label));
        }
        messages.push(ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: CLASSIFY_INSTRUCTION.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:{};base64,{}", content_type, encoded_image),
                    },
                },
            ]),
        });

        ChatRequest {
            model,
            temperature: 0.0,
            max_tokens: MAX_REPLY_TOKENS,
            messages,
        }
    }
}

#[async_trait]
impl VisionService for OpenAiVisionService {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn analyze_posture(
        &self,
        image: &[u8],
        content_type: &str,
    ) -> Result<AnalysisResult, VisionError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| VisionError::NotConfigured("OPENAI_API_KEY is not set".into()))?;

        if self.verify_key {
            self.check_api_key(api_key).await?;
        }

        let encoded = STANDARD.encode(image);
        let mut failures = Vec::new();

        for model in &self.models {
            let body = Self::build_request(model, &encoded, content_type);
            debug!(model = %model, image_bytes = image.len(), "Sending posture classification request");

            // Transport errors abort; only a non-success status moves on to the next model.
            let response = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                warn!(model = %model, %status, "Vision model failed, trying next");
                debug!(model = %model, body = %detail, "Vision error body");
                failures.push(format!("{} ({})", model, status.as_u16()));
                continue;
            }

            // The client timeout can still fire while the body is streaming in.
            let parsed: ChatResponse = response.json().await.map_err(VisionError::from)?;
            let reply = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| {
                    VisionError::MalformedResponse("response contained no message content".into())
                })?;

            let result = AnalysisResult::from_model_reply(&reply).with_model(model.clone());
            info!(model = %model, label = %result.label, "Posture classified");
            return Ok(result);
        }

        Err(VisionError::AllModelsFailed(failures))
    }
}
