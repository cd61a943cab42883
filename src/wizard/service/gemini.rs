// Gemini backend - ImageService over the generateContent REST endpoint

use super::{ImageService, ServiceError};
use crate::wizard::config::StudioConfig;
use crate::wizard::data_url;
use crate::wizard::types::{GeneratedImage, MAX_VARIATIONS, StylePreset, UploadedImage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Talks to Gemini: a text model writes prompts, an image model edits the photo
pub struct GeminiService {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    prompt_model: String,
    image_model: String,
}

impl GeminiService {
    pub fn new(config: &StudioConfig) -> Result<Self, ServiceError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ServiceError::Config(
                    "No API key configured (set GEMINI_API_KEY or api_key in .studio.json)".to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            api_key,
            prompt_model: config.prompt_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, model)
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ServiceError> {
        debug!(model, "sending generateContent request");

        let response = self
            .client
            .post(self.model_url(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|err| err.error.message)
                .unwrap_or(body);
            warn!(model, status = status.as_u16(), %message, "generateContent failed");
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ServiceError::Parse(e.to_string()))
    }
}

/// Instruction asking the text model for a JSON array of edit prompts
fn prompt_request(preset: StylePreset) -> String {
    let brief = match preset {
        StylePreset::Professional => {
            "professional headshots: business attire, clean corporate or studio backgrounds, \
             flattering soft lighting, confident and approachable expressions"
        }
        StylePreset::Creative => {
            "creative, fun portraits: varied poses, new facial expressions and playful settings, \
             while keeping the person's original clothing"
        }
    };

    format!(
        r#"You write instructions for an image editing model that transforms a portrait photo.
Write {} distinct instructions for {}.
Each instruction must keep the person's identity and facial features unchanged.
Respond ONLY with a JSON array of strings, no other text."#,
        MAX_VARIATIONS, brief
    )
}

/// Parse the prompt list out of the model's text answer
fn parse_prompts(text: &str) -> Result<Vec<String>, ServiceError> {
    let trimmed = text.trim();
    // Models sometimes wrap JSON in a markdown fence
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let prompts = match serde_json::from_str::<Vec<String>>(json) {
        Ok(prompts) => prompts,
        Err(_) => serde_json::from_str::<PromptList>(json)
            .map(|list| list.prompts)
            .map_err(|e| ServiceError::Parse(format!("Failed to parse prompt list: {}", e)))?,
    };

    Ok(prompts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect())
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.parts().filter_map(|part| part.text.as_deref()).collect()
    }

    fn first_image(&self) -> Option<&InlineData> {
        self.parts()
            .filter_map(|part| part.inline_data.as_ref())
            .find(|data| !data.data.is_empty())
    }

    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
    }
}

#[async_trait]
impl ImageService for GeminiService {
    async fn generate_prompts(&self, preset: StylePreset) -> Result<Vec<String>, ServiceError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt_request(preset))],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_modalities: None,
            }),
        };

        let response = self.generate_content(&self.prompt_model, &request).await?;
        let prompts = parse_prompts(&response.text())?;

        info!(preset = preset.as_str(), count = prompts.len(), "style prompts received");
        Ok(prompts)
    }

    async fn edit_image(
        &self,
        image: &UploadedImage,
        instruction: &str,
    ) -> Result<Option<GeneratedImage>, ServiceError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::inline(&image.mime_type, image.base64_payload()),
                    Part::text(instruction),
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
            }),
        };

        let response = self.generate_content(&self.image_model, &request).await?;

        match response.first_image() {
            Some(inline) => Ok(Some(GeneratedImage::new(
                data_url::from_base64(&inline.mime_type, &inline.data),
                instruction,
            ))),
            None => {
                // No image part: usually a safety block, the text part says why
                warn!(reason = %response.text(), "edit returned no image");
                Ok(None)
            }
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    fn inline(mime_type: &str, data: &str) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            }),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct PromptList {
    prompts: Vec<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetails,
}

#[derive(Deserialize)]
struct ApiErrorDetails {
    message: String,
}
