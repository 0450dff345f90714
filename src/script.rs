use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

use crate::app_config::{ScriptConfig, ScriptProvider};
use crate::file_utils::FileManager;
use crate::providers::gemini::Gemini;
use crate::providers::ollama::Ollama;
use crate::providers::{CompletionRequest, Provider};

/// Fenced code block wrapper some models add around JSON
static FENCED_JSON_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap()
});

/// One narration beat and what to show during it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub text: String,
    pub visual_query: String,
}

/// Structured model output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub scenes: Vec<Scene>,
}

impl Script {
    /// JSON schema handed to providers that support constrained output
    pub fn response_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "scenes": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "text": { "type": "string" },
                            "visual_query": { "type": "string" }
                        },
                        "required": ["text", "visual_query"]
                    }
                }
            },
            "required": ["scenes"]
        })
    }

    /// Parse model output, accepting a bare object or one wrapped in a ```json fence
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let body = FENCED_JSON_REGEX.captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or(trimmed);

        let script: Script = serde_json::from_str(body)
            .with_context(|| format!("Failed to parse script response: {}", truncate(body, 200)))?;

        if script.scenes.is_empty() {
            return Err(anyhow!("Script response contained no scenes"));
        }
        Ok(script)
    }

    /// Narration for the voiceover, scene texts joined by spaces
    pub fn narration(scenes: &[Scene]) -> String {
        scenes.iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Generates scenes for a topic through an LLM provider
#[derive(Debug, Clone)]
pub struct ScriptGenerator {
    provider: Arc<dyn Provider>,
    system_prompt: String,
    temperature: f32,
}

impl ScriptGenerator {
    pub fn new(provider: Arc<dyn Provider>, system_prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
            temperature,
        }
    }

    /// Build the configured provider
    pub fn from_config(config: &ScriptConfig) -> Self {
        let provider: Arc<dyn Provider> = match config.provider {
            ScriptProvider::Gemini => Arc::new(Gemini::new(
                config.get_api_key(),
                config.get_endpoint(),
                config.get_model(),
                config.get_timeout_secs(),
            )),
            ScriptProvider::Ollama => Arc::new(Ollama::new(
                config.get_endpoint(),
                config.get_model(),
                config.get_timeout_secs(),
            )),
        };
        Self::new(provider, config.system_prompt.clone(), config.temperature)
    }

    /// Prompt sent for a topic
    pub fn build_prompt(topic: &str, target_duration_seconds: u32) -> String {
        format!(
            "Topic: {}\nTarget narration length: about {} seconds.",
            topic.trim(),
            target_duration_seconds
        )
    }

    /// Generate the ordered scene list for a topic
    pub async fn generate(&self, topic: &str, target_duration_seconds: u32) -> Result<Vec<Scene>> {
        info!("Generating script for topic '{}' with {}", topic, self.provider.name());

        let request = CompletionRequest::new(Self::build_prompt(topic, target_duration_seconds))
            .system(self.system_prompt.clone())
            .temperature(self.temperature)
            .json_schema(Script::response_schema());

        let response = self.provider.complete(request).await
            .map_err(|e| anyhow!("Script generation failed: {}", e))?;

        debug!(
            "Script tokens: prompt={:?} completion={:?}",
            response.prompt_tokens, response.completion_tokens
        );

        let script = Script::parse(&response.text)?;
        info!("Generated a script with {} scenes", script.scenes.len());
        Ok(script.scenes)
    }
}

/// Write scenes as pretty JSON
pub fn save_script<P: AsRef<Path>>(path: P, scenes: &[Scene]) -> Result<()> {
    let json = serde_json::to_string_pretty(scenes)
        .context("Failed to serialize script")?;
    FileManager::write_to_file(path, &json)
}

/// Read scenes back, including any manual edits
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Vec<Scene>> {
    let content = FileManager::read_to_string(&path)?;
    let scenes: Vec<Scene> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse script file: {:?}", path.as_ref()))?;
    if scenes.is_empty() {
        return Err(anyhow!("Script file {:?} has no scenes", path.as_ref()));
    }
    Ok(scenes)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(max_chars).collect();
        truncated.push('…');
        truncated
    }
}
