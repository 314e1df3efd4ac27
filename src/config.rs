use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid terminal config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything the page can tune. Every field has a default so a partial
/// (or empty) JSON object is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerminalConfig {
    pub identity: Identity,
    pub prompt: PromptConfig,
    pub banner: BannerConfig,
    pub chat: ChatConfig,
    /// pause between queued writes, milliseconds
    pub write_delay_ms: u64,
    /// replaces the built-in file table when present
    pub files: Option<BTreeMap<String, String>>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            prompt: PromptConfig::default(),
            banner: BannerConfig::default(),
            chat: ChatConfig::default(),
            write_delay_ms: 1,
            files: None,
        }
    }
}

impl TerminalConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_delay(&self) -> Duration {
        Duration::from_millis(self.write_delay_ms)
    }
}

/// who/where the fake machine pretends to be
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Identity {
    pub user: String,
    pub host: String,
    pub home: String,
    pub cwd: String,
    pub shell: String,
    pub term: String,
    pub kernel: String,
    pub machine: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            user: "guest".to_string(),
            host: "portfolio".to_string(),
            home: "/home/guest".to_string(),
            cwd: "/home/guest/portfolio".to_string(),
            shell: "/bin/bash".to_string(),
            term: "xterm-256color".to_string(),
            kernel: "5.15.0".to_string(),
            machine: "x86_64".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptConfig {
    /// shown in front of user@host, e.g. "(base)"
    pub env_label: String,
    pub chat_prompt: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            env_label: "(base)".to_string(),
            chat_prompt: "🤖 > ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BannerConfig {
    pub title: String,
    pub subtitle: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            title: "Welcome to the portfolio shell v0.1.0".to_string(),
            subtitle: "Type \"help\" to look around, \"chat\" to talk".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatConfig {
    pub model: String,
    pub system_prompt: String,
    pub generation: GenerateOptions,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "HuggingFaceTB/SmolLM-135M-Instruct".to_string(),
            system_prompt: "You are a helpful AI assistant. Keep responses concise and natural."
                .to_string(),
            generation: GenerateOptions::default(),
        }
    }
}

impl ChatConfig {
    /// single-turn prompt in the Human/Assistant layout small models expect
    pub fn prompt_for(&self, message: &str) -> String {
        format!("{}\n\nHuman: {}\nAssistant:", self.system_prompt, message)
    }
}

/// sampling knobs handed to the backend as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateOptions {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub repetition_penalty: f32,
    pub do_sample: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_new_tokens: 200,
            temperature: 0.7,
            repetition_penalty: 1.1,
            do_sample: true,
        }
    }
}
