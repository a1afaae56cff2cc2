//! # Logo Module
//!
//! Brand logos are produced by an external AI image-generation subsystem.
//! The core only stores the outcome per attempt and consumes windowed
//! statistics; generation itself is out of scope.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AI model that produced a logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AiModel {
    Gpt4,
    DallE3,
    DallE2,
    Midjourney,
    StableDiffusion,
    LeonardoAi,
}

impl AiModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiModel::Gpt4 => "GPT-4",
            AiModel::DallE3 => "DALL-E-3",
            AiModel::DallE2 => "DALL-E-2",
            AiModel::Midjourney => "MIDJOURNEY",
            AiModel::StableDiffusion => "STABLE_DIFFUSION",
            AiModel::LeonardoAi => "LEONARDO_AI",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GPT-4" => Some(AiModel::Gpt4),
            "DALL-E-3" => Some(AiModel::DallE3),
            "DALL-E-2" => Some(AiModel::DallE2),
            "MIDJOURNEY" => Some(AiModel::Midjourney),
            "STABLE_DIFFUSION" => Some(AiModel::StableDiffusion),
            "LEONARDO_AI" => Some(AiModel::LeonardoAi),
            _ => None,
        }
    }
}

/// One logo-generation attempt for a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoRecord {
    pub id: String,
    pub record_id: String,
    pub url: String,
    pub success: bool,
    pub generation_seconds: i64,
    pub model: AiModel,
    pub generated_at: DateTime<Utc>,
}

impl LogoRecord {
    pub fn validate(&self) -> CoreResult<()> {
        if self.url.is_empty() {
            return Err(CoreError::Validation("logo url is required".to_string()));
        }
        if self.generation_seconds < 0 {
            return Err(CoreError::Validation(format!(
                "negative generation time: {}",
                self.generation_seconds
            )));
        }
        Ok(())
    }
}

/// Windowed logo-generation statistics from the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LogoStats {
    pub total: u64,
    pub successful: u64,
    pub average_generation_seconds: f64,
}

impl LogoStats {
    /// Success percentage over the window; 0 when no logos were generated.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }
}
