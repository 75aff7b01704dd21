use super::coaching::advice_for;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const GOOD_FORM_LABEL: &str = "good form";
const BANANA_BACK_LABEL: &str = "banana back";

/// Posture verdict for a single handstand photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormQuality {
    Good,
    BananaBack,
    Unclear,
}

impl FormQuality {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => GOOD_FORM_LABEL,
            Self::BananaBack => BANANA_BACK_LABEL,
            Self::Unclear => "unclear",
        }
    }

    /// Short class name used by the result page styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::BananaBack => "bad",
            Self::Unclear => "unclear",
        }
    }
}

/// Coaching feedback produced from one uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub form_quality: FormQuality,
    pub label: String,
    pub advice: String,
    pub model: Option<String>,
    pub analyzed_at: DateTime<Utc>,
}

/// Structured reply some providers return instead of a bare label.
#[derive(Debug, Deserialize)]
struct StructuredVerdict {
    banana_back: bool,
    #[serde(default)]
    advice: String,
}

impl AnalysisResult {
    /// Build a result for a known verdict. Blank advice falls back to the
    /// coaching catalogue so the advice is never empty.
    pub fn new(form_quality: FormQuality, advice: impl Into<String>) -> Self {
        let advice = advice.into();
        let advice = if advice.trim().is_empty() {
            advice_for(form_quality).to_string()
        } else {
            advice.trim().to_string()
        };

        Self {
            form_quality,
            label: form_quality.label().to_string(),
            advice,
            model: None,
            analyzed_at: Utc::now(),
        }
    }

    /// Interpret a free-text classifier label.
    ///
    /// Anything mentioning "banana" is a banana back, anything mentioning
    /// "good" is good form; other replies are kept (first line only) and
    /// marked unclear.
    pub fn from_label(raw: &str) -> Self {
        let text = raw.trim().to_lowercase();
        let form_quality = if text.contains("banana") {
            FormQuality::BananaBack
        } else if text.contains("good") {
            FormQuality::Good
        } else {
            FormQuality::Unclear
        };

        let mut result = Self::new(form_quality, "");
        if form_quality == FormQuality::Unclear {
            let first_line = text.lines().next().unwrap_or("").trim();
            if !first_line.is_empty() {
                result.label = first_line.to_string();
            }
        }
        result
    }

    /// Interpret whatever the vision model replied with: a JSON verdict
    /// object when it parses, otherwise a label.
    pub fn from_model_reply(reply: &str) -> Self {
        match serde_json::from_str::<StructuredVerdict>(reply.trim()) {
            Ok(verdict) => {
                let quality = if verdict.banana_back {
                    FormQuality::BananaBack
                } else {
                    FormQuality::Good
                };
                Self::new(quality, verdict.advice)
            }
            Err(_) => Self::from_label(reply),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn banana_back(&self) -> bool {
        self.form_quality == FormQuality::BananaBack
    }
}
