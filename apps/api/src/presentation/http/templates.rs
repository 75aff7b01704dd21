use crate::application::analyze_handstand::dto::AnalyzeHandstandResponse;
use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "result.html")]
pub struct ResultPage {
    pub image_url: Option<String>,
    pub label: String,
    pub quality_class: &'static str,
    pub banana_back: bool,
    pub advice: String,
    pub model: Option<String>,
    pub width: u32,
    pub height: u32,
    pub analyzed_at: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub status: u16,
    pub title: String,
    pub message: String,
}

impl From<&AnalyzeHandstandResponse> for ResultPage {
    fn from(response: &AnalyzeHandstandResponse) -> Self {
        let result = &response.result;
        Self {
            image_url: response
                .image_retained
                .then(|| response.stored.url.clone()),
            label: result.label.clone(),
            quality_class: result.form_quality.css_class(),
            banana_back: result.banana_back(),
            advice: result.advice.clone(),
            model: result.model.clone(),
            width: response.stored.width,
            height: response.stored.height,
            analyzed_at: result.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}
