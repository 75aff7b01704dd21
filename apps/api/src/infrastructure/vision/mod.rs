pub mod openai_vision_service;
pub mod traits;
