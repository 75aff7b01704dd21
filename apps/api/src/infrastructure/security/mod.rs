pub mod upload_validation;

pub use upload_validation::{UploadValidator, ValidationConfig};
