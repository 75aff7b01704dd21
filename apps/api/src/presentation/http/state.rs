use crate::{
    config::Config,
    infrastructure::{
        security::UploadValidator, storage::traits::StorageService, vision::traits::VisionService,
    },
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn StorageService>,
    pub vision: Arc<dyn VisionService>,
    pub validator: Arc<UploadValidator>,
}
