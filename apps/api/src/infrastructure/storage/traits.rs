use async_trait::async_trait;

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Store `data` under `key` and return the public URL. Existing keys are never overwritten.
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> anyhow::Result<String>;
    async fn read(&self, key: &str) -> anyhow::Result<Vec<u8>>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
    fn get_url(&self, key: &str) -> String;
}
