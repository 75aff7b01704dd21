pub mod security;
pub mod storage;
pub mod vision;
