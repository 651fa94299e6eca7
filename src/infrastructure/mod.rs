//! Infrastructure layer - use-cases, storage adapters and process plumbing

pub mod logging;
pub mod storage;
pub mod user;
