// Hosts Store Port
// Read/write access to the hub's hosts file

use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait HostsStore: Send + Sync {
    /// Current hosts file content
    async fn read(&self) -> Result<String, AppError>;

    /// Replace the hosts file content
    async fn write(&self, content: &str) -> Result<(), AppError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// In-memory hosts file
    #[derive(Default)]
    pub struct InMemoryHostsStore {
        content: Mutex<String>,
        writes: Mutex<usize>,
    }
    impl InMemoryHostsStore {
        pub fn new(content: impl Into<String>) -> Self {
            Self {
                content: Mutex::new(content.into()),
                writes: Mutex::new(0),
            }
        }
        pub fn content(&self) -> String {
            self.content.lock().unwrap().clone()
        }
        pub fn writes(&self) -> usize {
            *self.writes.lock().unwrap()
        }
    }
    #[async_trait]
    impl HostsStore for InMemoryHostsStore {
        async fn read(&self) -> Result<String, AppError> {
            Ok(self.content())
        }
        async fn write(&self, content: &str) -> Result<(), AppError> {
            *self.content.lock().unwrap() = content.to_string();
            *self.writes.lock().unwrap() += 1;
            Ok(())
        }
    }
}
