//! Storage behind a resource actor.

mod memory;
mod rest;

use async_trait::async_trait;

pub use memory::MemoryBackend;
pub use rest::RestBackend;

use crate::actor_framework::Resource;
use crate::error::GatewayError;

/// One collection of records on the other side of the gateway.
#[async_trait]
pub trait Backend<T: Resource>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>, GatewayError>;

    /// `Ok(None)` when no record has this id.
    async fn get(&self, id: &str) -> Result<Option<T>, GatewayError>;

    async fn create(&mut self, payload: &T::Payload) -> Result<T, GatewayError>;

    /// Replaces the whole record.
    async fn update(&mut self, id: &str, payload: &T::Payload) -> Result<T, GatewayError>;

    async fn delete(&mut self, id: &str) -> Result<(), GatewayError>;
}
