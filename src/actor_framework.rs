use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument};

use crate::allocator::IdRange;
use crate::backend::Backend;
use crate::error::GatewayError;

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// A record kind stored in one backend collection.
pub trait Resource: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Body sent on create and replace.
    type Payload: Clone + Debug + Serialize + Send + Sync + 'static;

    /// Path segment under the API base url.
    const COLLECTION: &'static str;
    /// Range client-proposed ids are drawn from.
    const ID_RANGE: IdRange;

    fn id(&self) -> &str;

    fn proposed_id(payload: &Self::Payload) -> Option<&str>;

    fn with_proposed_id(payload: Self::Payload, id: String) -> Self::Payload;

    /// Stored form of `payload` under `id`.
    fn from_payload(id: String, payload: Self::Payload) -> Self;
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, GatewayError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Resource> {
    List {
        respond_to: Response<Vec<T>>,
    },
    Get {
        id: String,
        respond_to: Response<Option<T>>,
    },
    Create {
        payload: T::Payload,
        respond_to: Response<T>,
    },
    Update {
        id: String,
        payload: T::Payload,
        respond_to: Response<T>,
    },
    Delete {
        id: String,
        respond_to: Response<()>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR
// =============================================================================

/// Serves one collection, one request at a time.
pub struct ResourceActor<T: Resource> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    backend: Box<dyn Backend<T>>,
}

impl<T: Resource> ResourceActor<T> {
    pub fn new(buffer_size: usize, backend: Box<dyn Backend<T>>) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self { receiver, backend };
        (actor, ResourceClient::new(sender))
    }

    #[instrument(name = "resource_actor", skip(self), fields(collection = T::COLLECTION))]
    pub async fn run(mut self) {
        info!("Resource actor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::List { respond_to } => {
                    let result = self.backend.list().await;
                    match &result {
                        Ok(items) => debug!(count = items.len(), "Listed records"),
                        Err(e) => error!(error = %e, "List failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let result = self.backend.get(&id).await;
                    match &result {
                        Ok(Some(_)) => debug!(id = %id, "Record found"),
                        Ok(None) => debug!(id = %id, "Record not found"),
                        Err(e) => error!(id = %id, error = %e, "Get failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Create { payload, respond_to } => {
                    let result = self.backend.create(&payload).await;
                    match &result {
                        Ok(item) => info!(id = %item.id(), "Record created"),
                        Err(e) => error!(error = %e, "Create failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Update { id, payload, respond_to } => {
                    let result = self.backend.update(&id, &payload).await;
                    match &result {
                        Ok(_) => info!(id = %id, "Record updated"),
                        Err(e) => error!(id = %id, error = %e, "Update failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let result = self.backend.delete(&id).await;
                    match &result {
                        Ok(()) => info!(id = %id, "Record deleted"),
                        Err(e) => error!(id = %id, error = %e, "Delete failed"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!("Resource actor stopped");
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Resource> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Resource> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Resource> ResourceClient<T> {
    pub(crate) fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R>(
        &self,
        request: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, GatewayError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| GatewayError::Closed(T::COLLECTION))?;
        response
            .await
            .map_err(|_| GatewayError::Dropped(T::COLLECTION))?
    }

    pub async fn list(&self) -> Result<Vec<T>, GatewayError> {
        self.call(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn get(&self, id: String) -> Result<Option<T>, GatewayError> {
        self.call(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn create(&self, payload: T::Payload) -> Result<T, GatewayError> {
        self.call(|respond_to| ResourceRequest::Create { payload, respond_to })
            .await
    }

    pub async fn update(&self, id: String, payload: T::Payload) -> Result<T, GatewayError> {
        self.call(|respond_to| ResourceRequest::Update {
            id,
            payload,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: String) -> Result<(), GatewayError> {
        self.call(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }
}
