use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::actor_framework::{Resource, ResourceActor};
use crate::backend::{Backend, MemoryBackend, RestBackend};
use crate::clients::{OrderClient, UserClient};
use crate::config::{AdminConfig, BackendKind};
use crate::domain::{Order, User};
use crate::error::GatewayError;

/// Owns the per-collection actors and hands out their clients.
///
/// Users start first because the order client validates against them.
pub struct AdminSystem {
    pub user_client: UserClient,
    pub order_client: OrderClient,
    handles: Vec<JoinHandle<()>>,
}

impl AdminSystem {
    /// Starts one actor per collection.
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be built.
    #[instrument(name = "admin_system", skip(config), fields(backend = ?config.backend))]
    pub fn new(config: &AdminConfig) -> Result<Self, GatewayError> {
        info!("Starting admin system");
        let ids = config.id_strategy();

        let (user_actor, users) =
            ResourceActor::<User>::new(config.channel_capacity, backend::<User>(config)?);
        let user_handle = tokio::spawn(user_actor.run());
        let user_client = UserClient::new(users, ids.clone());

        let (order_actor, orders) =
            ResourceActor::<Order>::new(config.channel_capacity, backend::<Order>(config)?);
        let order_handle = tokio::spawn(order_actor.run());
        let order_client = OrderClient::new(orders, user_client.clone(), ids);

        info!("Admin system started successfully");
        Ok(Self {
            user_client,
            order_client,
            handles: vec![user_handle, order_handle],
        })
    }

    /// Closes every channel and waits for the actors to drain.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down admin system");

        drop(self.order_client);
        drop(self.user_client);

        let mut failed = 0;
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(format!("{failed} actor task(s) failed during shutdown"));
        }
        info!("Admin system shutdown complete");
        Ok(())
    }
}

fn backend<T: Resource>(config: &AdminConfig) -> Result<Box<dyn Backend<T>>, GatewayError> {
    Ok(match config.backend {
        BackendKind::Rest => Box::new(RestBackend::<T>::with_timeout(
            &config.api_url,
            config.timeout(),
        )?),
        BackendKind::Memory => Box::new(MemoryBackend::<T>::new()),
    })
}
