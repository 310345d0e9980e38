use jiff::tz::TimeZone;
use jiff::Timestamp;
use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::{Resource, ResourceClient};
use crate::allocator::{id_pool, Allocator, IdRange, IdStrategy};
use crate::clients::UserClient;
use crate::composer::{order_number, OrderDraft};
use crate::domain::{Order, OrderCreate, OrderFilter, OrderStatus};
use crate::error::{OrderError, UserError};

/// Client for the orders collection.
///
/// Creating an order checks the selected user through [`UserClient`] before
/// anything is written.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    user_client: UserClient,
    ids: IdStrategy,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, user_client: UserClient, ids: IdStrategy) -> Self {
        Self {
            inner,
            user_client,
            ids,
        }
    }

    /// Orders whose creation day, in `tz`, falls inside `filter`.
    #[instrument(skip(self, tz))]
    pub async fn list_orders_filtered(
        &self,
        filter: OrderFilter,
        tz: &TimeZone,
    ) -> Result<Vec<Order>, OrderError> {
        let orders = self.inner.list().await?;
        let total = orders.len();
        let kept = filter.apply(orders, tz);
        debug!(total, kept = kept.len(), "Filtered orders");
        Ok(kept)
    }

    #[instrument(skip(self, draft))]
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<Order, OrderError> {
        info!("Processing create_order request");

        // Step 1: required fields
        let submission = draft.submission()?;

        // Step 2: the user must exist
        match self.user_client.get_user(submission.user_id.clone()).await {
            Ok(Some(user)) => info!(user_name = %user.full_name(), "User validation successful"),
            Ok(None) => {
                error!(user_id = %submission.user_id, "User not found");
                return Err(OrderError::InvalidUser(submission.user_id));
            }
            Err(UserError::Gateway(e)) => {
                error!(error = %e, "User lookup failed");
                return Err(OrderError::Gateway(e));
            }
            Err(e) => {
                error!(error = %e, "User validation failed");
                return Err(OrderError::InvalidUser(format!(
                    "User validation failed: {e}"
                )));
            }
        }

        // Step 3: identifiers
        let now = Timestamp::now();
        let year = now.to_zoned(TimeZone::system()).year();
        let (id, serial) = match &self.ids {
            IdStrategy::ClientProposed(allocator) => {
                let existing = self.inner.list().await?;
                let pool = id_pool(existing.iter().map(|order| order.id.as_str()));
                let id = allocator.allocate(&pool, Order::ID_RANGE);
                debug!(id, known = pool.len(), "Proposing order id");
                (Some(id.to_string()), allocator.draw(IdRange::ORDER_SERIAL))
            }
            IdStrategy::ServerAssigned => (None, Allocator::default().draw(IdRange::ORDER_SERIAL)),
        };

        // Step 4: create
        let payload = OrderCreate {
            id,
            user_id: submission.user_id,
            order_number: order_number(year, serial),
            status: submission.status,
            created_at: now,
            items: submission.items,
            total_price: submission.total_price,
        };

        let order = self.inner.create(payload).await?;
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total_price,
            "Order created successfully"
        );
        Ok(order)
    }

    /// Rewrites the items and status of an existing order from an edited draft.
    ///
    /// The id, order number and creation time are kept.
    #[instrument(skip(self, draft))]
    pub async fn update_order(&self, id: String, draft: &OrderDraft) -> Result<Order, OrderError> {
        let submission = draft.submission()?;
        let current = self.require(id.clone()).await?;

        let payload = OrderCreate {
            id: Some(current.id),
            user_id: submission.user_id,
            order_number: current.order_number,
            status: submission.status,
            created_at: current.created_at,
            items: submission.items,
            total_price: submission.total_price,
        };

        let order = self.inner.update(id, payload).await?;
        info!(total = %order.total_price, "Order updated successfully");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn set_status(&self, id: String, status: OrderStatus) -> Result<Order, OrderError> {
        let current = self.require(id.clone()).await?;
        if current.status == status {
            debug!("Status unchanged");
            return Ok(current);
        }

        let payload = OrderCreate {
            id: Some(current.id),
            user_id: current.user_id,
            order_number: current.order_number,
            status,
            created_at: current.created_at,
            items: current.items,
            total_price: current.total_price,
        };

        let order = self.inner.update(id, payload).await?;
        info!(status = %order.status, "Order status changed");
        Ok(order)
    }

    async fn require(&self, id: String) -> Result<Order, OrderError> {
        match self.inner.get(id.clone()).await? {
            Some(order) => Ok(order),
            None => {
                warn!(order_id = %id, "Order not found");
                Err(OrderError::NotFound(id))
            }
        }
    }
}
