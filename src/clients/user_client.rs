use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{Resource, ResourceClient};
use crate::allocator::{id_pool, IdStrategy};
use crate::domain::{User, UserDraft, UserPatch};
use crate::error::UserError;

/// Client for the users collection.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
    ids: IdStrategy,
}

impl_client_methods!(UserClient, User, UserError, user);

impl UserClient {
    pub fn new(inner: ResourceClient<User>, ids: IdStrategy) -> Self {
        Self { inner, ids }
    }

    /// Validates the draft, picks an id and creates the user.
    ///
    /// With client-proposed ids the current user list is fetched once, right
    /// before creating.
    #[instrument(skip(self, draft), fields(username = %draft.username))]
    pub async fn create_user(&self, draft: UserDraft) -> Result<User, UserError> {
        draft.validate()?;

        let payload = match &self.ids {
            IdStrategy::ClientProposed(allocator) => {
                let existing = self.inner.list().await?;
                let pool = id_pool(existing.iter().map(|user| user.id.as_str()));
                let id = allocator.allocate(&pool, User::ID_RANGE);
                debug!(id, known = pool.len(), "Proposing user id");
                User::with_proposed_id(draft, id.to_string())
            }
            IdStrategy::ServerAssigned => UserDraft { id: None, ..draft },
        };

        let user = self.inner.create(payload).await?;
        info!(user_id = %user.id, "User created successfully");
        Ok(user)
    }

    /// Applies `patch` to the stored user and writes the full record back.
    #[instrument(skip(self, patch))]
    pub async fn update_user(&self, id: String, patch: UserPatch) -> Result<User, UserError> {
        let Some(current) = self.inner.get(id.clone()).await? else {
            warn!("User not found for update");
            return Err(UserError::NotFound(id));
        };

        let draft = current.patched(patch);
        draft.validate()?;

        let user = self.inner.update(id, draft).await?;
        info!("User updated successfully");
        Ok(user)
    }
}
