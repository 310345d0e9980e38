use async_trait::async_trait;

use super::Backend;
use crate::actor_framework::Resource;
use crate::error::GatewayError;

/// In-process collection for offline runs and tests.
///
/// Records keep insertion order. Payloads without an id get the next free
/// sequential id; a proposed id that is already taken is rejected.
#[derive(Debug)]
pub struct MemoryBackend<T: Resource> {
    records: Vec<T>,
    next_id: u64,
}

impl<T: Resource> Default for MemoryBackend<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> MemoryBackend<T> {
    pub fn new() -> Self {
        Self::seeded(Vec::new())
    }

    pub fn seeded(records: Vec<T>) -> Self {
        Self {
            records,
            next_id: 1,
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    fn assign_id(&mut self) -> String {
        loop {
            let candidate = self.next_id.to_string();
            self.next_id += 1;
            if self.position(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn not_found(id: &str) -> GatewayError {
        GatewayError::NotFound {
            collection: T::COLLECTION,
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl<T: Resource> Backend<T> for MemoryBackend<T> {
    async fn list(&self) -> Result<Vec<T>, GatewayError> {
        Ok(self.records.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<T>, GatewayError> {
        Ok(self.records.iter().find(|record| record.id() == id).cloned())
    }

    async fn create(&mut self, payload: &T::Payload) -> Result<T, GatewayError> {
        let id = match T::proposed_id(payload) {
            Some(id) if self.position(id).is_some() => {
                return Err(GatewayError::Conflict {
                    collection: T::COLLECTION,
                    id: id.to_string(),
                });
            }
            Some(id) => id.to_string(),
            None => self.assign_id(),
        };

        let record = T::from_payload(id, payload.clone());
        self.records.push(record.clone());
        Ok(record)
    }

    async fn update(&mut self, id: &str, payload: &T::Payload) -> Result<T, GatewayError> {
        let index = self.position(id).ok_or_else(|| Self::not_found(id))?;
        let record = T::from_payload(id.to_string(), payload.clone());
        self.records[index] = record.clone();
        Ok(record)
    }

    async fn delete(&mut self, id: &str) -> Result<(), GatewayError> {
        let index = self.position(id).ok_or_else(|| Self::not_found(id))?;
        self.records.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{User, UserDraft};

    fn draft(id: Option<&str>) -> UserDraft {
        UserDraft {
            id: id.map(str::to_string),
            username: "someone".into(),
            ..UserDraft::default()
        }
    }

    #[tokio::test]
    async fn duplicate_proposed_id_conflicts() {
        let mut backend = MemoryBackend::<User>::new();
        backend.create(&draft(Some("150"))).await.unwrap();

        let err = backend.create(&draft(Some("150"))).await.unwrap_err();
        assert!(matches!(err, GatewayError::Conflict { collection: "users", ref id } if id == "150"));
    }

    #[tokio::test]
    async fn assigned_ids_skip_taken_ones() {
        let seed = User::from_payload("1".into(), draft(None));
        let mut backend = MemoryBackend::seeded(vec![seed]);

        let created = backend.create(&draft(None)).await.unwrap();
        assert_eq!(created.id, "2");
    }

    #[tokio::test]
    async fn update_replaces_the_record_in_place() {
        let mut backend = MemoryBackend::<User>::new();
        backend.create(&draft(Some("7"))).await.unwrap();
        backend.create(&draft(Some("8"))).await.unwrap();

        let replacement = UserDraft {
            username: "renamed".into(),
            ..draft(Some("7"))
        };
        backend.update("7", &replacement).await.unwrap();

        let ids: Vec<String> = backend.list().await.unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["7", "8"]);
        assert_eq!(backend.get("7").await.unwrap().unwrap().username, "renamed");
        assert!(backend.update("99", &replacement).await.is_err());
    }
}
