use std::sync::{Arc, RwLock};

use crate::database::seed::seed_users;
use crate::dto::user_dto::UpdateUserPayload;
use crate::error::{Error, Result};
use crate::models::user::User;

/// Authoritative in-memory user collection, kept in insertion order.
#[derive(Clone, Debug)]
pub struct UserStore {
    users: Arc<RwLock<Vec<User>>>,
}

impl UserStore {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    pub fn seeded() -> Self {
        Self::new(seed_users())
    }

    pub fn list(&self) -> Vec<User> {
        self.users
            .read()
            .expect("user store lock poisoned")
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<User> {
        self.users
            .read()
            .expect("user store lock poisoned")
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    /// Merges `payload` into the record with `id`. The id itself is never
    /// touched, so uniqueness holds across updates.
    pub fn update(&self, id: &str, payload: &UpdateUserPayload) -> Result<User> {
        let mut guard = self.users.write().expect("user store lock poisoned");
        let user = guard
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::user_not_found(id))?;
        payload.apply_to(user);
        Ok(user.clone())
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{UserRole, UserStatus};

    #[test]
    fn seed_has_expected_role_mix() {
        let store = UserStore::seeded();
        let users = store.list();
        assert_eq!(users.len(), 20);
        let count = |role: UserRole| users.iter().filter(|u| u.role == role).count();
        assert_eq!(count(UserRole::Admin), 4);
        assert_eq!(count(UserRole::Editor), 8);
        assert_eq!(count(UserRole::Viewer), 8);

        let mut ids: Vec<_> = users.iter().map(|u| u.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn update_merges_only_given_fields() {
        let store = UserStore::seeded();
        let before = store.get("3").unwrap();

        let updated = store
            .update(
                "3",
                &UpdateUserPayload {
                    status: Some(UserStatus::Active),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.status, UserStatus::Active);
        assert_eq!(updated.name, before.name);
        assert_eq!(updated.email, before.email);
        assert_eq!(updated.joined_at, before.joined_at);
        assert_eq!(store.get("3").unwrap(), updated);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let store = UserStore::seeded();
        let before = store.list();
        let err = store
            .update(
                "999",
                &UpdateUserPayload {
                    name: Some("Ghost".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.list(), before);
    }
}
