//! In-memory store used by tests and local experiments.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MealStore, StoreError, StoreResult, UserStore};
use crate::meals::repo_types::{Meal, MealFields};
use crate::users::repo_types::{NewUser, User};

#[derive(Debug, Default)]
struct MealTable {
    rows: HashMap<Uuid, Meal>,
    last_created: Option<OffsetDateTime>,
}

impl MealTable {
    /// Strictly increasing insertion instant, even if the wall clock steps back.
    fn next_created_at(&mut self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        let next = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(next);
        next
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    meals: Arc<RwLock<MealTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::already_exists("User", user.email));
        }
        if users
            .values()
            .any(|u| u.session_id.as_deref() == Some(user.session_id.as_str()))
        {
            return Err(StoreError::already_exists("Session", user.session_id));
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            session_id: Some(user.session_id),
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_session(&self, session_id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.session_id.as_deref() == Some(session_id))
            .cloned())
    }
}

#[async_trait]
impl MealStore for MemoryStore {
    async fn list_meals(&self, owner: Uuid) -> StoreResult<Vec<Meal>> {
        let meals = self.meals.read().await;
        let mut result: Vec<Meal> = meals
            .rows
            .values()
            .filter(|m| m.user_id == owner)
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.meal_datetime
                .cmp(&a.meal_datetime)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(result)
    }

    async fn get_meal(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Meal>> {
        let meals = self.meals.read().await;
        Ok(meals.rows.get(&id).filter(|m| m.user_id == owner).cloned())
    }

    async fn create_meal(&self, owner: Uuid, fields: MealFields) -> StoreResult<Meal> {
        let mut meals = self.meals.write().await;
        let meal = Meal {
            id: Uuid::new_v4(),
            user_id: owner,
            name: fields.name,
            description: fields.description,
            meal_datetime: fields.meal_datetime,
            in_diet: fields.in_diet,
            created_at: meals.next_created_at(),
        };
        meals.rows.insert(meal.id, meal.clone());
        Ok(meal)
    }

    async fn meal_exists(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.meals.read().await.rows.contains_key(&id))
    }

    async fn update_meal(&self, owner: Uuid, id: Uuid, fields: MealFields) -> StoreResult<u64> {
        let mut meals = self.meals.write().await;
        match meals.rows.get_mut(&id).filter(|m| m.user_id == owner) {
            Some(meal) => {
                meal.name = fields.name;
                meal.description = fields.description;
                meal.meal_datetime = fields.meal_datetime;
                meal.in_diet = fields.in_diet;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_meal(&self, owner: Uuid, id: Uuid) -> StoreResult<u64> {
        let mut meals = self.meals.write().await;
        if meals.rows.get(&id).is_some_and(|m| m.user_id == owner) {
            meals.rows.remove(&id);
            Ok(1)
        } else {
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn fields(name: &str, at: OffsetDateTime, in_diet: bool) -> MealFields {
        MealFields {
            name: name.into(),
            description: "test".into(),
            meal_datetime: at,
            in_diet,
        }
    }

    fn new_user(email: &str, session: &str) -> NewUser {
        NewUser {
            name: "Jane".into(),
            email: email.into(),
            session_id: session.into(),
        }
    }

    #[tokio::test]
    async fn test_user_lookup_by_session_and_email() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("jane@example.com", "tok-1")).await.unwrap();

        let by_session = store.find_user_by_session("tok-1").await.unwrap().unwrap();
        assert_eq!(by_session.id, user.id);
        let by_email = store.find_user_by_email("jane@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(store.find_user_by_session("tok-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.create_user(new_user("jane@example.com", "a")).await.unwrap();
        let err = store
            .create_user(new_user("jane@example.com", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { entity: "User", .. }));
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store
            .create_meal(alice, fields("breakfast", datetime!(2024-05-01 08:00 UTC), true))
            .await
            .unwrap();
        store
            .create_meal(alice, fields("dinner", datetime!(2024-05-01 20:00 UTC), false))
            .await
            .unwrap();
        store
            .create_meal(bob, fields("lunch", datetime!(2024-05-01 12:00 UTC), true))
            .await
            .unwrap();

        let meals = store.list_meals(alice).await.unwrap();
        let names: Vec<&str> = meals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["dinner", "breakfast"]);
        assert!(store.list_meals(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_equal_timestamps_list_newest_insert_first() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let at = datetime!(2024-05-01 21:05:55.809 UTC);

        for name in ["first", "second", "third"] {
            store.create_meal(owner, fields(name, at, true)).await.unwrap();
        }

        let meals = store.list_meals(owner).await.unwrap();
        let names: Vec<&str> = meals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);

        let again = store.list_meals(owner).await.unwrap();
        assert_eq!(meals, again);
    }

    #[test]
    fn test_created_at_strictly_increases_when_clock_lags() {
        let mut table = MealTable {
            last_created: Some(OffsetDateTime::now_utc() + Duration::hours(1)),
            ..MealTable::default()
        };
        let ahead = table.last_created.unwrap();

        let first = table.next_created_at();
        let second = table.next_created_at();
        assert!(first > ahead);
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_mutations_only_touch_owned_rows() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let meal = store
            .create_meal(alice, fields("salad", datetime!(2024-05-01 12:00 UTC), true))
            .await
            .unwrap();

        assert!(store.meal_exists(meal.id).await.unwrap());
        assert!(store.get_meal(bob, meal.id).await.unwrap().is_none());

        let changed = store
            .update_meal(bob, meal.id, fields("pizza", meal.meal_datetime, false))
            .await
            .unwrap();
        assert_eq!(changed, 0);
        assert_eq!(store.delete_meal(bob, meal.id).await.unwrap(), 0);

        let unchanged = store.get_meal(alice, meal.id).await.unwrap().unwrap();
        assert_eq!(unchanged.name, "salad");

        assert_eq!(store.delete_meal(alice, meal.id).await.unwrap(), 1);
        assert!(!store.meal_exists(meal.id).await.unwrap());
    }
}
