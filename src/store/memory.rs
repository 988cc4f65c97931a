//! In-memory store doubles for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::property::{House, Neighborhood, PaymentType, Square};
use crate::domain::user::{Role, User};

use super::{CredentialStore, HouseUpdate, NewHouse, PropertyCatalog, StoreError};

#[derive(Default)]
pub struct MemoryCatalog {
    neighborhoods: Mutex<Vec<Neighborhood>>,
    squares: Mutex<Vec<Square>>,
    houses: Mutex<HashMap<Uuid, House>>,
    fail_updates_for: Mutex<HashSet<Uuid>>,
    fail_listing: AtomicBool,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_house(&self, house: House) {
        self.houses.lock().unwrap().insert(house.id, house);
    }

    pub fn house(&self, id: Uuid) -> Option<House> {
        self.houses.lock().unwrap().get(&id).cloned()
    }

    /// Make every `update_house` for `id` fail with a storage error.
    pub fn fail_updates_for(&self, id: Uuid) {
        self.fail_updates_for.lock().unwrap().insert(id);
    }

    /// Make `list_occupied_houses` fail, simulating an unreachable store.
    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    pub fn sample_house(square_id: Uuid, number: &str, occupied: bool, tier: PaymentType) -> House {
        House {
            id: Uuid::new_v4(),
            house_number: number.to_string(),
            owner_name: "Owner".to_string(),
            owner_phone: None,
            is_occupied: occupied,
            has_paid: true,
            payment_type: tier,
            required_amount: 0,
            last_payment_date: Some(OffsetDateTime::now_utc()),
            receipt_image: None,
            square_id,
        }
    }
}

#[async_trait]
impl PropertyCatalog for MemoryCatalog {
    async fn list_neighborhoods(&self) -> Result<Vec<Neighborhood>, StoreError> {
        let mut all = self.neighborhoods.lock().unwrap().clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn create_neighborhood(&self, name: &str) -> Result<Neighborhood, StoreError> {
        let mut all = self.neighborhoods.lock().unwrap();
        if all.iter().any(|n| n.name == name) {
            return Err(StoreError::Duplicate);
        }
        let neighborhood = Neighborhood {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        all.push(neighborhood.clone());
        Ok(neighborhood)
    }

    async fn list_squares(&self, neighborhood_id: Uuid) -> Result<Vec<Square>, StoreError> {
        let mut all: Vec<Square> = self
            .squares
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.neighborhood_id == neighborhood_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn create_square(
        &self,
        name: &str,
        neighborhood_id: Uuid,
    ) -> Result<Square, StoreError> {
        let square = Square {
            id: Uuid::new_v4(),
            name: name.to_string(),
            neighborhood_id,
        };
        self.squares.lock().unwrap().push(square.clone());
        Ok(square)
    }

    async fn list_houses(&self, square_id: Uuid) -> Result<Vec<House>, StoreError> {
        let mut all: Vec<House> = self
            .houses
            .lock()
            .unwrap()
            .values()
            .filter(|h| h.square_id == square_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| a.house_number.cmp(&b.house_number));
        Ok(all)
    }

    async fn find_house(&self, id: Uuid) -> Result<Option<House>, StoreError> {
        Ok(self.houses.lock().unwrap().get(&id).cloned())
    }

    async fn house_number_taken(
        &self,
        square_id: Uuid,
        house_number: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        Ok(self.houses.lock().unwrap().values().any(|h| {
            h.square_id == square_id
                && h.house_number == house_number
                && Some(h.id) != exclude
        }))
    }

    async fn create_house(&self, house: NewHouse) -> Result<House, StoreError> {
        let mut all = self.houses.lock().unwrap();
        if all
            .values()
            .any(|h| h.square_id == house.square_id && h.house_number == house.house_number)
        {
            return Err(StoreError::Duplicate);
        }
        let created = House {
            id: Uuid::new_v4(),
            house_number: house.house_number,
            owner_name: house.owner_name,
            owner_phone: house.owner_phone,
            is_occupied: house.is_occupied,
            has_paid: house.has_paid,
            payment_type: house.payment_type,
            required_amount: house.required_amount,
            last_payment_date: None,
            receipt_image: house.receipt_image,
            square_id: house.square_id,
        };
        all.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_house(&self, id: Uuid, patch: HouseUpdate) -> Result<(), StoreError> {
        if self.fail_updates_for.lock().unwrap().contains(&id) {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        let mut all = self.houses.lock().unwrap();
        let house = all.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(v) = patch.house_number {
            house.house_number = v;
        }
        if let Some(v) = patch.owner_name {
            house.owner_name = v;
        }
        if let Some(v) = patch.owner_phone {
            house.owner_phone = v;
        }
        if let Some(v) = patch.is_occupied {
            house.is_occupied = v;
        }
        if let Some(v) = patch.has_paid {
            house.has_paid = v;
        }
        if let Some(v) = patch.payment_type {
            house.payment_type = v;
        }
        if let Some(v) = patch.required_amount {
            house.required_amount = v;
        }
        if let Some(v) = patch.last_payment_date {
            house.last_payment_date = v;
        }
        if let Some(v) = patch.receipt_image {
            house.receipt_image = v;
        }
        Ok(())
    }

    async fn delete_house(&self, id: Uuid) -> Result<(), StoreError> {
        self.houses
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list_occupied_houses(&self) -> Result<Vec<House>, StoreError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        Ok(self
            .houses
            .lock()
            .unwrap()
            .values()
            .filter(|h| h.is_occupied)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
    fail_lookups: AtomicBool,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_role(&self, id: Uuid, role: Role) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.role = role;
        }
    }

    pub fn remove(&self, id: Uuid) {
        self.users.lock().unwrap().remove(&id);
    }

    pub fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for MemoryUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        let mut all = self.users.lock().unwrap();
        if all.values().any(|u| u.username == username) {
            return Err(StoreError::Duplicate);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: OffsetDateTime::now_utc(),
        };
        all.insert(user.id, user.clone());
        Ok(user)
    }
}
