use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{QueryBuilder, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::property::{House, Neighborhood, PaymentType, Square};
use crate::domain::user::{Role, User};
use crate::infra::db::Db;

use super::{CredentialStore, HouseUpdate, NewHouse, PropertyCatalog, StoreError};

#[derive(Clone)]
pub struct PgPropertyCatalog {
    pool: Db,
}

impl PgPropertyCatalog {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: Db,
}

impl PgCredentialStore {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

fn map_db_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
        _ => StoreError::Unavailable(err.to_string()),
    }
}

fn house_from_row(row: &PgRow) -> House {
    let payment_type: String = row.get("payment_type");
    House {
        id: row.get("id"),
        house_number: row.get("house_number"),
        owner_name: row.get("owner_name"),
        owner_phone: row.get("owner_phone"),
        is_occupied: row.get("is_occupied"),
        has_paid: row.get("has_paid"),
        payment_type: PaymentType::from_db(&payment_type),
        required_amount: row.get("required_amount"),
        last_payment_date: row.get("last_payment_date"),
        receipt_image: row.get("receipt_image"),
        square_id: row.get("square_id"),
    }
}

fn user_from_row(row: &PgRow) -> User {
    let role: String = row.get("role");
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        role: Role::from_db(&role),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl PropertyCatalog for PgPropertyCatalog {
    async fn list_neighborhoods(&self) -> Result<Vec<Neighborhood>, StoreError> {
        let rows = sqlx::query("SELECT id, name FROM neighborhoods ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(rows
            .into_iter()
            .map(|r| Neighborhood {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn create_neighborhood(&self, name: &str) -> Result<Neighborhood, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO neighborhoods (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(Neighborhood {
            id,
            name: name.to_string(),
        })
    }

    async fn list_squares(&self, neighborhood_id: Uuid) -> Result<Vec<Square>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, neighborhood_id FROM squares WHERE neighborhood_id = $1 ORDER BY name ASC",
        )
        .bind(neighborhood_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows
            .into_iter()
            .map(|r| Square {
                id: r.get("id"),
                name: r.get("name"),
                neighborhood_id: r.get("neighborhood_id"),
            })
            .collect())
    }

    async fn create_square(
        &self,
        name: &str,
        neighborhood_id: Uuid,
    ) -> Result<Square, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO squares (id, name, neighborhood_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(neighborhood_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(Square {
            id,
            name: name.to_string(),
            neighborhood_id,
        })
    }

    async fn list_houses(&self, square_id: Uuid) -> Result<Vec<House>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, house_number, owner_name, owner_phone, is_occupied, has_paid,
                    payment_type, required_amount, last_payment_date, receipt_image, square_id
             FROM houses WHERE square_id = $1 ORDER BY house_number ASC",
        )
        .bind(square_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows.iter().map(house_from_row).collect())
    }

    async fn find_house(&self, id: Uuid) -> Result<Option<House>, StoreError> {
        let row = sqlx::query(
            "SELECT id, house_number, owner_name, owner_phone, is_occupied, has_paid,
                    payment_type, required_amount, last_payment_date, receipt_image, square_id
             FROM houses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.as_ref().map(house_from_row))
    }

    async fn house_number_taken(
        &self,
        square_id: Uuid,
        house_number: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let taken: bool = match exclude {
            Some(exclude) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM houses WHERE square_id = $1 AND house_number = $2 AND id <> $3)",
                )
                .bind(square_id)
                .bind(house_number)
                .bind(exclude)
                .fetch_one(&self.pool)
                .await
            }
            None => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM houses WHERE square_id = $1 AND house_number = $2)",
                )
                .bind(square_id)
                .bind(house_number)
                .fetch_one(&self.pool)
                .await
            }
        }
        .map_err(map_db_error)?;
        Ok(taken)
    }

    async fn create_house(&self, house: NewHouse) -> Result<House, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO houses (id, house_number, owner_name, owner_phone, is_occupied,
                                 has_paid, payment_type, required_amount, receipt_image, square_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(id)
        .bind(&house.house_number)
        .bind(&house.owner_name)
        .bind(&house.owner_phone)
        .bind(house.is_occupied)
        .bind(house.has_paid)
        .bind(house.payment_type.as_str())
        .bind(house.required_amount)
        .bind(&house.receipt_image)
        .bind(house.square_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(House {
            id,
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
        })
    }

    async fn update_house(&self, id: Uuid, patch: HouseUpdate) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("UPDATE houses SET ");
        {
            let mut fields = qb.separated(", ");
            if let Some(v) = patch.house_number {
                fields.push("house_number = ").push_bind_unseparated(v);
            }
            if let Some(v) = patch.owner_name {
                fields.push("owner_name = ").push_bind_unseparated(v);
            }
            if let Some(v) = patch.owner_phone {
                fields.push("owner_phone = ").push_bind_unseparated(v);
            }
            if let Some(v) = patch.is_occupied {
                fields.push("is_occupied = ").push_bind_unseparated(v);
            }
            if let Some(v) = patch.has_paid {
                fields.push("has_paid = ").push_bind_unseparated(v);
            }
            if let Some(v) = patch.payment_type {
                fields
                    .push("payment_type = ")
                    .push_bind_unseparated(v.as_str());
            }
            if let Some(v) = patch.required_amount {
                fields.push("required_amount = ").push_bind_unseparated(v);
            }
            if let Some(v) = patch.last_payment_date {
                fields
                    .push("last_payment_date = ")
                    .push_bind_unseparated(v);
            }
            if let Some(v) = patch.receipt_image {
                fields.push("receipt_image = ").push_bind_unseparated(v);
            }
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_house(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM houses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_occupied_houses(&self) -> Result<Vec<House>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, house_number, owner_name, owner_phone, is_occupied, has_paid,
                    payment_type, required_amount, last_payment_date, receipt_image, square_id
             FROM houses WHERE is_occupied = true",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows.iter().map(house_from_row).collect())
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        let id = Uuid::new_v4();
        let created_at = OffsetDateTime::now_utc();
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, role, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at,
        })
    }
}
