//! Address and address book persistence.

use sqlx::PgPool;

use greenleaf_core::{AddressData, AddressId, UserId};

use super::RepositoryError;
use crate::models::address::Address;

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    first_name: String,
    last_name: String,
    company_name: String,
    street_address_1: String,
    street_address_2: String,
    city: String,
    city_area: String,
    postal_code: String,
    country: String,
    country_area: String,
    phone: String,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            data: AddressData {
                first_name: row.first_name,
                last_name: row.last_name,
                company_name: row.company_name,
                street_address_1: row.street_address_1,
                street_address_2: row.street_address_2,
                city: row.city,
                city_area: row.city_area,
                postal_code: row.postal_code,
                country: row.country,
                country_area: row.country_area,
                phone: row.phone,
            },
        }
    }
}

/// Binds the eleven `AddressData` columns in declaration order.
macro_rules! bind_address_data {
    ($query:expr, $data:expr) => {
        $query
            .bind(&$data.first_name)
            .bind(&$data.last_name)
            .bind(&$data.company_name)
            .bind(&$data.street_address_1)
            .bind(&$data.street_address_2)
            .bind(&$data.city)
            .bind(&$data.city_area)
            .bind(&$data.postal_code)
            .bind(&$data.country)
            .bind(&$data.country_area)
            .bind(&$data.phone)
    };
}

/// Repository for addresses and the user address book.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an address by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r#"
            SELECT id, first_name, last_name, company_name,
                   street_address_1, street_address_2, city, city_area,
                   postal_code, country, country_area, phone
            FROM account.address
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// All addresses in a user's address book, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            r#"
            SELECT a.id, a.first_name, a.last_name, a.company_name,
                   a.street_address_1, a.street_address_2, a.city, a.city_area,
                   a.postal_code, a.country, a.country_area, a.phone
            FROM account.address a
            JOIN account.user_address ua ON ua.address_id = a.id
            WHERE ua.user_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Find an address in the user's book whose every field equals `data`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_in_address_book(
        &self,
        user_id: UserId,
        data: &AddressData,
    ) -> Result<Option<Address>, RepositoryError> {
        let query = sqlx::query_as::<_, AddressRow>(
            r#"
            SELECT a.id, a.first_name, a.last_name, a.company_name,
                   a.street_address_1, a.street_address_2, a.city, a.city_area,
                   a.postal_code, a.country, a.country_area, a.phone
            FROM account.address a
            JOIN account.user_address ua ON ua.address_id = a.id
            WHERE ua.user_id = $1
              AND a.first_name = $2
              AND a.last_name = $3
              AND a.company_name = $4
              AND a.street_address_1 = $5
              AND a.street_address_2 = $6
              AND a.city = $7
              AND a.city_area = $8
              AND a.postal_code = $9
              AND a.country = $10
              AND a.country_area = $11
              AND a.phone = $12
            ORDER BY a.id
            LIMIT 1
            "#,
        )
        .bind(user_id);

        let row = bind_address_data!(query, data)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Create a standalone address (not in any address book).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, data: &AddressData) -> Result<Address, RepositoryError> {
        let query = sqlx::query_as::<_, AddressRow>(
            r#"
            INSERT INTO account.address
                (first_name, last_name, company_name,
                 street_address_1, street_address_2, city, city_area,
                 postal_code, country, country_area, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, first_name, last_name, company_name,
                      street_address_1, street_address_2, city, city_area,
                      postal_code, country, country_area, phone
            "#,
        );

        let row = bind_address_data!(query, data).fetch_one(self.pool).await?;
        Ok(row.into())
    }

    /// Create an address and add it to the user's address book atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either insert fails.
    pub async fn create_in_address_book(
        &self,
        user_id: UserId,
        data: &AddressData,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let query = sqlx::query_as::<_, AddressRow>(
            r#"
            INSERT INTO account.address
                (first_name, last_name, company_name,
                 street_address_1, street_address_2, city, city_area,
                 postal_code, country, country_area, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, first_name, last_name, company_name,
                      street_address_1, street_address_2, city, city_area,
                      postal_code, country, country_area, phone
            "#,
        );
        let row = bind_address_data!(query, data).fetch_one(&mut *tx).await?;

        sqlx::query("INSERT INTO account.user_address (user_id, address_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Add an existing address to the user's address book.
    ///
    /// Adding an address that is already in the book is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_to_address_book(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO account.user_address (user_id, address_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(address_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Overwrite every field of an existing address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(&self, id: AddressId, data: &AddressData) -> Result<Address, RepositoryError> {
        let query = sqlx::query_as::<_, AddressRow>(
            r#"
            UPDATE account.address
            SET first_name = $2, last_name = $3, company_name = $4,
                street_address_1 = $5, street_address_2 = $6,
                city = $7, city_area = $8, postal_code = $9,
                country = $10, country_area = $11, phone = $12
            WHERE id = $1
            RETURNING id, first_name, last_name, company_name,
                      street_address_1, street_address_2, city, city_area,
                      postal_code, country, country_area, phone
            "#,
        )
        .bind(id);

        bind_address_data!(query, data)
            .fetch_optional(self.pool)
            .await?
            .map(Into::into)
            .ok_or(RepositoryError::NotFound)
    }
}
