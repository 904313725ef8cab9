//! Repository for the `contact_lists` and `contacts` tables.

use sqlx::types::Json;
use sqlx::PgPool;

use sandesh_core::contact::Contact;
use sandesh_core::types::DbId;

use crate::models::contact_list::{ContactList, ContactRow};

/// Column list for `contact_lists` queries.
const LIST_COLUMNS: &str = "id, name, source_list_ids, created_at, updated_at";

/// Column list for `contacts` queries.
const CONTACT_COLUMNS: &str = "id, list_id, position, phone, name";

/// Provides CRUD operations for contact lists and their contacts.
pub struct ContactListRepo;

impl ContactListRepo {
    /// Create a list with its contacts in one transaction.
    ///
    /// `source_list_ids` is empty for direct uploads and records the
    /// inputs for lists produced by Combine. Contacts are inserted in
    /// slice order; the caller is expected to have deduplicated them
    /// (the unique constraint on `(list_id, phone)` is the backstop).
    pub async fn create(
        pool: &PgPool,
        name: &str,
        contacts: &[Contact],
        source_list_ids: &[DbId],
    ) -> Result<ContactList, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO contact_lists (name, source_list_ids) \
             VALUES ($1, $2) \
             RETURNING {LIST_COLUMNS}"
        );
        let list = sqlx::query_as::<_, ContactList>(&query)
            .bind(name)
            .bind(Json(source_list_ids))
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_contacts(&mut tx, list.id, contacts).await?;

        tx.commit().await?;
        Ok(list)
    }

    /// Replace the contacts of an existing list (re-upload).
    ///
    /// Returns the refreshed list row, or `None` if the list does not
    /// exist.
    pub async fn replace_contacts(
        pool: &PgPool,
        list_id: DbId,
        contacts: &[Contact],
    ) -> Result<Option<ContactList>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE contact_lists SET updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {LIST_COLUMNS}"
        );
        let Some(list) = sqlx::query_as::<_, ContactList>(&query)
            .bind(list_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM contacts WHERE list_id = $1")
            .bind(list_id)
            .execute(&mut *tx)
            .await?;

        Self::insert_contacts(&mut tx, list_id, contacts).await?;

        tx.commit().await?;
        Ok(Some(list))
    }

    /// Rename a list. Returns the updated row, or `None` if missing.
    pub async fn rename(
        pool: &PgPool,
        list_id: DbId,
        name: &str,
    ) -> Result<Option<ContactList>, sqlx::Error> {
        let query = format!(
            "UPDATE contact_lists SET name = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {LIST_COLUMNS}"
        );
        sqlx::query_as::<_, ContactList>(&query)
            .bind(list_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a list by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        list_id: DbId,
    ) -> Result<Option<ContactList>, sqlx::Error> {
        let query = format!("SELECT {LIST_COLUMNS} FROM contact_lists WHERE id = $1");
        sqlx::query_as::<_, ContactList>(&query)
            .bind(list_id)
            .fetch_optional(pool)
            .await
    }

    /// List all contact lists, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ContactList>, sqlx::Error> {
        let query = format!(
            "SELECT {LIST_COLUMNS} FROM contact_lists ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ContactList>(&query).fetch_all(pool).await
    }

    /// Delete a list. Returns `true` if a row was deleted.
    ///
    /// Fails with a foreign-key violation if a campaign still references
    /// the list; callers check that first to produce a friendly error.
    pub async fn delete(pool: &PgPool, list_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contact_lists WHERE id = $1")
            .bind(list_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch a list's contacts in insertion (file) order.
    pub async fn contacts_for(
        pool: &PgPool,
        list_id: DbId,
    ) -> Result<Vec<ContactRow>, sqlx::Error> {
        let query = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts \
             WHERE list_id = $1 \
             ORDER BY position"
        );
        sqlx::query_as::<_, ContactRow>(&query)
            .bind(list_id)
            .fetch_all(pool)
            .await
    }

    /// Number of contacts in a list.
    pub async fn contact_count(pool: &PgPool, list_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM contacts WHERE list_id = $1")
                .bind(list_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Insert contacts for a list, preserving slice order via `position`.
    async fn insert_contacts(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        list_id: DbId,
        contacts: &[Contact],
    ) -> Result<(), sqlx::Error> {
        for (position, contact) in contacts.iter().enumerate() {
            sqlx::query(
                "INSERT INTO contacts (list_id, position, phone, name) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (list_id, phone) DO NOTHING",
            )
            .bind(list_id)
            .bind(position as i32)
            .bind(&contact.phone)
            .bind(&contact.name)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
