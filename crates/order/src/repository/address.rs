use crate::abstract_trait::address::AddressBookTrait;
use shared::{config::ConnectionPool, errors::RepositoryError};

use async_trait::async_trait;
use tracing::error;

pub struct AddressBookRepository {
    db: ConnectionPool,
}

impl AddressBookRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AddressBookTrait for AddressBookRepository {
    async fn save_from_order(
        &self,
        member_id: i64,
        receiver: &str,
        postcode: &str,
        addr_detail: &str,
        make_default: bool,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        if make_default {
            sqlx::query(
                r#"
                UPDATE addresses
                SET is_default = false, updated_at = current_timestamp
                WHERE member_id = $1 AND is_default
                "#,
            )
            .bind(member_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to clear default address for member {member_id}: {e:?}");
                RepositoryError::from(e)
            })?;
        }

        sqlx::query(
            r#"
            INSERT INTO addresses (member_id, receiver, postcode, addr_detail, is_default,
                                   created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, current_timestamp, current_timestamp)
            ON CONFLICT (member_id, postcode, addr_detail) DO UPDATE
            SET receiver = EXCLUDED.receiver,
                is_default = EXCLUDED.is_default,
                updated_at = current_timestamp
            "#,
        )
        .bind(member_id)
        .bind(receiver)
        .bind(postcode)
        .bind(addr_detail)
        .bind(make_default)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("❌ Failed to save address for member {member_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        tx.commit().await.map_err(RepositoryError::from)
    }
}
