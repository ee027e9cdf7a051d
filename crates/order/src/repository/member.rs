use crate::abstract_trait::member::MemberVerifierTrait;
use shared::{config::ConnectionPool, errors::RepositoryError};

use async_trait::async_trait;
use tracing::error;

pub struct MemberVerifierRepository {
    db: ConnectionPool,
}

impl MemberVerifierRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemberVerifierTrait for MemberVerifierRepository {
    async fn exists(&self, member_id: i64) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM members
                WHERE member_id = $1 AND deleted_at IS NULL
            )
            "#,
        )
        .bind(member_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed member existence probe for {member_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(exists)
    }
}
