use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynMemberVerifier = Arc<dyn MemberVerifierTrait + Send + Sync>;

/// Existence probe against the accounts subsystem. Orders reference members
/// by value, so this is the only coupling the engine has to it.
#[async_trait]
pub trait MemberVerifierTrait {
    async fn exists(&self, member_id: i64) -> Result<bool, RepositoryError>;
}
