use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynAddressBook = Arc<dyn AddressBookTrait + Send + Sync>;

/// Fire-and-forget save of the shipping snapshot into the caller's address
/// book. A failure here is logged and never fails the order.
#[async_trait]
pub trait AddressBookTrait {
    async fn save_from_order(
        &self,
        member_id: i64,
        receiver: &str,
        postcode: &str,
        addr_detail: &str,
        make_default: bool,
    ) -> Result<(), RepositoryError>;
}
