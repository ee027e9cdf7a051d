mod query;

pub use self::query::SellerOrderQueryService;
