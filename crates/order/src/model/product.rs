use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    OnSale,
    SoldOut,
    Stopped,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::OnSale => "ON_SALE",
            ProductStatus::SoldOut => "SOLD_OUT",
            ProductStatus::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON_SALE" => Ok(ProductStatus::OnSale),
            "SOLD_OUT" => Ok(ProductStatus::SoldOut),
            "STOPPED" => Ok(ProductStatus::Stopped),
            other => Err(format!("unknown product status: {other}")),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for ProductStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for ProductStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ProductStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        text.parse::<ProductStatus>().map_err(Into::into)
    }
}

/// Inventory ledger row as seen under an exclusive lock during checkout.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockRecord {
    pub product_id: i64,
    pub seller_id: i64,
    pub product_name: String,
    pub price: i64,
    pub stock_qty: i32,
    pub status: ProductStatus,
    pub deleted_at: Option<NaiveDateTime>,
}
