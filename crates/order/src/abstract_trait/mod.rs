pub mod address;
pub mod checkout;
pub mod gateway;
pub mod member;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod pricing;
pub mod sales;
pub mod seller;
