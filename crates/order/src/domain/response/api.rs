use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".into(),
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> fmt::Display for ApiResponse<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{json}"),
            Err(e) => write!(f, "Error serializing ApiResponse to JSON: {e}"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Pagination {
    pub page: i32,
    pub page_size: i32,
    pub total_items: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i32, page_size: i32, total_items: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total_items + page_size as i64 - 1) / page_size as i64
        } else {
            0
        };
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct ApiResponsePagination<T> {
    pub status: String,
    pub message: String,
    pub data: T,
    pub pagination: Pagination,
}
