pub mod error;
pub mod filter;
pub mod pagination;
pub mod responses;
