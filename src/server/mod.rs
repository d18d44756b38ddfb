pub mod http;
pub mod query;
pub mod search_manager;
pub mod tcp;
