pub mod cache_back;
pub mod db;
pub mod igdb;
pub mod models;
pub mod search;
pub mod store;
