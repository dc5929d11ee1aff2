// Library for tests to access modules

pub mod cache;
pub mod collector;
pub mod config;
pub mod models;
pub mod routes;
pub mod version;
pub mod worker;
