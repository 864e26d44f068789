pub mod password;
pub mod record;
pub mod repo;
pub mod service;
