pub mod app_config;
pub mod database;
pub mod memory;
pub mod password;
pub mod user_repo;

pub use database::DbClient;
pub use memory::MemoryUserDirectory;
pub use user_repo::PgUserDirectory;
