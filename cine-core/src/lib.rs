pub mod directory;
pub mod sensitive;
pub mod user;

pub use directory::{DirectoryError, UserDirectory};
pub use sensitive::Sensitive;
pub use user::{User, UserUpdate};
