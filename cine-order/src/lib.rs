pub mod cart;
pub mod receipt;

pub use cart::{Cart, CartError, CartItem};
pub use receipt::Receipt;
