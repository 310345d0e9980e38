//! Typed handles the rest of the application talks to.

#[macro_use]
mod macros;
mod order_client;
mod user_client;

pub use order_client::OrderClient;
pub use user_client::UserClient;
