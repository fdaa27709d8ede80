mod error;
pub mod handlers;
pub mod server;

pub use handlers::AppState;
pub use server::{create_router, run_server};
