pub mod handlers;
pub mod server;

pub use handlers::{ingest_reading, AppState};
pub use server::{build_router, run_server, ServerConfig};
