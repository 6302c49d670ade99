pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use session::{Session, SignedIn, SignedOut};
pub use types::{merge_patch, new_id, now_unix_secs};
