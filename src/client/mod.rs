pub mod backend;
pub mod http;

pub use backend::{ClientError, GameBackend};
pub use http::HttpBackend;
