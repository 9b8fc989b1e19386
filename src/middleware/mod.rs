pub mod gatekeeper;
pub mod response;

pub use gatekeeper::{edge_gatekeeper, RoutedPath};
pub use response::{ApiResponse, ApiResult};
