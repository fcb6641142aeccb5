//! Client for the Vince API-key validation service.
//!
//! ```no_run
//! # async fn run() {
//! if vince_client::test_connection().await {
//!     let result = vince_client::validate_key("sk-proj-abc123-def456").await;
//!     println!("valid: {}", result.is_valid());
//! }
//! # }
//! ```

pub mod client;
pub mod config;
pub mod health;
pub mod result;
pub mod vince;

pub use client::{HttpClient, JsonResponse, RequestError};
pub use config::{ClientConfig, ConfigError};
pub use health::{HealthCheck, HealthReport};
pub use result::{ErrorCode, KeyData, ValidKey, ValidationFailure, ValidationResult};
pub use vince::{VinceClient, test_connection, validate_key};
