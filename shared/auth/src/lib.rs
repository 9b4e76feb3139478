//! Security-context extraction for service APIs.
//!
//! Token issuance and role administration are external collaborators; this
//! crate only validates bearer tokens and exposes the tenant-scoped security
//! context they carry.

pub mod extractors;

pub use extractors::{AuthUser, JwtSecretProvider};
