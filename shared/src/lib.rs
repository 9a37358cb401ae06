//! Shared types for the Tably platform
//!
//! Request/response DTOs exchanged between the server, the admin
//! dashboard, and the kitchen tablets. The server owns the entity
//! models; only the wire types that clients consume live here.

pub mod client;
pub mod device;
pub mod storefront;
pub mod sync;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use client::{LoginRequest, LoginResponse, UserInfo};
pub use device::{
    DeviceHeartbeatRequest, DeviceInfo, DeviceLoginRequest, DeviceLoginResponse,
    DeviceRegisteredResponse,
};
pub use storefront::{CartLine, CartModifier, QuoteLine, QuoteRequest, QuoteResponse};
pub use sync::SyncVersions;
