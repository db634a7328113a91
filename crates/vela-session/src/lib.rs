//! # Vela Session
//!
//! Session state and API surface for the Vela POS frontend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         vela-session                                    │
//! │                                                                         │
//! │   ┌────────────┐    ┌─────────────────────┐    ┌──────────────────┐    │
//! │   │  Frontend  │───►│    CartSession      │───►│   vela-core      │    │
//! │   │  (UI shell)│◄───│  Arc<Mutex<Engine>> │◄───│   CartEngine     │    │
//! │   └────────────┘    └─────────────────────┘    └──────────────────┘    │
//! │        JSON              ApiError                  CartError            │
//! │        DTOs              mapping                   (typed)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core crate stays pure; this crate owns locking, error serialization,
//! response shaping and logging. Every operation logs a `tracing::debug!`
//! event and returns the full cart (lines + derived summary), never a
//! partial delta.

pub mod error;
pub mod session;

pub use error::{ApiError, ErrorCode};
pub use session::{AddResponse, CartResponse, CartSession, FinalizeResponse};
