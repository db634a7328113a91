//! # API Error Type
//!
//! Unified error type for session operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Vela POS                               │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  session.addLine(...)                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Session Operation                                               │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Engine rejection? ─── CartError::StockInsufficient ──┐         │  │
//! │  │         │                                             ▼         │  │
//! │  │         │                                         ApiError ────►│  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  try {                                                                  │
//! │    await session.addLine(...)                                           │
//! │  } catch (e) {                                                          │
//! │    // e.message = "Insufficient stock in Main Store: ..."               │
//! │    // e.code = "INSUFFICIENT_STOCK"                                     │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every engine rejection maps to one machine-readable `code` plus the
//! engine's own human-readable message, so the frontend can switch on the
//! code and display the message verbatim.

use serde::Serialize;
use thiserror::Error;
use vela_core::CartError;

/// API error returned from session operations.
///
/// ## Serialization
/// This is what the frontend receives when an operation fails:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock in Main Store: requested 12, available 10"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Frontend
/// ```typescript
/// try {
///   await session.addLine({ productId });
/// } catch (e) {
///   switch (e.code) {
///     case 'INSUFFICIENT_STOCK':
///       showStockWarning(e.message);
///       break;
///     case 'MERGE_CONFLICT_PENDING':
///       reopenDecisionDialog();
///       break;
///     default:
///       showError(e.message);
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, package, warehouse or cart line not found
    NotFound,

    /// Quantity input rejected (negative, zero, non-finite, fractional)
    ValidationError,

    /// A warehouse cannot cover the requested allocation
    InsufficientStock,

    /// Allocation would strand stock below the minimum purchase
    OrphanStock,

    /// A line sits below the product's minimum purchase quantity
    MinPurchaseNotMet,

    /// Line-count or per-line quantity limit hit
    CartLimit,

    /// Cart total exceeds the maximum order value
    TotalValueExceeded,

    /// No warehouse in the catalog can satisfy the request
    NoWarehouseAvailable,

    /// A merge/split decision is outstanding
    MergeConflictPending,

    /// A resolution arrived with nothing outstanding
    NoPendingConflict,

    /// Finalize refused while lines carry validation issues
    FinalizeBlocked,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

/// Converts engine rejections to API errors.
///
/// The message is always the engine's own Display output; only the code is
/// derived from the variant.
impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        let code = match &err {
            CartError::StockInsufficient { .. } => ErrorCode::InsufficientStock,
            CartError::OrphanStockViolation { .. } => ErrorCode::OrphanStock,
            CartError::MinPurchaseNotMet { .. } => ErrorCode::MinPurchaseNotMet,
            CartError::LineLimitExceeded { .. } | CartError::QuantityLimitExceeded { .. } => {
                ErrorCode::CartLimit
            }
            CartError::TotalValueExceeded { .. } => ErrorCode::TotalValueExceeded,
            CartError::NoWarehouseAvailable { .. } => ErrorCode::NoWarehouseAvailable,
            CartError::ProductNotFound(_)
            | CartError::PackageNotFound { .. }
            | CartError::WarehouseNotFound(_)
            | CartError::LineNotFound(_) => ErrorCode::NotFound,
            CartError::InvalidQuantity { .. } => ErrorCode::ValidationError,
            CartError::MergeConflictPending => ErrorCode::MergeConflictPending,
            CartError::NoPendingConflict => ErrorCode::NoPendingConflict,
            CartError::FinalizeBlocked { .. } => ErrorCode::FinalizeBlocked,
        };
        ApiError::new(code, err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
