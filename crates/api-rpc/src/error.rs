//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use thunder_forge_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SYSTEM_ERROR: i32 = 5002;
}

fn error_code(err: &AppError) -> i32 {
    match err {
        AppError::Domain(_) | AppError::Translations(_) | AppError::Serialization(_) => {
            code::VALIDATION_ERROR
        }
        AppError::Config(_) => code::INTERNAL_ERROR,
        AppError::Io(_)
        | AppError::Execution(_)
        | AppError::HostsUpdate { .. }
        | AppError::Fabricnet(_) => code::SYSTEM_ERROR,
    }
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(error_code(&err), err.to_string(), None::<()>)
}
