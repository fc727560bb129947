//! Error types for the authorization and resolution engine.
//!
//! Every error here is a local, recoverable decision reported back to the
//! caller. None of them are fatal to the process.

use thiserror::Error;

use crate::proxy::ProxyType;
use crate::types::{Address, CallHash};

/// Capability check failures raised by the proxy lattice
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// The proxy type does not allow the call
    #[error("Insufficient permission for {section}.{method}")]
    InsufficientPermission {
        /// Call section (pallet)
        section: String,
        /// Call method
        method: String,
    },

    /// A sub-proxy grant would exceed the holder's own capability
    #[error("Privilege escalation: {held} cannot grant {requested}")]
    PrivilegeEscalation {
        /// Proxy type the new delegate would receive
        requested: ProxyType,
        /// Proxy type the granting delegate holds
        held: ProxyType,
    },
}

/// Main error type for engine operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Capability check failed
    #[error(transparent)]
    Permission(#[from] PermissionError),

    /// Transaction and account shapes disagree
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    /// Supplied call bytes do not hash to the expected call hash
    #[error("Call hash mismatch: expected {expected}, got {actual}")]
    CallHashMismatch {
        /// Hash recorded on the transaction
        expected: CallHash,
        /// Hash of the supplied bytes
        actual: CallHash,
    },

    /// An account appears among its own ancestors
    #[error("Cyclic account graph at {0}")]
    CyclicAccount(Address),

    /// Address missing from the account arena
    #[error("Unknown account: {0}")]
    UnknownAccount(Address),

    /// Account record violates a structural invariant
    #[error("Invalid account {address}: {reason}")]
    InvalidAccount {
        /// Offending account
        address: Address,
        /// What is wrong with it
        reason: String,
    },

    /// Malformed call hash text
    #[error("Invalid call hash: {0}")]
    InvalidCallHash(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Error surfaced by the async entry points that consult a collaborator
#[derive(Error, Debug)]
pub enum ServiceError<E>
where
    E: std::error::Error + 'static,
{
    /// The collaborator failed to answer
    #[error("Collaborator error: {0}")]
    Collaborator(#[source] E),

    /// The engine rejected the fetched snapshot
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PermissionError::InsufficientPermission {
            section: "balances".to_string(),
            method: "transferKeepAlive".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient permission for balances.transferKeepAlive"
        );

        let err = PermissionError::PrivilegeEscalation {
            requested: ProxyType::Any,
            held: ProxyType::NonTransfer,
        };
        assert_eq!(
            err.to_string(),
            "Privilege escalation: NonTransfer cannot grant Any"
        );
    }

    #[test]
    fn test_permission_error_converts() {
        let err: EngineError = PermissionError::InsufficientPermission {
            section: "proxy".to_string(),
            method: "killPure".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::Permission(_)));
        assert!(err.to_string().contains("proxy.killPure"));
    }
}
