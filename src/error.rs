//! Structural errors raised by programmer misuse of the builder/query API.
//!
//! These are never data-dependent: a circuit that fails to match a needle,
//! or two circuits that are not formally equal, are *not* errors (see
//! [`crate::equality`] and [`crate::matcher`]) -- only frozen/unfrozen
//! violations, malformed pins and duplicate/missing wires are.

use thiserror::Error;

use crate::wire::WireHandle;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// Attempted to mutate a gate or group after it was frozen.
    #[error("circuit is frozen and cannot be altered")]
    Frozen,

    /// Attempted a freeze-dependent query (`sign`, `equals`, matching) on a
    /// gate that has not been frozen yet.
    #[error("circuit must be frozen before computing signatures or matches")]
    NotFrozen,

    /// `Group::add_child` was called with a child that already has an
    /// ancestor group.
    #[error("child already belongs to a group")]
    AlreadyHasAncestor,

    /// An I/O pin's formal side was connected twice.
    #[error("pin is already connected to an outer wire")]
    AlreadyConnected,

    /// `WireRegistry::fresh` was called with a name that already exists in
    /// this registry.
    #[error("wire `{0}` is already defined in this registry")]
    AlreadyDefined(String),

    /// A strict wire lookup (`dont_create = true`, or lookup by id) found
    /// nothing.
    #[error("wire `{0}` is not defined in this registry")]
    NotDefined(String),

    /// An operation that requires an enclosing group was invoked on a gate
    /// with no ancestor (mirrors the C-binding's `NoParent`/`ISOM_RC_NO_PARENT`).
    #[error("operation requires a parent group, but none exists")]
    NoParent,

    /// Reached the end of an exhaustively-matched `switch` over an
    /// [`crate::expr::BinOp`]/[`crate::expr::UnOp`]/[`crate::expr::UnConstOp`]
    /// that has no case for the given variant. Defensive: Rust's closed enums
    /// make this unreachable, but the check documents the invariant the
    /// original C++ `switch` relied upon.
    #[error("unimplemented expression operator")]
    UnimplementedOperator,

    /// A deferred pin's formal name did not resolve inside the ancestor's
    /// registry when expected to.
    #[error("unresolved deferred pin `{0}`")]
    UnresolvedPin(String),

    /// Internal bookkeeping inconsistency: a wire handle was used against a
    /// registry it was not allocated from.
    #[error("wire handle {0:?} does not belong to this registry")]
    ForeignWire(WireHandle),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Stable, bit-exact error codes for any future C-style binding. No
/// `extern "C"` surface is built here -- only the stable numbering, so a
/// binding layer built later doesn't have to re-derive it. `TryFromPrimitive`
/// gives a binding layer the inverse conversion (wire byte -> `ErrorCode`) for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum ErrorCode {
    Ok = 0,
    NullHandle = 1,
    Domain = 2,
    NoParent = 3,
    BadHex = 4,
    Generic = 255,
}

impl From<&Error> for ErrorCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::NoParent => ErrorCode::NoParent,
            // Everything else raised by this library is a structural-misuse
            // error with no closer C-binding analogue than "generic"; the
            // null-handle/domain/bad-hex codes are reserved for the FFI
            // layer itself, which does not exist in this crate.
            _ => ErrorCode::Generic,
        }
    }
}
