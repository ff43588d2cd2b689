//! A needle-in-haystack structural matcher for hardware-design circuit
//! trees: build a circuit out of wires and gates (spec.md §3), freeze it,
//! then ask whether one frozen circuit (the needle) occurs as a subcircuit
//! of another (the haystack), up to wire renaming and gate/child reordering.
//!
//! Grounded end-to-end in `original_source/` (`circuitTree.h` and its five
//! `circuit*.{h,cpp}` subclasses, `wireId.{h,cpp}`/`wireManager.{h,cpp}`,
//! `groupEquality.cpp`, `subcircMatch.cpp`) -- see `DESIGN.md` at the
//! workspace root for the full grounding ledger, including which Open
//! Questions were resolved which way and why.
//!
//! The public surface is the [`builder`] module (construct a circuit),
//! [`gate::Gate`]/[`gate::group::GroupGate`]::freeze (commit it), `.equals`/
//! [`equality::groups_equal`] (formal equality) and [`matcher::match_subcircuit`]
//! (the needle/haystack search), plus [`dot::emit_group`] for visualizing a
//! frozen tree.

pub mod bitset;
pub mod builder;
pub mod config;
pub mod dot;
pub mod equality;
pub mod error;
pub mod expr;
pub mod gate;
mod ids;
pub mod matcher;
pub mod perm;
pub mod sigconst;
pub mod wire;

pub use error::{Error, ErrorCode, Result};
pub use gate::group::GroupGate;
pub use gate::Gate;
pub use ids::{GateId, RegistryId};
pub use matcher::{match_subcircuit, MatchResult};
pub use wire::{WireHandle, WireRegistry};
