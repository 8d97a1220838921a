//! Data model shared by the usercss pipeline crates.
//!
//! A [`Style`] is the unit of work: raw source text goes in, parsed
//! [`UsercssData`] gets attached, and the compiler fills in the
//! [`Section`]s. A style carrying usercss data is considered *resolved*.
//!
//! All types serialize with camelCase field names, matching the JSON shape
//! the host application persists.

mod identity;
mod style;
mod vars;

pub use crate::identity::Identity;
pub use crate::style::{Reason, Section, Style, StyleId, UsercssData};
pub use crate::vars::{Var, VarKind, VariableSet, assign_vars};
