//! Chart of accounts hierarchy rules.
//!
//! Accounts form a forest through their optional parent link. This module
//! keeps the links acyclic and rolls balances up the tree.

pub mod hierarchy;

pub use hierarchy::{HierarchyService, RollupBalance};
