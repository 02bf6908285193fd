//! Data structures for class configuration.
//!
//! This module contains pure data structures that define character classes.
//! All structs are designed to be deserialized from RON.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `arena_headless`.

mod class_data;
mod class_registry;

pub use class_data::{AttackStyle, ClassData};
pub use class_registry::ClassRegistry;
