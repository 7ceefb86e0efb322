//! Workflow orchestration for expo-inject

mod release;
mod version;

pub use release::*;
pub use version::*;
