//! expo-inject android - string resource injection
//!
//! Models an Android `res/values/strings.xml` file as an ordered element tree
//! and upserts single `<string>` entries into it, the way an Expo config plugin
//! edits resources during prebuild.

mod inject;
pub mod plugin;
mod request;
mod xml;

pub use inject::{inject, InjectOutcome};
pub use plugin::{load_plugin_requests, plugin_requests};
pub use request::{ResourceFile, StringResourceRequest};
pub use xml::{Element, Node, ResourceDocument, TOOLS_NAMESPACE};
