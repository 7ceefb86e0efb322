//! Upsert of a single `<string>` entry

use serde::Serialize;
use tracing::{debug, instrument};

use crate::request::StringResourceRequest;
use crate::xml::{Element, Node, ResourceDocument, TOOLS_NAMESPACE};
use expo_inject_core::error::Result;

/// What happened to the entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectOutcome {
    /// No entry with that name existed, one was appended
    Added,
    /// An existing entry was replaced in place
    Replaced,
}

/// Upsert the request's `<string>` into `document`
///
/// The first entry with the same name is replaced where it stands and any
/// later duplicates are removed, so exactly one entry remains. Without a match
/// the entry is appended. Other children are left untouched.
#[instrument(skip(document, request), fields(name = %request.name, file = %request.file))]
pub fn inject(
    document: &mut ResourceDocument,
    request: &StringResourceRequest,
) -> Result<InjectOutcome> {
    let request = request.normalized()?;

    if request.target_api.is_some() {
        document.ensure_namespace("tools", TOOLS_NAMESPACE);
    }

    let outcome = upsert(document.root_mut(), request.to_element());
    debug!(?outcome, "string resource injected");
    Ok(outcome)
}

fn upsert(root: &mut Element, entry: Element) -> InjectOutcome {
    let name = entry.attribute("name").map(str::to_string);
    let is_match = |node: &Node| match node {
        Node::Element(el) => el.name == "string" && el.attribute("name") == name.as_deref(),
        _ => false,
    };

    match root.children.iter().position(|node| is_match(node)) {
        Some(index) => {
            root.children[index] = Node::Element(entry);
            let mut seen = 0usize;
            root.children.retain(|node| {
                if !is_match(node) {
                    return true;
                }
                seen += 1;
                seen == 1
            });
            InjectOutcome::Replaced
        }
        None => {
            root.children.push(Node::Element(entry));
            InjectOutcome::Added
        }
    }
}
