//! Resource XML model and codec
//!
//! Parsing keeps everything a resource file can carry (other resource kinds,
//! inline markup inside strings, comments, CDATA) so that untouched entries
//! come back out unchanged. Layout whitespace is only managed inside container
//! elements (`<resources>` and the array, plurals and style resources): there it
//! is dropped on read and regenerated on write with four-space indentation.
//! String and item values, and everything nested in them, keep their text as is.

use std::path::Path;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, info};

use expo_inject_core::error::{ResourceError, Result};

/// Namespace URI bound to the `tools:` prefix
pub const TOOLS_NAMESPACE: &str = "http://schemas.android.com/tools";

const ROOT_ELEMENT: &str = "resources";
const INDENT: &str = "    ";

/// Elements whose children are resources or items rather than a value
const CONTAINERS: &[&str] = &[
    ROOT_ELEMENT,
    "plurals",
    "string-array",
    "integer-array",
    "array",
    "style",
    "declare-styleable",
];

/// A node inside an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Builder-style text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Value of an attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing the value in place if it exists
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Child elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Concatenated text of direct text and CDATA children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    fn is_container(&self) -> bool {
        CONTAINERS.contains(&self.name.as_str())
    }

    /// Whether every child is an element or a comment
    fn is_element_only(&self) -> bool {
        self.children
            .iter()
            .all(|node| matches!(node, Node::Element(_) | Node::Comment(_)))
    }

    /// Drop whitespace-only text that merely formats element-only content
    fn strip_formatting(&mut self) {
        let has_markup = self
            .children
            .iter()
            .any(|node| matches!(node, Node::Element(_) | Node::Comment(_)));
        let has_content = self.children.iter().any(|node| match node {
            Node::Text(t) => !t.trim().is_empty(),
            Node::CData(_) => true,
            _ => false,
        });

        if has_markup && !has_content {
            self.children.retain(|node| !matches!(node, Node::Text(_)));
        }
    }
}

/// An Android resource file: a `<resources>` root plus any leading comments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDocument {
    prolog: Vec<String>,
    root: Element,
}

impl Default for ResourceDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDocument {
    /// An empty `<resources/>` document
    pub fn new() -> Self {
        Self {
            prolog: Vec::new(),
            root: Element::new(ROOT_ELEMENT),
        }
    }

    /// The `<resources>` element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Mutable access to the `<resources>` element
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// All `<string>` entries in document order
    pub fn strings(&self) -> impl Iterator<Item = &Element> {
        self.root.elements().filter(|el| el.name == "string")
    }

    /// The first `<string>` entry named `name`
    pub fn string(&self, name: &str) -> Option<&Element> {
        self.strings().find(|el| el.attribute("name") == Some(name))
    }

    /// Text of the `<string>` entry named `name`
    pub fn string_value(&self, name: &str) -> Option<String> {
        self.string(name).map(Element::text)
    }

    /// Declare `xmlns:<prefix>` on the root unless already present
    pub fn ensure_namespace(&mut self, prefix: &str, uri: &str) -> bool {
        let key = format!("xmlns:{}", prefix);
        if self.root.attribute(&key).is_some() {
            return false;
        }
        debug!(prefix, uri, "declaring namespace on <resources>");
        self.root.set_attribute(key, uri);
        true
    }

    /// Read a resource file, or start an empty document when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "resource file not found, starting empty document");
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Self::parse(&content)?;
        debug!(
            path = %path.display(),
            strings = document.strings().count(),
            "loaded resource file"
        );
        Ok(document)
    }

    /// Write the document, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_xml()?).map_err(io_err)?;
        info!(path = %path.display(), "wrote resource file");
        Ok(())
    }

    /// Parse resource XML
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut prolog = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event().map_err(ResourceError::from)? {
                Event::Start(e) => stack.push(element_from(&reader, &e)?),
                Event::Empty(e) => {
                    let element = element_from(&reader, &e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        ResourceError::InvalidStructure("unbalanced end tag".to_string())
                    })?;
                    if element.is_container() && stack.iter().all(Element::is_container) {
                        element.strip_formatting();
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(ResourceError::from)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Text(text.into_owned())),
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(ResourceError::InvalidStructure(
                                "text outside the root element".to_string(),
                            )
                            .into())
                        }
                    }
                }
                Event::CData(e) => {
                    let text = reader.decoder().decode(&e).map_err(ResourceError::from)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::CData(text.into_owned())),
                        None => {
                            return Err(ResourceError::InvalidStructure(
                                "CDATA outside the root element".to_string(),
                            )
                            .into())
                        }
                    }
                }
                Event::Comment(e) => {
                    let text = reader
                        .decoder()
                        .decode(&e)
                        .map_err(ResourceError::from)?
                        .into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Comment(text)),
                        None if root.is_none() => prolog.push(text),
                        None => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ResourceError::InvalidStructure(format!(
                "element <{}> is not closed",
                open.name
            ))
            .into());
        }

        let root = root.ok_or_else(|| {
            ResourceError::InvalidStructure("document has no root element".to_string())
        })?;
        if root.name != ROOT_ELEMENT {
            return Err(ResourceError::InvalidStructure(format!(
                "expected <{}> root element, found <{}>",
                ROOT_ELEMENT, root.name
            ))
            .into());
        }

        Ok(Self { prolog, root })
    }

    /// Serialize to XML with an XML declaration and four-space indentation
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
        )?;
        newline(&mut writer, 0)?;
        for comment in &self.prolog {
            write(&mut writer, Event::Comment(BytesText::from_escaped(comment.as_str())))?;
            newline(&mut writer, 0)?;
        }
        write_element(&mut writer, &self.root, 0, true)?;
        newline(&mut writer, 0)?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| ResourceError::InvalidStructure(e.to_string()).into())
    }
}

fn element_from(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Element> {
    let decoder = reader.decoder();
    let name = decoder
        .decode(start.name().as_ref())
        .map_err(ResourceError::from)?
        .into_owned();

    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ResourceError::from(quick_xml::Error::from(e)))?;
        let key = decoder
            .decode(attr.key.as_ref())
            .map_err(ResourceError::from)?
            .into_owned();
        let value = attr.unescape_value().map_err(ResourceError::from)?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(
            ResourceError::InvalidStructure("multiple root elements".to_string()).into(),
        );
    }
    *root = Some(element);
    Ok(())
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ResourceError::from(quick_xml::Error::from(e)))?;
    Ok(())
}

fn newline(writer: &mut Writer<Vec<u8>>, depth: usize) -> Result<()> {
    let whitespace = format!("\n{}", INDENT.repeat(depth));
    write(writer, Event::Text(BytesText::from_escaped(whitespace)))
}

fn write_node(
    writer: &mut Writer<Vec<u8>>,
    node: &Node,
    depth: usize,
    layout: bool,
) -> Result<()> {
    match node {
        Node::Element(element) => write_element(writer, element, depth, layout),
        Node::Text(text) => write(
            writer,
            Event::Text(BytesText::from_escaped(partial_escape(text))),
        ),
        Node::CData(text) => write(writer, Event::CData(BytesCData::new(text.as_str()))),
        Node::Comment(text) => write(
            writer,
            Event::Comment(BytesText::from_escaped(text.as_str())),
        ),
    }
}

/// `layout` is true while every ancestor is a container
fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    depth: usize,
    layout: bool,
) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return write(writer, Event::Empty(start));
    }

    write(writer, Event::Start(start))?;
    let layout = layout && element.is_container();
    let block = layout && element.is_element_only();
    for child in &element.children {
        if block {
            newline(writer, depth + 1)?;
        }
        write_node(writer, child, depth + 1, layout)?;
    }
    if block {
        newline(writer, depth)?;
    }
    write(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- generated by expo prebuild -->
<resources xmlns:tools="http://schemas.android.com/tools" xmlns:xliff="urn:oasis:names:tc:xliff:document:1.2">
    <string name="app_name">My App</string>
    <!-- keep in sync with iOS -->
    <string name="expo_splash_screen_resize_mode" translatable="false">contain</string>
    <string name="styled">Hello <b>world</b> &amp; friends</string>
    <string name="pair"><b>a</b><i>b</i></string>
    <string name="placeholder"><xliff:g id="count">%1$s</xliff:g></string>
    <color name="primary">#023c69</color>
    <plurals name="songs">
        <item quantity="one">%d song</item>
        <item quantity="other">%d songs</item>
    </plurals>
</resources>
"#;

    #[test]
    fn test_parse_reads_entries() {
        let doc = ResourceDocument::parse(SAMPLE).unwrap();

        assert_eq!(doc.strings().count(), 5);
        assert_eq!(doc.string_value("app_name").as_deref(), Some("My App"));
        assert_eq!(
            doc.string("expo_splash_screen_resize_mode")
                .unwrap()
                .attribute("translatable"),
            Some("false")
        );
        assert_eq!(doc.root().elements().count(), 7);
        assert_eq!(doc.root().attribute("xmlns:tools"), Some(TOOLS_NAMESPACE));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let doc = ResourceDocument::parse(SAMPLE).unwrap();
        let xml = doc.to_xml().unwrap();

        assert_eq!(xml, SAMPLE);
        assert_eq!(ResourceDocument::parse(&xml).unwrap(), doc);
    }

    #[test]
    fn test_inline_markup_is_preserved() {
        let doc = ResourceDocument::parse(SAMPLE).unwrap();
        let styled = doc.string("styled").unwrap();

        assert_eq!(styled.children.len(), 3);
        assert_eq!(styled.text(), "Hello  & friends");
        let bold = styled.elements().next().unwrap();
        assert_eq!(bold.name, "b");
        assert_eq!(bold.text(), "world");
    }

    #[test]
    fn test_element_only_values_survive_injection() {
        let mut doc = ResourceDocument::parse(
            r#"<resources><string name="pair"><b>a</b><i>b</i></string><string name="placeholder"><xliff:g id="n">%1$s</xliff:g></string></resources>"#,
        )
        .unwrap();
        crate::inject(&mut doc, &crate::StringResourceRequest::new("c", "3")).unwrap();

        let xml = doc.to_xml().unwrap();
        assert!(xml.contains(r#"<string name="pair"><b>a</b><i>b</i></string>"#));
        assert!(xml.contains(
            r#"<string name="placeholder"><xliff:g id="n">%1$s</xliff:g></string>"#
        ));
        assert!(xml.contains("\n    <string name=\"c\">3</string>\n</resources>"));

        let pair = ResourceDocument::parse(&xml).unwrap();
        let pair = pair.string("pair").unwrap();
        assert_eq!(pair.children.len(), 2);
        assert!(pair.elements().all(|el| el.text().len() == 1));
    }

    #[test]
    fn test_whitespace_inside_values_is_not_layout() {
        let xml = "<resources>\n  <string name=\"gap\"><b>a</b> <i>b</i></string>\n</resources>";
        let doc = ResourceDocument::parse(xml).unwrap();

        assert_eq!(doc.string_value("gap").as_deref(), Some(" "));
        assert!(doc
            .to_xml()
            .unwrap()
            .contains(r#"<string name="gap"><b>a</b> <i>b</i></string>"#));
    }

    #[test]
    fn test_reformats_compact_input() {
        let doc = ResourceDocument::parse(
            r#"<resources><string name="a">x</string><string name="b">y</string></resources>"#,
        )
        .unwrap();

        assert_eq!(
            doc.to_xml().unwrap(),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n    <string name=\"a\">x</string>\n    <string name=\"b\">y</string>\n</resources>\n"
        );
    }

    #[test]
    fn test_empty_document() {
        let xml = ResourceDocument::new().to_xml().unwrap();
        assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources/>\n");
        assert_eq!(ResourceDocument::parse(&xml).unwrap().strings().count(), 0);
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let mut doc = ResourceDocument::new();
        doc.root_mut().children.push(Node::Element(
            Element::new("string")
                .with_attribute("name", "quote")
                .with_text("a < b & \"c\""),
        ));

        let xml = doc.to_xml().unwrap();
        assert!(xml.contains("<string name=\"quote\">a &lt; b &amp; \"c\"</string>"));
        assert_eq!(
            ResourceDocument::parse(&xml).unwrap().string_value("quote").as_deref(),
            Some("a < b & \"c\"")
        );
    }

    #[test]
    fn test_whitespace_value_is_kept() {
        let doc =
            ResourceDocument::parse(r#"<resources><string name="space"> </string></resources>"#)
                .unwrap();
        assert_eq!(doc.string_value("space").as_deref(), Some(" "));
    }

    #[test]
    fn test_rejects_wrong_root() {
        let err = ResourceDocument::parse("<manifest/>").unwrap_err();
        assert!(err.to_string().contains("<resources>"));
    }

    #[test]
    fn test_rejects_malformed_xml() {
        assert!(ResourceDocument::parse("<resources><string name=\"a\">x</resources>").is_err());
        assert!(ResourceDocument::parse("").is_err());
    }

    #[test]
    fn test_ensure_namespace_only_once() {
        let mut doc = ResourceDocument::new();
        assert!(doc.ensure_namespace("tools", TOOLS_NAMESPACE));
        assert!(!doc.ensure_namespace("tools", TOOLS_NAMESPACE));
        assert_eq!(doc.root().attributes.len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let doc = ResourceDocument::load(&temp.path().join("strings.xml")).unwrap();
        assert_eq!(doc, ResourceDocument::new());
    }

    #[test]
    fn test_save_creates_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp
            .path()
            .join("android/app/src/main/res/values/strings.xml");

        let doc = ResourceDocument::parse(SAMPLE).unwrap();
        doc.save(&path).unwrap();

        assert_eq!(ResourceDocument::load(&path).unwrap(), doc);
    }
}
