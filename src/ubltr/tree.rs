//! Materialised, namespace-resolved element tree.
//!
//! The whole document is read with quick-xml's namespace-aware reader before
//! any field is looked up. Elements are stored in document (pre-)order and each
//! one records the index of its last descendant, so the descendants of a node
//! are the contiguous range right after it.

use std::borrow::Cow;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::core::EFaturaError;

/// An attribute, keyed by its local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
struct Element {
    namespace: Option<String>,
    local_name: String,
    raw_name: String,
    qualified_name: String,
    attributes: Vec<Attribute>,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
    last_descendant: usize,
}

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    /// Parse a complete document.
    ///
    /// Prefixes without a declaration do not fail the parse; such elements
    /// stay unqualified and keep their raw `prefix:Name`.
    pub fn parse(xml: &str) -> Result<Self, EFaturaError> {
        let mut reader = NsReader::from_str(xml);

        let mut elements: Vec<Element> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();

        loop {
            let step = reader
                .read_resolved_event()
                .map(|(ns, event)| (bound_namespace(ns), event));
            let position = reader.buffer_position() as u64;

            let (namespace, event) = match step {
                Ok(v) => v,
                Err(e) => return Err(EFaturaError::parse(position, e.to_string())),
            };

            match event {
                Event::Start(ref e) => {
                    let id = open_element(&mut elements, &stack, namespace, e, position)?;
                    stack.push(id);
                }
                Event::Empty(ref e) => {
                    open_element(&mut elements, &stack, namespace, e, position)?;
                }
                Event::End(_) => {
                    let Some(id) = stack.pop() else {
                        return Err(EFaturaError::parse(position, "unmatched end tag"));
                    };
                    elements[id].last_descendant = elements.len() - 1;
                }
                Event::Text(ref t) => {
                    if let Some(&current) = stack.last() {
                        let text = t
                            .unescape()
                            .map_err(|e| EFaturaError::parse(position, e.to_string()))?;
                        elements[current].text.push_str(&text);
                    }
                }
                Event::CData(ref c) => {
                    if let Some(&current) = stack.last() {
                        let text = std::str::from_utf8(c).map_err(|e| {
                            EFaturaError::parse(position, format!("CDATA is not UTF-8: {e}"))
                        })?;
                        elements[current].text.push_str(text);
                    }
                }
                Event::Eof => {
                    if let Some(&open) = stack.last() {
                        return Err(EFaturaError::parse(
                            position,
                            format!(
                                "unexpected end of document: <{}> is not closed",
                                elements[open].raw_name
                            ),
                        ));
                    }
                    break;
                }
                _ => {}
            }
        }

        if elements.is_empty() {
            return Err(EFaturaError::parse(0, "document has no root element"));
        }

        tracing::debug!(elements = elements.len(), "parsed XML document");
        Ok(Self { elements })
    }

    /// The document element.
    pub fn root(&self) -> Node<'_> {
        Node { doc: self, id: 0 }
    }

    /// Number of elements in the document.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in document order, the root included.
    pub fn elements(&self) -> impl Iterator<Item = Node<'_>> {
        (0..self.elements.len()).map(move |id| Node { doc: self, id })
    }
}

fn bound_namespace(ns: ResolveResult<'_>) -> Option<String> {
    match ns {
        ResolveResult::Bound(n) => Some(String::from_utf8_lossy(n.as_ref()).into_owned()),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

fn open_element(
    elements: &mut Vec<Element>,
    stack: &[usize],
    namespace: Option<String>,
    start: &BytesStart<'_>,
    position: u64,
) -> Result<usize, EFaturaError> {
    let parent = stack.last().copied();
    if parent.is_none() && !elements.is_empty() {
        return Err(EFaturaError::parse(
            position,
            "content after the document element",
        ));
    }

    let raw_name = utf8(start.name().as_ref()).into_owned();
    let local_name = utf8(start.local_name().as_ref()).into_owned();
    let qualified_name = match &namespace {
        Some(uri) => format!("{{{uri}}}{local_name}"),
        None => raw_name.clone(),
    };

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| EFaturaError::parse(position, e.to_string()))?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| EFaturaError::parse(position, e.to_string()))?;
        attributes.push(Attribute {
            name: utf8(attr.key.local_name().as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }

    let id = elements.len();
    elements.push(Element {
        namespace,
        local_name,
        raw_name,
        qualified_name,
        attributes,
        text: String::new(),
        parent,
        children: Vec::new(),
        last_descendant: id,
    });
    if let Some(parent) = parent {
        elements[parent].children.push(id);
    }
    Ok(id)
}

fn utf8(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// A lightweight handle to one element of a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'d> {
    doc: &'d Document,
    id: usize,
}

impl<'d> Node<'d> {
    fn element(&self) -> &'d Element {
        &self.doc.elements[self.id]
    }

    /// Position of the element in document order (root = 0).
    pub fn index(&self) -> usize {
        self.id
    }

    /// Namespace URI the element resolved to.
    pub fn namespace(&self) -> Option<&'d str> {
        self.element().namespace.as_deref()
    }

    pub fn local_name(&self) -> &'d str {
        &self.element().local_name
    }

    /// The name as written in the source, prefix included.
    pub fn raw_name(&self) -> &'d str {
        &self.element().raw_name
    }

    /// `{uri}local` for namespaced elements, the raw name otherwise.
    pub fn qualified_name(&self) -> &'d str {
        &self.element().qualified_name
    }

    /// True if the element is `local_name` in `namespace`.
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace() == Some(namespace) && self.local_name() == local_name
    }

    /// Direct text content, trimmed. `None` when empty.
    pub fn text(&self) -> Option<&'d str> {
        let text = self.element().text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// Attribute value by local name.
    pub fn attribute(&self, name: &str) -> Option<&'d str> {
        self.element()
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn attributes(&self) -> &'d [Attribute] {
        &self.element().attributes
    }

    pub fn parent(&self) -> Option<Node<'d>> {
        self.element().parent.map(|id| Node { doc: self.doc, id })
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'d>> + 'd {
        let doc = self.doc;
        self.element()
            .children
            .iter()
            .map(move |&id| Node { doc, id })
    }

    /// All descendants in document order, excluding the node itself.
    pub fn descendants(&self) -> impl Iterator<Item = Node<'d>> + 'd {
        let doc = self.doc;
        (self.id + 1..=self.element().last_descendant).map(move |id| Node { doc, id })
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("index", &self.id)
            .field("name", &self.qualified_name())
            .finish()
    }
}
