//! The manuscript value and its fields.
//!
//! A manuscript is a record of named `Node`s. Records and entity lists are
//! `im` persistent collections, so `Manuscript::update` returns a new value
//! that shares every subtree it did not touch.

use im::{OrdMap, Vector};
use manuscript_common::IdGenerator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;

use crate::error::ChangeError;
use crate::path::Path;
use crate::text::TextDocument;

pub type Fields = OrdMap<SmolStr, Node>;

/// One field value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Node {
    /// Plain JSON value (strings, numbers, small objects).
    Scalar(Value),
    /// Rich-text field.
    Text(TextDocument),
    /// Nested named fields.
    Record(Fields),
    /// Ordered entities with stable ids.
    List(Vector<Entity>),
}

impl Node {
    pub fn scalar(value: impl Into<Value>) -> Self {
        Node::Scalar(value.into())
    }

    pub fn text(text: &str) -> Self {
        Node::Text(TextDocument::new(text))
    }

    pub fn list(entities: impl IntoIterator<Item = Entity>) -> Self {
        Node::List(entities.into_iter().collect())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Text(_) => "text",
            Node::Record(_) => "record",
            Node::List(_) => "list",
        }
    }

    pub fn as_text(&self) -> Option<&TextDocument> {
        match self {
            Node::Text(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vector<Entity>> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    /// Structural equality with content comparison for text fields.
    pub fn content_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Scalar(a), Node::Scalar(b)) => a == b,
            (Node::Text(a), Node::Text(b)) => a.content_eq(b),
            (Node::Record(a), Node::Record(b)) => fields_eq(a, b),
            (Node::List(a), Node::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.content_eq(y))
            }
            _ => false,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.content_eq(other)
    }
}

fn fields_eq(a: &Fields, b: &Fields) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|((ka, va), (kb, vb))| ka == kb && va.content_eq(vb))
}

/// A list element: a stable id plus its own fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: SmolStr,
    #[serde(default)]
    pub fields: Fields,
}

impl Entity {
    /// New entity with a freshly generated id.
    pub fn new(ids: &dyn IdGenerator) -> Self {
        Self::with_id(ids.next_id())
    }

    pub fn with_id(id: impl Into<SmolStr>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<SmolStr>, node: Node) -> Self {
        self.fields.insert(name.into(), node);
        self
    }

    /// Equal ids and content-equal fields.
    pub fn content_eq(&self, other: &Entity) -> bool {
        self.id == other.id && fields_eq(&self.fields, &other.fields)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.content_eq(other)
    }
}

/// The whole composite document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manuscript {
    fields: Fields,
}

impl Manuscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<SmolStr>, node: Node) -> Self {
        self.fields.insert(name.into(), node);
        self
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Resolve `path` to the node it names.
    pub fn get(&self, path: &Path) -> Result<&Node, ChangeError> {
        let segments: Vec<&str> = path.segments().collect();
        get_in_fields(path, &self.fields, &segments)
    }

    /// Replace the node at `path`.
    pub fn set(&self, path: &Path, node: Node) -> Result<Manuscript, ChangeError> {
        self.update(path, |_| Ok(node))
    }

    /// Rewrite the node at `path` with `f`, leaving `self` untouched.
    pub fn update<F>(&self, path: &Path, f: F) -> Result<Manuscript, ChangeError>
    where
        F: FnOnce(&Node) -> Result<Node, ChangeError>,
    {
        let segments: Vec<&str> = path.segments().collect();
        let fields = update_fields(path, &self.fields, &segments, f)?;
        Ok(Manuscript { fields })
    }
}

fn unresolved(path: &Path, reason: impl Into<SmolStr>) -> ChangeError {
    ChangeError::PathResolution {
        path: path.as_str().into(),
        reason: reason.into(),
    }
}

fn not_container(path: &Path, node: &Node) -> ChangeError {
    unresolved(path, format!("cannot descend into a {} field", node.kind_name()))
}

fn entity_at<'a>(
    path: &Path,
    items: &'a Vector<Entity>,
    segment: &str,
) -> Result<(usize, &'a Entity), ChangeError> {
    let index: usize = segment
        .parse()
        .map_err(|_| unresolved(path, format!("`{segment}` is not a list index")))?;
    items
        .get(index)
        .map(|entity| (index, entity))
        .ok_or_else(|| unresolved(path, format!("index {index} out of bounds ({})", items.len())))
}

fn get_in_fields<'a>(
    path: &Path,
    fields: &'a Fields,
    segments: &[&str],
) -> Result<&'a Node, ChangeError> {
    let Some((name, rest)) = segments.split_first() else {
        return Err(unresolved(path, "path ends at a list entry"));
    };
    let child = fields
        .get(*name)
        .ok_or_else(|| unresolved(path, format!("no field `{name}`")))?;
    get_in_node(path, child, rest)
}

fn get_in_node<'a>(
    path: &Path,
    node: &'a Node,
    segments: &[&str],
) -> Result<&'a Node, ChangeError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(node);
    };
    match node {
        Node::Record(inner) => get_in_fields(path, inner, segments),
        Node::List(items) => {
            let (_, entity) = entity_at(path, items, segment)?;
            get_in_fields(path, &entity.fields, rest)
        }
        other => Err(not_container(path, other)),
    }
}

fn update_fields<F>(
    path: &Path,
    fields: &Fields,
    segments: &[&str],
    f: F,
) -> Result<Fields, ChangeError>
where
    F: FnOnce(&Node) -> Result<Node, ChangeError>,
{
    let Some((name, rest)) = segments.split_first() else {
        return Err(unresolved(path, "path ends at a list entry"));
    };
    let child = fields
        .get(*name)
        .ok_or_else(|| unresolved(path, format!("no field `{name}`")))?;
    let next = update_node(path, child, rest, f)?;
    Ok(fields.update(SmolStr::new(name), next))
}

fn update_node<F>(path: &Path, node: &Node, segments: &[&str], f: F) -> Result<Node, ChangeError>
where
    F: FnOnce(&Node) -> Result<Node, ChangeError>,
{
    let Some((segment, rest)) = segments.split_first() else {
        return f(node);
    };
    match node {
        Node::Record(inner) => Ok(Node::Record(update_fields(path, inner, segments, f)?)),
        Node::List(items) => {
            let (index, entity) = entity_at(path, items, segment)?;
            let fields = update_fields(path, &entity.fields, rest, f)?;
            let entity = Entity {
                id: entity.id.clone(),
                fields,
            };
            Ok(Node::List(items.update(index, entity)))
        }
        other => Err(not_container(path, other)),
    }
}
