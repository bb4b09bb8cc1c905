use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Array(Vec<Node>),
    Object(BTreeMap<String, Node>),
    Scalar(Literal),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Number(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Array,
    Object,
    Scalar,
}

impl Node {
    pub fn empty_object() -> Self {
        Node::Object(BTreeMap::new())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Node::Scalar(Literal::Str(s.into()))
    }

    pub fn number(n: f64) -> Self {
        Node::Scalar(Literal::Number(n))
    }

    pub fn boolean(b: bool) -> Self {
        Node::Scalar(Literal::Bool(b))
    }

    pub fn shape(&self) -> NodeShape {
        match self {
            Node::Array(_) => NodeShape::Array,
            Node::Object(_) => NodeShape::Object,
            Node::Scalar(_) => NodeShape::Scalar,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Scalar(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Literal::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Number of nested containers; a scalar is 0.
    pub fn depth(&self) -> usize {
        match self {
            Node::Array(items) => 1 + items.iter().map(Node::depth).max().unwrap_or(0),
            Node::Object(entries) => 1 + entries.values().map(Node::depth).max().unwrap_or(0),
            Node::Scalar(_) => 0,
        }
    }
}

impl Literal {
    pub fn describe(&self) -> &'static str {
        match self {
            Literal::Bool(_) => "bool",
            Literal::Number(_) => "number",
            Literal::Str(_) => "string",
        }
    }
}

impl NodeShape {
    pub fn describe(&self) -> &'static str {
        match self {
            NodeShape::Array => "array",
            NodeShape::Object => "object",
            NodeShape::Scalar => "scalar",
        }
    }
}

impl From<Literal> for Node {
    fn from(lit: Literal) -> Self {
        Node::Scalar(lit)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(items)
    }
}

impl From<BTreeMap<String, Node>> for Node {
    fn from(entries: BTreeMap<String, Node>) -> Self {
        Node::Object(entries)
    }
}
