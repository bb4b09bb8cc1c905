use crate::error::StoreError;
use crate::node::{Literal, Node};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    Int,
    Float,
    Bool,
    String,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 4] = [
        ScalarKind::Int,
        ScalarKind::Float,
        ScalarKind::Bool,
        ScalarKind::String,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "int" => Some(ScalarKind::Int),
            "float" => Some(ScalarKind::Float),
            "bool" => Some(ScalarKind::Bool),
            "string" => Some(ScalarKind::String),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalarKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarKind::from_tag(s)
            .ok_or_else(|| StoreError::decode(format!("unknown kind tag '{}'", s)))
    }
}

#[derive(Debug, Clone)]
pub enum ScalarValue {
    Int(i32),
    Float(f64),
    Bool(bool),
    String(String),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::Int(_) => ScalarKind::Int,
            ScalarValue::Float(_) => ScalarKind::Float,
            ScalarValue::Bool(_) => ScalarKind::Bool,
            ScalarValue::String(_) => ScalarKind::String,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            ScalarValue::Float(f) => f.is_finite(),
            _ => true,
        }
    }

    pub fn to_literal(&self) -> Literal {
        match self {
            ScalarValue::Int(i) => Literal::Number(f64::from(*i)),
            ScalarValue::Float(f) => Literal::Number(*f),
            ScalarValue::Bool(b) => Literal::Bool(*b),
            ScalarValue::String(s) => Literal::Str(s.clone()),
        }
    }

    /// Reads a literal as the given kind. Numbers tagged `int` must be
    /// integral and fit in an `i32`.
    pub fn from_literal(lit: &Literal, kind: ScalarKind) -> Result<Self, StoreError> {
        match (kind, lit) {
            (ScalarKind::Int, Literal::Number(n)) => {
                if n.fract() != 0.0 || *n < f64::from(i32::MIN) || *n > f64::from(i32::MAX) {
                    return Err(StoreError::decode(format!("{} is not a valid int", n)));
                }
                Ok(ScalarValue::Int(*n as i32))
            }
            (ScalarKind::Float, Literal::Number(n)) => Ok(ScalarValue::Float(*n)),
            (ScalarKind::Bool, Literal::Bool(b)) => Ok(ScalarValue::Bool(*b)),
            (ScalarKind::String, Literal::Str(s)) => Ok(ScalarValue::String(s.clone())),
            (kind, lit) => Err(StoreError::decode(format!(
                "expected {} value, found {}",
                kind,
                lit.describe()
            ))),
        }
    }

    pub fn parse_as(text: &str, kind: ScalarKind) -> Result<Self, StoreError> {
        let bad = || StoreError::syntax(format!("'{}' is not a valid {}", text, kind));
        match kind {
            ScalarKind::Int => text.trim().parse().map(ScalarValue::Int).map_err(|_| bad()),
            ScalarKind::Float => match text.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(ScalarValue::Float(f)),
                _ => Err(bad()),
            },
            ScalarKind::Bool => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(ScalarValue::Bool(true)),
                "false" => Ok(ScalarValue::Bool(false)),
                _ => Err(bad()),
            },
            ScalarKind::String => Ok(ScalarValue::String(text.to_string())),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ScalarValue::Int(_) => 0,
            ScalarValue::Float(_) => 1,
            ScalarValue::Bool(_) => 2,
            ScalarValue::String(_) => 3,
        }
    }
}

// Floats compare with `total_cmp` so scalar values can key a BTreeMap.
impl Ord for ScalarValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ScalarValue::Int(a), ScalarValue::Int(b)) => a.cmp(b),
            (ScalarValue::Float(a), ScalarValue::Float(b)) => a.total_cmp(b),
            (ScalarValue::Bool(a), ScalarValue::Bool(b)) => a.cmp(b),
            (ScalarValue::String(a), ScalarValue::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            ScalarValue::Int(i) => i.hash(state),
            ScalarValue::Float(f) => f.to_bits().hash(state),
            ScalarValue::Bool(b) => b.hash(state),
            ScalarValue::String(s) => s.hash(state),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Int(i) => write!(f, "{}", i),
            ScalarValue::Float(x) => write!(f, "{}", x),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

fn check_kind(expected: ScalarKind, value: &ScalarValue) -> Result<(), StoreError> {
    if value.kind() != expected {
        return Err(StoreError::KindMismatch {
            expected,
            found: value.kind(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarList {
    kind: ScalarKind,
    items: Vec<ScalarValue>,
}

impl ScalarList {
    pub fn new(kind: ScalarKind, items: Vec<ScalarValue>) -> Result<Self, StoreError> {
        for item in &items {
            check_kind(kind, item)?;
        }
        Ok(Self { kind, items })
    }

    pub fn empty(kind: ScalarKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn items(&self) -> &[ScalarValue] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, value: ScalarValue) -> Result<(), StoreError> {
        check_kind(self.kind, &value)?;
        self.items.push(value);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarMap {
    key_kind: ScalarKind,
    value_kind: ScalarKind,
    entries: BTreeMap<ScalarValue, ScalarValue>,
}

impl ScalarMap {
    pub fn new<I>(key_kind: ScalarKind, value_kind: ScalarKind, entries: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = (ScalarValue, ScalarValue)>,
    {
        let mut map = Self::empty(key_kind, value_kind);
        for (key, value) in entries {
            map.insert(key, value)?;
        }
        Ok(map)
    }

    pub fn empty(key_kind: ScalarKind, value_kind: ScalarKind) -> Self {
        Self {
            key_kind,
            value_kind,
            entries: BTreeMap::new(),
        }
    }

    pub fn key_kind(&self) -> ScalarKind {
        self.key_kind
    }

    pub fn value_kind(&self) -> ScalarKind {
        self.value_kind
    }

    pub fn entries(&self) -> &BTreeMap<ScalarValue, ScalarValue> {
        &self.entries
    }

    pub fn get(&self, key: &ScalarValue) -> Option<&ScalarValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(
        &mut self,
        key: ScalarValue,
        value: ScalarValue,
    ) -> Result<Option<ScalarValue>, StoreError> {
        check_kind(self.key_kind, &key)?;
        check_kind(self.value_kind, &value)?;
        Ok(self.entries.insert(key, value))
    }

    pub fn remove(&mut self, key: &ScalarValue) -> Option<ScalarValue> {
        self.entries.remove(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Scalar(ScalarValue),
    List(ScalarList),
    Map(ScalarMap),
}

impl TypedValue {
    pub fn is_finite(&self) -> bool {
        match self {
            TypedValue::Scalar(v) => v.is_finite(),
            TypedValue::List(list) => list.items.iter().all(ScalarValue::is_finite),
            TypedValue::Map(map) => map
                .entries
                .iter()
                .all(|(k, v)| k.is_finite() && v.is_finite()),
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            TypedValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ScalarList> {
        match self {
            TypedValue::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ScalarMap> {
        match self {
            TypedValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn encode(&self) -> Node {
        match self {
            TypedValue::Scalar(v) => Node::Array(vec![
                Node::string(v.kind().as_str()),
                Node::Scalar(v.to_literal()),
            ]),
            TypedValue::List(list) => {
                let mut out = Vec::with_capacity(list.items.len() + 1);
                out.push(Node::Array(vec![Node::string(list.kind.as_str())]));
                out.extend(list.items.iter().map(|v| Node::Scalar(v.to_literal())));
                Node::Array(out)
            }
            TypedValue::Map(map) => {
                let mut tag = BTreeMap::new();
                tag.insert(
                    map.key_kind.as_str().to_string(),
                    Node::string(map.value_kind.as_str()),
                );
                let mut out = Vec::with_capacity(map.entries.len() + 1);
                out.push(Node::Object(tag));
                out.extend(map.entries.iter().map(|(k, v)| {
                    Node::Array(vec![Node::Scalar(k.to_literal()), Node::Scalar(v.to_literal())])
                }));
                Node::Array(out)
            }
        }
    }

    pub fn decode(node: &Node) -> Result<Self, StoreError> {
        let items = node.as_array().ok_or_else(|| {
            StoreError::decode(format!(
                "leaf must be an array, found {}",
                node.shape().describe()
            ))
        })?;
        let (head, payload) = items
            .split_first()
            .ok_or_else(|| StoreError::decode("leaf array is missing its type tag"))?;

        match head {
            Node::Scalar(Literal::Str(tag)) => {
                let kind = kind_from_tag(tag)?;
                if payload.len() != 1 {
                    return Err(StoreError::decode(format!(
                        "{} leaf expects exactly one value, found {}",
                        kind,
                        payload.len()
                    )));
                }
                Ok(TypedValue::Scalar(scalar_payload(&payload[0], kind)?))
            }
            Node::Array(tags) => {
                let kind = match tags.as_slice() {
                    [Node::Scalar(Literal::Str(tag))] => kind_from_tag(tag)?,
                    _ => {
                        return Err(StoreError::decode(
                            "list tag must hold exactly one kind name",
                        ));
                    }
                };
                let items = payload
                    .iter()
                    .map(|item| scalar_payload(item, kind))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypedValue::List(ScalarList { kind, items }))
            }
            Node::Object(tags) => {
                let mut tag_entries = tags.iter();
                let (key_tag, value_tag) = match (tag_entries.next(), tag_entries.next()) {
                    (Some(entry), None) => entry,
                    _ => {
                        return Err(StoreError::decode(
                            "map tag must hold exactly one key:value kind pair",
                        ));
                    }
                };
                let key_kind = kind_from_tag(key_tag)?;
                let value_kind = kind_from_tag(value_tag.as_str().ok_or_else(|| {
                    StoreError::decode("map value kind must be a string")
                })?)?;

                let mut map = ScalarMap::empty(key_kind, value_kind);
                for pair in payload {
                    let (key, value) = match pair.as_array() {
                        Some([key, value]) => (
                            scalar_payload(key, key_kind)?,
                            scalar_payload(value, value_kind)?,
                        ),
                        _ => {
                            return Err(StoreError::decode(
                                "map entry must be a [key, value] array",
                            ));
                        }
                    };
                    if map.entries.insert(key.clone(), value).is_some() {
                        return Err(StoreError::decode(format!("duplicate map key {}", key)));
                    }
                }
                Ok(TypedValue::Map(map))
            }
            Node::Scalar(other) => Err(StoreError::decode(format!(
                "leaf type tag cannot be a {}",
                other.describe()
            ))),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Scalar(v) => write!(f, "{} {}", v.kind(), v),
            TypedValue::List(list) => {
                write!(f, "list<{}> [", list.kind)?;
                for (i, item) in list.items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            TypedValue::Map(map) => {
                write!(f, "map<{}, {}> {{", map.key_kind, map.value_kind)?;
                for (i, (k, v)) in map.entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn kind_from_tag(tag: &str) -> Result<ScalarKind, StoreError> {
    ScalarKind::from_tag(tag)
        .ok_or_else(|| StoreError::decode(format!("unknown type tag '{}'", tag)))
}

fn scalar_payload(node: &Node, kind: ScalarKind) -> Result<ScalarValue, StoreError> {
    let lit = node.as_literal().ok_or_else(|| {
        StoreError::decode(format!(
            "expected {} value, found {}",
            kind,
            node.shape().describe()
        ))
    })?;
    ScalarValue::from_literal(lit, kind)
}

pub trait ScalarType: Sized {
    const KIND: ScalarKind;

    fn into_scalar(self) -> ScalarValue;

    fn from_scalar(value: &ScalarValue) -> Option<Self>;
}

pub trait FromTyped: Sized {
    fn from_typed(value: &TypedValue) -> Option<Self>;
}

impl ScalarType for i32 {
    const KIND: ScalarKind = ScalarKind::Int;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Int(self)
    }

    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl ScalarType for f64 {
    const KIND: ScalarKind = ScalarKind::Float;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Float(self)
    }

    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl ScalarType for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Bool(self)
    }

    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl ScalarType for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::String(self)
    }

    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl From<i32> for TypedValue {
    fn from(value: i32) -> Self {
        TypedValue::Scalar(value.into_scalar())
    }
}

impl From<f64> for TypedValue {
    fn from(value: f64) -> Self {
        TypedValue::Scalar(value.into_scalar())
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::Scalar(value.into_scalar())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::Scalar(value.into_scalar())
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::Scalar(ScalarValue::String(value.to_string()))
    }
}

impl From<ScalarValue> for TypedValue {
    fn from(value: ScalarValue) -> Self {
        TypedValue::Scalar(value)
    }
}

impl From<ScalarList> for TypedValue {
    fn from(list: ScalarList) -> Self {
        TypedValue::List(list)
    }
}

impl From<ScalarMap> for TypedValue {
    fn from(map: ScalarMap) -> Self {
        TypedValue::Map(map)
    }
}

impl<T: ScalarType> From<Vec<T>> for TypedValue {
    fn from(items: Vec<T>) -> Self {
        TypedValue::List(ScalarList {
            kind: T::KIND,
            items: items.into_iter().map(ScalarType::into_scalar).collect(),
        })
    }
}

impl<K: ScalarType, V: ScalarType> From<BTreeMap<K, V>> for TypedValue {
    fn from(entries: BTreeMap<K, V>) -> Self {
        TypedValue::Map(ScalarMap {
            key_kind: K::KIND,
            value_kind: V::KIND,
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into_scalar(), v.into_scalar()))
                .collect(),
        })
    }
}

impl<K: ScalarType, V: ScalarType> From<HashMap<K, V>> for TypedValue {
    fn from(entries: HashMap<K, V>) -> Self {
        TypedValue::Map(ScalarMap {
            key_kind: K::KIND,
            value_kind: V::KIND,
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into_scalar(), v.into_scalar()))
                .collect(),
        })
    }
}

impl FromTyped for i32 {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        value.as_scalar().and_then(Self::from_scalar)
    }
}

impl FromTyped for f64 {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        value.as_scalar().and_then(Self::from_scalar)
    }
}

impl FromTyped for bool {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        value.as_scalar().and_then(Self::from_scalar)
    }
}

impl FromTyped for String {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        value.as_scalar().and_then(Self::from_scalar)
    }
}

impl FromTyped for TypedValue {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromTyped for ScalarValue {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        value.as_scalar().cloned()
    }
}

impl<T: ScalarType> FromTyped for Vec<T> {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        let list = value.as_list()?;
        if list.kind != T::KIND {
            return None;
        }
        list.items.iter().map(T::from_scalar).collect()
    }
}

impl<K: ScalarType + Ord, V: ScalarType> FromTyped for BTreeMap<K, V> {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        let map = value.as_map()?;
        if map.key_kind != K::KIND || map.value_kind != V::KIND {
            return None;
        }
        map.entries
            .iter()
            .map(|(k, v)| Some((K::from_scalar(k)?, V::from_scalar(v)?)))
            .collect()
    }
}

impl<K: ScalarType + Eq + Hash, V: ScalarType> FromTyped for HashMap<K, V> {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        let map = value.as_map()?;
        if map.key_kind != K::KIND || map.value_kind != V::KIND {
            return None;
        }
        map.entries
            .iter()
            .map(|(k, v)| Some((K::from_scalar(k)?, V::from_scalar(v)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_keys_order_totally() {
        let mut a = vec![
            ScalarValue::Float(2.5),
            ScalarValue::Float(-1.0),
            ScalarValue::Float(0.0),
        ];
        a.sort();
        assert_eq!(
            a,
            vec![
                ScalarValue::Float(-1.0),
                ScalarValue::Float(0.0),
                ScalarValue::Float(2.5)
            ]
        );
    }

    #[test]
    fn int_payload_must_be_integral() {
        assert!(ScalarValue::from_literal(&Literal::Number(2.5), ScalarKind::Int).is_err());
        assert!(ScalarValue::from_literal(&Literal::Number(3e10), ScalarKind::Int).is_err());
        assert_eq!(
            ScalarValue::from_literal(&Literal::Number(-4.0), ScalarKind::Int).unwrap(),
            ScalarValue::Int(-4)
        );
    }

    #[test]
    fn parse_as_reads_user_text() {
        assert_eq!(
            ScalarValue::parse_as(" 42 ", ScalarKind::Int).unwrap(),
            ScalarValue::Int(42)
        );
        assert_eq!(
            ScalarValue::parse_as("TRUE", ScalarKind::Bool).unwrap(),
            ScalarValue::Bool(true)
        );
        assert!(ScalarValue::parse_as("4.5", ScalarKind::Int).is_err());
        assert!(ScalarValue::parse_as("nan", ScalarKind::Float).is_err());
    }
}
