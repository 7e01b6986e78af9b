use std::{fmt, rc::Rc};

use indexmap::IndexMap;
use rust_decimal::{Decimal, prelude::ToPrimitive};

/// A finalized query document, ready to hand to a search client.
///
/// Object keys keep their insertion order, so two identical call sequences
/// always produce byte-identical documents.
pub type Document = serde_json::Value;

/// Ordered mapping used for clause storage while a query is being built.
pub type Object = IndexMap<String, Value>;

/// Anything that can produce its own canonical form.
///
/// Implemented by the accumulators (fields, aggregations) that are stored in
/// a builder before they are finalized. The canonicalizer calls
/// [`ToDocument::to_document`] and keeps normalizing whatever comes back.
pub trait ToDocument: fmt::Debug {
    fn to_document(&self) -> Value;
}

/// A build-time value used throughout the query builder.
///
/// Mirrors the document shapes (null, booleans, numbers, strings, arrays and
/// objects) and adds [`Value::Deferred`] for buildable objects whose output is
/// only produced when the enclosing builder is finalized.
///
/// # Examples
///
/// ```
/// use search_dsl::Value;
///
/// let term = Value::from("kimchi");
/// let bound = Value::from(42);
/// let values = Value::from(vec!["a", "b"]);
///
/// assert!(matches!(term, Value::String(_)));
/// assert!(matches!(bound, Value::Integer(42)));
/// assert!(matches!(values, Value::Array(ref items) if items.len() == 2));
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Unsigned integer above `i64::MAX`
    Unsigned(u64),

    /// UTF-8 string
    String(String),

    /// Ordered sequence of values
    Array(Vec<Value>),

    /// Ordered mapping with unique keys
    Object(Object),

    /// Buildable object, resolved by the canonicalizer
    Deferred(Rc<dyn ToDocument>),
}

impl Value {
    /// An empty object.
    pub fn object() -> Self {
        Value::Object(Object::new())
    }

    /// Single-entry object `{key: value}`.
    pub fn pair(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = Object::new();
        map.insert(key.into(), value.into());
        Value::Object(map)
    }

    /// Wrap a buildable object so it is finalized together with its parent.
    pub fn deferred<T: ToDocument + 'static>(item: T) -> Self {
        Value::Deferred(Rc::new(item))
    }

    /// Truthiness in the option-flag sense: absent, null and `false` are off.
    pub fn is_set(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce this slot into an object, replacing anything else.
    pub(crate) fn make_object(&mut self) -> &mut Object {
        if !matches!(self, Value::Object(_)) {
            *self = Value::object();
        }
        match self {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    /// Coerce this slot into an array, replacing anything else.
    pub(crate) fn make_array(&mut self) -> &mut Vec<Value> {
        if !matches!(self, Value::Array(_)) {
            *self = Value::Array(Vec::new());
        }
        match self {
            Value::Array(items) => items,
            _ => unreachable!(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::Unsigned(n),
        }
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::from(n as u64)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

/// Whole decimals stay integers, everything else becomes a float.
impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        if d.fract().is_zero() {
            if let Some(n) = d.to_i64() {
                return Value::Integer(n);
            }
        }
        d.to_f64().map(Value::Float).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<Object> for Value {
    fn from(map: Object) -> Self {
        Value::Object(map)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        match v {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Boolean(b),
            Document::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::Integer(i),
                (None, Some(u)) => Value::Unsigned(u),
                _ => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            Document::String(s) => Value::String(s),
            Document::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            Document::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
