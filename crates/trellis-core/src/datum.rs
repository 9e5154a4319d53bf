//! Tagged data values bound to nodes
//!
//! Nodes carry their bound data as a [`Datum`], a closed set of variants.
//! Typed views over it go through [`Bindable`], which converts by matching on
//! the variant instead of testing runtime types.

use crate::identity::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A data value that can be bound to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Datum {
    /// No value
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned integer above `i64::MAX`; smaller ones are stored as `Int`
    UInt(u64),
    Float(f64),
    Text(String),
    /// Reference to another node
    Node(NodeId),
    List(Vec<Datum>),
    /// Record of named fields, in insertion order
    Map(DatumMap),
}

/// A map of string keys to data values
///
/// Uses IndexMap so records compare and print in a stable order
pub type DatumMap = IndexMap<String, Datum>;

impl Datum {
    /// Check if this datum is null
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Datum::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Unsigned view of an integer datum, `None` when negative
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Datum::Int(i) => u64::try_from(*i).ok(),
            Datum::UInt(u) => Some(*u),
            _ => None,
        }
    }

    /// Try to get this datum as a float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Datum::Float(f) => Some(*f),
            Datum::Int(i) => Some(*i as f64),
            Datum::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Datum::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Datum]> {
        match self {
            Datum::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&DatumMap> {
        match self {
            Datum::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a field of a record datum
    pub fn field(&self, key: &str) -> Option<&Datum> {
        self.as_map().and_then(|map| map.get(key))
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => write!(f, "null"),
            Datum::Bool(b) => write!(f, "{}", b),
            Datum::Int(i) => write!(f, "{}", i),
            Datum::UInt(u) => write!(f, "{}", u),
            Datum::Float(fl) => write!(f, "{}", fl),
            Datum::Text(s) => write!(f, "\"{}\"", s),
            Datum::Node(id) => write!(f, "{}", id),
            Datum::List(list) => {
                write!(f, "[")?;
                for (i, v) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Datum::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A caller type that can be stored as a node's bound datum
///
/// `from_datum` returns `None` when the stored variant does not describe a
/// value of this type. Such nodes never match during a bind.
pub trait Bindable: Clone + PartialEq + fmt::Debug + 'static {
    fn to_datum(&self) -> Datum;
    fn from_datum(datum: &Datum) -> Option<Self>;
}

impl Bindable for Datum {
    fn to_datum(&self) -> Datum {
        self.clone()
    }

    fn from_datum(datum: &Datum) -> Option<Self> {
        Some(datum.clone())
    }
}

impl Bindable for () {
    fn to_datum(&self) -> Datum {
        Datum::Null
    }

    fn from_datum(datum: &Datum) -> Option<Self> {
        datum.is_null().then_some(())
    }
}

impl Bindable for bool {
    fn to_datum(&self) -> Datum {
        Datum::Bool(*self)
    }

    fn from_datum(datum: &Datum) -> Option<Self> {
        datum.as_bool()
    }
}

macro_rules! bindable_int {
    ($($t:ty),*) => {
        $(
            impl Bindable for $t {
                fn to_datum(&self) -> Datum {
                    Datum::Int(*self as i64)
                }

                fn from_datum(datum: &Datum) -> Option<Self> {
                    datum.as_int().and_then(|i| <$t>::try_from(i).ok())
                }
            }
        )*
    };
}

bindable_int!(i32, i64, u32);

macro_rules! bindable_uint {
    ($($t:ty),*) => {
        $(
            impl Bindable for $t {
                fn to_datum(&self) -> Datum {
                    let wide = *self as u64;
                    match i64::try_from(wide) {
                        Ok(i) => Datum::Int(i),
                        Err(_) => Datum::UInt(wide),
                    }
                }

                fn from_datum(datum: &Datum) -> Option<Self> {
                    datum.as_uint().and_then(|u| <$t>::try_from(u).ok())
                }
            }
        )*
    };
}

bindable_uint!(u64, usize);

impl Bindable for f64 {
    fn to_datum(&self) -> Datum {
        Datum::Float(*self)
    }

    fn from_datum(datum: &Datum) -> Option<Self> {
        match datum {
            Datum::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl Bindable for f32 {
    fn to_datum(&self) -> Datum {
        Datum::Float(*self as f64)
    }

    fn from_datum(datum: &Datum) -> Option<Self> {
        match datum {
            Datum::Float(f) => Some(*f as f32),
            _ => None,
        }
    }
}

impl Bindable for String {
    fn to_datum(&self) -> Datum {
        Datum::Text(self.clone())
    }

    fn from_datum(datum: &Datum) -> Option<Self> {
        datum.as_str().map(str::to_string)
    }
}

impl Bindable for NodeId {
    fn to_datum(&self) -> Datum {
        Datum::Node(*self)
    }

    fn from_datum(datum: &Datum) -> Option<Self> {
        datum.as_node()
    }
}

impl<T: Bindable> Bindable for Vec<T> {
    fn to_datum(&self) -> Datum {
        Datum::List(self.iter().map(Bindable::to_datum).collect())
    }

    fn from_datum(datum: &Datum) -> Option<Self> {
        datum.as_list()?.iter().map(T::from_datum).collect()
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Bool(b)
    }
}

impl From<i64> for Datum {
    fn from(i: i64) -> Self {
        Datum::Int(i)
    }
}

impl From<i32> for Datum {
    fn from(i: i32) -> Self {
        Datum::Int(i as i64)
    }
}

impl From<u64> for Datum {
    fn from(u: u64) -> Self {
        u.to_datum()
    }
}

impl From<f64> for Datum {
    fn from(f: f64) -> Self {
        Datum::Float(f)
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::Text(s)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Text(s.to_string())
    }
}

impl From<NodeId> for Datum {
    fn from(id: NodeId) -> Self {
        Datum::Node(id)
    }
}

impl<T: Into<Datum>> From<Vec<T>> for Datum {
    fn from(vec: Vec<T>) -> Self {
        Datum::List(vec.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datum_accessors() {
        assert!(Datum::Null.is_null());
        assert_eq!(Datum::Bool(true).as_bool(), Some(true));
        assert_eq!(Datum::Int(42).as_int(), Some(42));
        assert_eq!(Datum::Int(42).as_float(), Some(42.0));
        assert_eq!(Datum::Text("row".into()).as_str(), Some("row"));
        assert_eq!(Datum::Node(NodeId(4)).as_node(), Some(NodeId(4)));
    }

    #[test]
    fn test_bindable_dispatches_on_variant() {
        assert_eq!(i64::from_datum(&Datum::Int(7)), Some(7));
        assert_eq!(i64::from_datum(&Datum::Text("7".into())), None);
        assert_eq!(u32::from_datum(&Datum::Int(-1)), None);
        assert_eq!(f64::from_datum(&Datum::Int(1)), None);
        assert_eq!(String::from_datum(&Datum::Text("a".into())), Some("a".to_string()));
        assert_eq!(<()>::from_datum(&Datum::Null), Some(()));
    }

    #[test]
    fn test_large_unsigned_keeps_its_value() {
        let datum = u64::MAX.to_datum();
        assert_eq!(datum, Datum::UInt(u64::MAX));
        assert_eq!(u64::from_datum(&datum), Some(u64::MAX));
        assert_eq!(i64::from_datum(&datum), None);
        assert_eq!(datum.to_string(), u64::MAX.to_string());

        // Values that fit share the signed representation
        assert_eq!(7u64.to_datum(), Datum::Int(7));
        assert_eq!(usize::from_datum(&Datum::Int(7)), Some(7));
        assert_eq!(u64::from_datum(&Datum::Int(-1)), None);
    }

    #[test]
    fn test_bindable_list() {
        let values = vec![1i64, 2, 3];
        let datum = values.to_datum();
        assert_eq!(datum, Datum::from(vec![1i64, 2, 3]));
        assert_eq!(Vec::<i64>::from_datum(&datum), Some(values));

        let mixed = Datum::List(vec![Datum::Int(1), Datum::Bool(false)]);
        assert_eq!(Vec::<i64>::from_datum(&mixed), None);
    }

    #[test]
    fn test_record_field() {
        let mut map = DatumMap::new();
        map.insert("title".into(), "Write docs".into());
        map.insert("done".into(), false.into());
        let record = Datum::Map(map);

        assert_eq!(record.field("title").and_then(Datum::as_str), Some("Write docs"));
        assert_eq!(record.field("missing"), None);
        assert_eq!(record.to_string(), "{title: \"Write docs\", done: false}");
    }
}
