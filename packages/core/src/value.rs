//! The Value type - a node in a dynamically-typed object graph.
//!
//! Structs, maps and slices are plain values: copying one copies its
//! contents. Pointers are the only aliasing construct; they share their
//! target through a [`Shared`] cell, so a copy of a pointer (for example one
//! read out of a map) still reaches the same target.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::{Error, Kind, StructType, Type};

/// A shared, mutable slot. Pointer targets and graph roots live in these.
pub type Shared = Rc<RefCell<Value>>;

/// A map key. Only comparable scalars can key a map.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    /// Boolean key.
    Bool(bool),
    /// Integer key.
    Int(i64),
    /// String key.
    String(String),
}

impl MapKey {
    pub fn ty(&self) -> Type {
        match self {
            MapKey::Bool(_) => Type::Bool,
            MapKey::Int(_) => Type::Int,
            MapKey::String(_) => Type::String,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Bool(b) => Value::Bool(*b),
            MapKey::Int(i) => Value::Int(*i),
            MapKey::String(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(b) => write!(f, "{}", b),
            MapKey::Int(i) => write!(f, "{}", i),
            MapKey::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        MapKey::String(s.to_string())
    }
}

impl From<String> for MapKey {
    fn from(s: String) -> Self {
        MapKey::String(s)
    }
}

impl From<i64> for MapKey {
    fn from(i: i64) -> Self {
        MapKey::Int(i)
    }
}

impl From<bool> for MapKey {
    fn from(b: bool) -> Self {
        MapKey::Bool(b)
    }
}

impl TryFrom<Value> for MapKey {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Error> {
        match value.unboxed() {
            Value::Bool(b) => Ok(MapKey::Bool(b)),
            Value::Int(i) => Ok(MapKey::Int(i)),
            Value::String(s) => Ok(MapKey::String(s)),
            other => Err(Error::InvalidKey {
                key: other.type_of(),
            }),
        }
    }
}

/// A value in the object graph.
///
/// Every variant carries enough type information to report its own
/// [`Type`], including nil maps, slices and pointers. A `None` payload is
/// the nil value of that kind.
#[derive(Clone, Debug)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Field values, in the order of `ty.fields()`.
    Struct {
        ty: Rc<StructType>,
        fields: Vec<Value>,
    },
    /// Entries ordered by key; `None` is the nil map.
    Map {
        key: Type,
        elem: Type,
        entries: Option<BTreeMap<MapKey, Value>>,
    },
    /// Ordered elements; `None` is the nil slice.
    Slice {
        elem: Type,
        items: Option<Vec<Value>>,
    },
    /// A reference to a shared target of type `target`; `None` is nil.
    Pointer {
        target: Type,
        cell: Option<Shared>,
    },
    /// A value boxed in the "any" interface.
    Interface(Option<Box<Value>>),
}

impl Value {
    /// Build a struct value, starting from the zero value and assigning the
    /// given fields.
    ///
    /// # Panics
    ///
    /// Panics if a field doesn't exist or a value isn't assignable to it.
    pub fn structure<'a>(
        ty: &Rc<StructType>,
        fields: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Value {
        let mut values: Vec<Value> = ty.fields().iter().map(|f| f.ty.zero_value()).collect();
        for (name, value) in fields {
            let index = ty
                .field_index(name)
                .unwrap_or_else(|| panic!("struct {} has no field {:?}", ty.name(), name));
            values[index] = value
                .assign_to(&ty.fields()[index].ty)
                .unwrap_or_else(|e| panic!("{}", e));
        }
        Value::Struct {
            ty: Rc::clone(ty),
            fields: values,
        }
    }

    /// An empty, non-nil map.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not a comparable scalar type.
    pub fn empty_map(key: Type, elem: Type) -> Value {
        Value::map_of(key, elem, Vec::<(MapKey, Value)>::new())
    }

    /// A non-nil map holding `entries`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not a comparable scalar type, or if a key or value
    /// doesn't fit the declared types.
    pub fn map_of<K: Into<MapKey>>(
        key: Type,
        elem: Type,
        entries: impl IntoIterator<Item = (K, Value)>,
    ) -> Value {
        assert!(
            key.kind().is_comparable_key(),
            "invalid map key type {}",
            key
        );
        let mut map = BTreeMap::new();
        for (k, v) in entries {
            let k = k.into();
            assert!(k.ty() == key, "map key {} is not of type {}", k, key);
            map.insert(k, v.assign_to(&elem).unwrap_or_else(|e| panic!("{}", e)));
        }
        Value::Map {
            key,
            elem,
            entries: Some(map),
        }
    }

    /// A non-nil slice holding `items`.
    ///
    /// # Panics
    ///
    /// Panics if an item isn't assignable to `elem`.
    pub fn slice_of(elem: Type, items: impl IntoIterator<Item = Value>) -> Value {
        let items = items
            .into_iter()
            .map(|v| v.assign_to(&elem).unwrap_or_else(|e| panic!("{}", e)))
            .collect();
        Value::Slice {
            elem,
            items: Some(items),
        }
    }

    /// A pointer to a freshly allocated copy of `value`.
    pub fn pointer_to(value: Value) -> Value {
        Value::Pointer {
            target: value.type_of(),
            cell: Some(value.into_shared()),
        }
    }

    /// Box `value` in the "any" interface. Already boxed values are returned
    /// as they are.
    pub fn boxed(value: Value) -> Value {
        match value {
            Value::Interface(_) => value,
            other => Value::Interface(Some(Box::new(other))),
        }
    }

    /// Move this value into a new shared slot, e.g. to serve as a graph root.
    pub fn into_shared(self) -> Shared {
        Rc::new(RefCell::new(self))
    }

    /// The type of the slot this value occupies.
    ///
    /// Interface values report [`Type::Interface`], not the type of their
    /// content.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::String(_) => Type::String,
            Value::Struct { ty, .. } => Type::Struct(Rc::clone(ty)),
            Value::Map { key, elem, .. } => Type::Map {
                key: Box::new(key.clone()),
                elem: Box::new(elem.clone()),
            },
            Value::Slice { elem, .. } => Type::Slice(Box::new(elem.clone())),
            Value::Pointer { target, .. } => Type::Pointer(Box::new(target.clone())),
            Value::Interface(_) => Type::Interface,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::Struct { .. } => Kind::Struct,
            Value::Map { .. } => Kind::Map,
            Value::Slice { .. } => Kind::Slice,
            Value::Pointer { .. } => Kind::Pointer,
            Value::Interface(_) => Kind::Interface,
        }
    }

    /// Whether this value is nil, or `None` if its kind can't be nil.
    pub fn is_nil(&self) -> Option<bool> {
        match self {
            Value::Map { entries, .. } => Some(entries.is_none()),
            Value::Slice { items, .. } => Some(items.is_none()),
            Value::Pointer { cell, .. } => Some(cell.is_none()),
            Value::Interface(inner) => Some(inner.is_none()),
            _ => None,
        }
    }

    /// The length of a map, slice or string (in bytes), or `None` for other
    /// kinds. Nil maps and slices have length zero.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Map { entries, .. } => Some(entries.as_ref().map_or(0, BTreeMap::len)),
            Value::Slice { items, .. } => Some(items.as_ref().map_or(0, Vec::len)),
            Value::String(s) => Some(s.len()),
            _ => None,
        }
    }

    /// Whether a map, slice or string has length zero, or `None` for other
    /// kinds.
    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }

    /// Convert this value for storage in a slot of type `target`.
    ///
    /// Values of the target type pass through unchanged; anything stored in
    /// an interface slot gets boxed.
    pub fn assign_to(self, target: &Type) -> Result<Value, Error> {
        let ty = self.type_of();
        if ty == *target {
            Ok(self)
        } else if ty.is_assignable_to(target) {
            Ok(Value::boxed(self))
        } else {
            Err(Error::NotAssignable {
                value: ty,
                target: target.clone(),
            })
        }
    }

    /// Strip one interface box, if present. A nil interface stays as it is.
    pub fn unboxed(self) -> Value {
        match self {
            Value::Interface(Some(inner)) => *inner,
            other => other,
        }
    }

    /// A struct field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct { ty, fields } => ty.field_index(name).map(|i| &fields[i]),
            _ => None,
        }
    }

    /// A map entry by key. Nil maps have no entries.
    pub fn get(&self, key: &MapKey) -> Option<&Value> {
        match self {
            Value::Map {
                entries: Some(entries),
                ..
            } => entries.get(key),
            _ => None,
        }
    }

    /// A slice element by index.
    pub fn item(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Slice {
                items: Some(items), ..
            } => items.get(index),
            _ => None,
        }
    }

    /// A copy of the value a non-nil pointer targets.
    pub fn pointee(&self) -> Option<Value> {
        match self {
            Value::Pointer {
                cell: Some(cell), ..
            } => Some(cell.borrow().clone()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, top: bool) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Struct { fields, .. } => {
                f.write_str("{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    field.fmt_nested(f, false)?;
                }
                f.write_str("}")
            }
            Value::Map { entries, .. } => {
                f.write_str("map[")?;
                for (i, (k, v)) in entries.iter().flatten().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:", k)?;
                    v.fmt_nested(f, false)?;
                }
                f.write_str("]")
            }
            Value::Slice { items, .. } => {
                f.write_str("[")?;
                for (i, item) in items.iter().flatten().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    item.fmt_nested(f, false)?;
                }
                f.write_str("]")
            }
            Value::Pointer { cell: None, .. } | Value::Interface(None) => f.write_str("<nil>"),
            // Only the outermost pointer is followed, so cyclic graphs still print.
            Value::Pointer {
                cell: Some(cell), ..
            } if top => match cell.try_borrow() {
                Ok(target) => {
                    f.write_str("&")?;
                    target.fmt_nested(f, false)
                }
                Err(_) => write!(f, "{:p}", Rc::as_ptr(cell)),
            },
            Value::Pointer {
                cell: Some(cell), ..
            } => write!(f, "{:p}", Rc::as_ptr(cell)),
            Value::Interface(Some(inner)) => inner.fmt_nested(f, top),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality, except that non-nil pointers are equal only when
    /// they share a target.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (
                Value::Struct { ty: ta, fields: fa },
                Value::Struct { ty: tb, fields: fb },
            ) => ta == tb && fa == fb,
            (
                Value::Map {
                    key: ka,
                    elem: ea,
                    entries: a,
                },
                Value::Map {
                    key: kb,
                    elem: eb,
                    entries: b,
                },
            ) => ka == kb && ea == eb && a == b,
            (
                Value::Slice { elem: ea, items: a },
                Value::Slice { elem: eb, items: b },
            ) => ea == eb && a == b,
            (
                Value::Pointer {
                    target: ta,
                    cell: a,
                },
                Value::Pointer {
                    target: tb,
                    cell: b,
                },
            ) => {
                ta == tb
                    && match (a, b) {
                        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                        (None, None) => true,
                        _ => false,
                    }
            }
            (Value::Interface(a), Value::Interface(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_nested(f, true)
    }
}

// Conversion from common types

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<MapKey> for Value {
    fn from(key: MapKey) -> Self {
        key.to_value()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for MapKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MapKey::Bool(b) => serializer.serialize_bool(*b),
            MapKey::Int(i) => serializer.serialize_i64(*i),
            MapKey::String(s) => serializer.serialize_str(s),
        }
    }
}

/// Structs serialize as maps keyed by field name; nil values serialize as
/// none. Pointers are followed, so cyclic graphs can't be serialized.
#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{Error as _, SerializeMap, SerializeSeq};

        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Struct { ty, fields } => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (field, value) in ty.fields().iter().zip(fields) {
                    map.serialize_entry(&field.name, value)?;
                }
                map.end()
            }
            Value::Map {
                entries: Some(entries),
                ..
            } => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Slice {
                items: Some(items), ..
            } => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Pointer {
                cell: Some(cell), ..
            } => {
                let target = cell.try_borrow().map_err(S::Error::custom)?;
                target.serialize(serializer)
            }
            Value::Interface(Some(inner)) => inner.serialize(serializer),
            Value::Map { entries: None, .. }
            | Value::Slice { items: None, .. }
            | Value::Pointer { cell: None, .. }
            | Value::Interface(None) => serializer.serialize_none(),
        }
    }
}
