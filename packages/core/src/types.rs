//! Runtime type descriptors for values in the object graph.

use std::fmt;
use std::rc::Rc;

use crate::{Kind, Value};

/// A named field of a [`StructType`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

/// The layout of a struct: a name and an ordered list of fields.
///
/// # Examples
///
/// ```rust
/// use fieldpath_core::{StructType, Type};
///
/// let record = StructType::new("Record")
///     .with_field("name", Type::String)
///     .with_field("replicas", Type::Int)
///     .build();
///
/// assert_eq!(record.field_index("replicas"), Some(1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructType {
    name: String,
    fields: Vec<Field>,
}

impl StructType {
    /// Start a struct layout with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    ///
    /// # Panics
    ///
    /// Panics if a field with the same name already exists.
    pub fn with_field(mut self, name: impl Into<String>, ty: Type) -> Self {
        let name = name.into();
        assert!(
            self.field_index(&name).is_none(),
            "duplicate field {:?} in struct {}",
            name,
            self.name
        );
        self.fields.push(Field { name, ty });
        self
    }

    /// Finish the layout, producing a shareable type.
    pub fn build(self) -> Rc<StructType> {
        Rc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Position of the field called `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// The runtime type of a value.
///
/// Map keys are restricted to the comparable scalars (`Bool`, `Int`,
/// `String`); see [`Type::map`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// `bool`.
    Bool,
    /// `int`, a signed 64-bit integer.
    Int,
    /// `float`, 64-bit floating point.
    Float,
    /// `string`.
    String,
    /// A named struct layout.
    Struct(Rc<StructType>),
    /// `map[K]V`.
    Map { key: Box<Type>, elem: Box<Type> },
    /// `[]T`.
    Slice(Box<Type>),
    /// `*T`.
    Pointer(Box<Type>),
    /// The "any" interface. Every value is assignable to it.
    Interface,
}

impl Type {
    /// A map type.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not a comparable scalar type.
    pub fn map(key: Type, elem: Type) -> Self {
        assert!(
            key.kind().is_comparable_key(),
            "invalid map key type {}",
            key
        );
        Type::Map {
            key: Box::new(key),
            elem: Box::new(elem),
        }
    }

    pub fn slice(elem: Type) -> Self {
        Type::Slice(Box::new(elem))
    }

    pub fn pointer(target: Type) -> Self {
        Type::Pointer(Box::new(target))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Type::Bool => Kind::Bool,
            Type::Int => Kind::Int,
            Type::Float => Kind::Float,
            Type::String => Kind::String,
            Type::Struct(_) => Kind::Struct,
            Type::Map { .. } => Kind::Map,
            Type::Slice(_) => Kind::Slice,
            Type::Pointer(_) => Kind::Pointer,
            Type::Interface => Kind::Interface,
        }
    }

    /// The element type of a map or slice, or the target type of a pointer.
    pub fn elem(&self) -> Option<&Type> {
        match self {
            Type::Map { elem, .. } => Some(&**elem),
            Type::Slice(elem) | Type::Pointer(elem) => Some(&**elem),
            _ => None,
        }
    }

    /// The key type of a map.
    pub fn key(&self) -> Option<&Type> {
        match self {
            Type::Map { key, .. } => Some(&**key),
            _ => None,
        }
    }

    /// Whether a value of this type can be stored in a slot of type `target`.
    ///
    /// Identical types are assignable, and anything is assignable to
    /// [`Type::Interface`].
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        self == target || matches!(target, Type::Interface)
    }

    /// The value a fresh slot of this type holds.
    ///
    /// Nil-able kinds are nil; structs hold the zero value of every field.
    pub fn zero_value(&self) -> Value {
        match self {
            Type::Bool => Value::Bool(false),
            Type::Int => Value::Int(0),
            Type::Float => Value::Float(0.0),
            Type::String => Value::String(String::new()),
            Type::Struct(st) => Value::Struct {
                ty: Rc::clone(st),
                fields: st.fields.iter().map(|f| f.ty.zero_value()).collect(),
            },
            Type::Map { key, elem } => Value::Map {
                key: (**key).clone(),
                elem: (**elem).clone(),
                entries: None,
            },
            Type::Slice(elem) => Value::Slice {
                elem: (**elem).clone(),
                items: None,
            },
            Type::Pointer(target) => Value::Pointer {
                target: (**target).clone(),
                cell: None,
            },
            Type::Interface => Value::Interface(None),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("bool"),
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::String => f.write_str("string"),
            Type::Struct(st) => f.write_str(&st.name),
            Type::Map { key, elem } => write!(f, "map[{}]{}", key, elem),
            Type::Slice(elem) => write!(f, "[]{}", elem),
            Type::Pointer(target) => write!(f, "*{}", target),
            Type::Interface => f.write_str("any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Rc<StructType> {
        StructType::new("Record")
            .with_field("name", Type::String)
            .with_field("tags", Type::slice(Type::String))
            .build()
    }

    #[test]
    fn display_composite_types() {
        let ty = Type::map(Type::String, Type::pointer(Type::Struct(record())));
        assert_eq!(ty.to_string(), "map[string]*Record");
        assert_eq!(Type::slice(Type::Interface).to_string(), "[]any");
    }

    #[test]
    fn elem_and_key() {
        let ty = Type::map(Type::Int, Type::Float);
        assert_eq!(ty.key(), Some(&Type::Int));
        assert_eq!(ty.elem(), Some(&Type::Float));
        assert_eq!(Type::pointer(Type::Bool).elem(), Some(&Type::Bool));
        assert_eq!(Type::String.elem(), None);
    }

    #[test]
    fn assignability() {
        assert!(Type::Int.is_assignable_to(&Type::Int));
        assert!(Type::Int.is_assignable_to(&Type::Interface));
        assert!(!Type::Int.is_assignable_to(&Type::Float));
        assert!(!Type::Interface.is_assignable_to(&Type::String));
    }

    #[test]
    fn zero_values() {
        assert_eq!(Type::Int.zero_value(), Value::Int(0));
        assert_eq!(Type::pointer(Type::Int).zero_value().is_nil(), Some(true));

        let zero = Type::Struct(record()).zero_value();
        assert_eq!(zero.field("name"), Some(&Value::from("")));
        assert_eq!(zero.field("tags").and_then(Value::is_nil), Some(true));
    }

    #[test]
    fn struct_field_lookup() {
        let st = record();
        assert_eq!(st.name(), "Record");
        assert_eq!(st.field_index("tags"), Some(1));
        assert_eq!(st.field_index("missing"), None);
    }

    #[test]
    #[should_panic(expected = "duplicate field")]
    fn duplicate_field_panics() {
        StructType::new("Dup")
            .with_field("a", Type::Int)
            .with_field("a", Type::Int);
    }

    #[test]
    #[should_panic(expected = "invalid map key type")]
    fn float_map_key_panics() {
        Type::map(Type::Float, Type::Int);
    }
}
