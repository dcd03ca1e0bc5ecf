//! The Addressable Value - one handle over every kind of location.
//!
//! A path walker descends through the object graph one step at a time
//! (field, index, map key, dereference), asking [`Addressable::kind`] how to
//! interpret the next segment, and finally reads or writes the terminal
//! location. Whether that location is natively addressable or a map entry
//! that must be re-inserted is hidden behind this one type.
//!
//! # Failure policy
//!
//! Absence is data: [`Addressable::is_valid`] and [`Addressable::is_nil`]
//! report it without failing. Misuse is not: calling a kind-specific
//! operation on the wrong kind, dereferencing nil, or writing a value of
//! the wrong type panics. Each such operation has a `try_*` twin returning
//! the [`Error`] instead, for callers that report misuse at a coarser
//! boundary.

use crate::entry::MapEntryRef;
use crate::place::DirectRef;
use crate::{Error, Kind, MapKey, Shared, Type, Value};

/// A handle on a location in the object graph that holds a value now, or
/// will hold one after a write.
///
/// Handles share the graph with their creator and with each other; they
/// are cheap to clone and meant to be discarded after each step.
///
/// # Examples
///
/// ```rust
/// use fieldpath_core::{Addressable, StructType, Type, Value};
///
/// let record = StructType::new("Record").with_field("name", Type::String).build();
/// let graph = Value::empty_map(Type::String, Type::pointer(Type::Struct(record.clone())))
///     .into_shared();
///
/// let entry = Addressable::root(&graph).entry("a");
/// assert!(!entry.is_valid());
///
/// let entry = entry.set(Value::pointer_to(Value::structure(&record, [("name", "x".into())])));
/// entry.elem().field("name").set("y".into());
///
/// let name = Addressable::root(&graph).entry("a").elem().field("name").as_interface();
/// assert_eq!(name, Value::from("y"));
/// ```
#[derive(Clone, Debug)]
pub enum Addressable {
    /// A natively addressable location.
    Direct(DirectRef),
    /// A map entry, written by re-insertion.
    Entry(MapEntryRef),
}

impl Addressable {
    /// A direct reference to the root of a caller-owned graph.
    pub fn root(graph: &Shared) -> Self {
        Addressable::Direct(DirectRef::root(graph.clone()))
    }

    /// Run `f` on the current value, `None` when the location is empty.
    fn read<R>(&self, f: impl FnOnce(Option<&Value>) -> Result<R, Error>) -> Result<R, Error> {
        match self {
            Addressable::Direct(direct) => direct.read(|value| f(Some(value))),
            Addressable::Entry(entry) => entry.read(f),
        }
    }

    /// The runtime type of the addressed value.
    ///
    /// For a map entry that hasn't been read through [`elem`](Self::elem)
    /// or written, this is the map's declared element type, which is
    /// [`Type::Interface`] for maps of interfaces whatever the stored value.
    pub fn try_ty(&self) -> Result<Type, Error> {
        match self {
            Addressable::Direct(direct) => direct.read(|value| Ok(value.type_of())),
            Addressable::Entry(entry) => entry.ty(),
        }
    }

    /// Panicking version of [`try_ty`](Self::try_ty).
    #[track_caller]
    pub fn ty(&self) -> Type {
        match self.try_ty() {
            Ok(ty) => ty,
            Err(e) => e.violated(),
        }
    }

    /// The kind of [`ty`](Self::ty), or [`Kind::Invalid`] if a direct
    /// location no longer resolves. Never panics.
    pub fn kind(&self) -> Kind {
        match self {
            Addressable::Direct(direct) => direct.kind(),
            Addressable::Entry(entry) => entry.kind(),
        }
    }

    /// The current value, with one interface box stripped.
    ///
    /// An absent map entry reads as the zero value of the map's element
    /// type, as a map lookup would; use [`is_valid`](Self::is_valid) to tell
    /// it apart from a stored zero value.
    pub fn try_as_interface(&self) -> Result<Value, Error> {
        match self {
            Addressable::Direct(direct) => direct.read(|value| Ok(value.clone().unboxed())),
            Addressable::Entry(entry) => entry.read(|value| {
                Ok(value
                    .cloned()
                    .unwrap_or_else(|| entry.elem_type().zero_value())
                    .unboxed())
            }),
        }
    }

    /// Panicking version of [`try_as_interface`](Self::try_as_interface).
    #[track_caller]
    pub fn as_interface(&self) -> Value {
        match self.try_as_interface() {
            Ok(value) => value,
            Err(e) => e.violated(),
        }
    }

    /// The raw stored value, or `None` if the location resolves to nothing.
    pub fn value(&self) -> Option<Value> {
        self.read(|value| Ok(value.cloned())).ok().flatten()
    }

    /// Whether the location currently resolves to a value. A map key that
    /// was never written is not valid.
    pub fn is_valid(&self) -> bool {
        self.read(|value| Ok(value.is_some())).unwrap_or(false)
    }

    /// Whether the addressed value is nil. Only maps, slices, pointers and
    /// interfaces can be nil; asking any other kind is an error.
    pub fn try_is_nil(&self) -> Result<bool, Error> {
        self.read(|value| {
            let value = value.ok_or_else(|| self.absent())?;
            value.is_nil().ok_or(Error::KindMismatch {
                op: "is_nil",
                kind: value.kind(),
            })
        })
    }

    /// Panicking version of [`try_is_nil`](Self::try_is_nil).
    #[track_caller]
    pub fn is_nil(&self) -> bool {
        match self.try_is_nil() {
            Ok(nil) => nil,
            Err(e) => e.violated(),
        }
    }

    /// The length of a map, slice or string. Any other kind is an error.
    pub fn try_len(&self) -> Result<usize, Error> {
        self.read(|value| {
            let value = value.ok_or_else(|| self.absent())?;
            value.len().ok_or(Error::KindMismatch {
                op: "len",
                kind: value.kind(),
            })
        })
    }

    /// Panicking version of [`try_len`](Self::try_len).
    #[track_caller]
    pub fn len(&self) -> usize {
        match self.try_len() {
            Ok(len) => len,
            Err(e) => e.violated(),
        }
    }

    /// Whether a map, slice or string has length zero.
    pub fn try_is_empty(&self) -> Result<bool, Error> {
        self.try_len().map(|len| len == 0)
    }

    /// Panicking version of [`try_is_empty`](Self::try_is_empty).
    #[track_caller]
    pub fn is_empty(&self) -> bool {
        match self.try_is_empty() {
            Ok(empty) => empty,
            Err(e) => e.violated(),
        }
    }

    /// Overwrite the addressed location with `value`, returning the handle
    /// on the updated location.
    ///
    /// `value` must be assignable to the location's type; anything is
    /// assignable to an interface slot. A map entry is re-inserted into its
    /// map under the same key, and the returned handle reads `value` back
    /// without consulting the map.
    pub fn try_set(mut self, value: Value) -> Result<Self, Error> {
        match &mut self {
            Addressable::Direct(direct) => direct.store(value)?,
            Addressable::Entry(entry) => entry.store(value)?,
        }
        Ok(self)
    }

    /// Panicking version of [`try_set`](Self::try_set).
    #[track_caller]
    pub fn set(self, value: Value) -> Self {
        match self.try_set(value) {
            Ok(this) => this,
            Err(e) => e.violated(),
        }
    }

    /// Descend one level: dereference a pointer or unbox an interface.
    ///
    /// On a map entry the result is still the same entry, now caching the
    /// dereferenced value, so a later [`set`](Self::set) writes back under
    /// the original key. Dereferencing nil is an error.
    pub fn try_elem(self) -> Result<Self, Error> {
        match self {
            Addressable::Direct(direct) => direct.deref().map(Addressable::Direct),
            Addressable::Entry(entry) => entry.deref().map(Addressable::Entry),
        }
    }

    /// Panicking version of [`try_elem`](Self::try_elem).
    #[track_caller]
    pub fn elem(self) -> Self {
        match self.try_elem() {
            Ok(elem) => elem,
            Err(e) => e.violated(),
        }
    }

    /// The struct field called `name`.
    pub fn try_field(self, name: &str) -> Result<Self, Error> {
        self.into_direct().field(name).map(Addressable::Direct)
    }

    /// Panicking version of [`try_field`](Self::try_field).
    #[track_caller]
    pub fn field(self, name: &str) -> Self {
        match self.try_field(name) {
            Ok(field) => field,
            Err(e) => e.violated(),
        }
    }

    /// The slice element at `index`.
    pub fn try_index(self, index: usize) -> Result<Self, Error> {
        self.into_direct().index(index).map(Addressable::Direct)
    }

    /// Panicking version of [`try_index`](Self::try_index).
    #[track_caller]
    pub fn index(self, index: usize) -> Self {
        match self.try_index(index) {
            Ok(item) => item,
            Err(e) => e.violated(),
        }
    }

    /// The map entry for `key`, whether or not it is present.
    pub fn try_entry(self, key: impl Into<MapKey>) -> Result<Self, Error> {
        self.into_direct().entry(key.into()).map(Addressable::Entry)
    }

    /// Panicking version of [`try_entry`](Self::try_entry).
    #[track_caller]
    pub fn entry(self, key: impl Into<MapKey>) -> Self {
        match self.try_entry(key) {
            Ok(entry) => entry,
            Err(e) => e.violated(),
        }
    }

    /// Whether this handle addresses a map entry.
    pub fn is_entry(&self) -> bool {
        matches!(self, Addressable::Entry(_))
    }

    fn into_direct(self) -> DirectRef {
        match self {
            Addressable::Direct(direct) => direct,
            Addressable::Entry(entry) => entry.into_direct(),
        }
    }

    fn absent(&self) -> Error {
        match self {
            Addressable::Entry(entry) => Error::AbsentEntry {
                key: entry.key().clone(),
            },
            Addressable::Direct(_) => Error::Unresolved {
                message: "empty location".to_string(),
            },
        }
    }
}

impl From<DirectRef> for Addressable {
    fn from(direct: DirectRef) -> Self {
        Addressable::Direct(direct)
    }
}
