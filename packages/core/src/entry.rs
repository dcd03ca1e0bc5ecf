//! Map entry references.
//!
//! A map entry isn't addressable: reading one yields a copy, and writing
//! one means re-inserting the whole entry under its key. To keep chained
//! navigation coherent, a [`MapEntryRef`] caches the last copy it read or
//! wrote (its *effective element*). Once present, the cache is
//! authoritative; without it every read goes back to the map.
//!
//! Clones of a handle share its cache, so writes through one clone (or
//! through a field of it) are seen by the others. [`MapEntryRef::deref`]
//! gives the result a cache of its own.

use std::cell::RefCell;
use std::rc::Rc;

use crate::place::DirectRef;
use crate::{Addressable, Error, Kind, MapKey, Type, Value};

#[derive(Clone, Debug)]
enum Effective {
    /// A detached copy of the entry's value, or of the content of the
    /// interface stored there.
    Copy(Value),
    /// The target of a pointer stored in the entry. The map shares the
    /// target, so writes here need no re-insertion.
    Target(DirectRef),
}

/// A handle on "the value for `key` in a map".
#[derive(Clone, Debug)]
pub struct MapEntryRef {
    host: DirectRef,
    key: MapKey,
    /// The map's declared element type.
    elem: Type,
    effective: Rc<RefCell<Option<Effective>>>,
}

impl MapEntryRef {
    pub(crate) fn new(host: DirectRef, key: MapKey, elem: Type) -> Self {
        Self {
            host,
            key,
            elem,
            effective: Rc::new(RefCell::new(None)),
        }
    }

    pub fn key(&self) -> &MapKey {
        &self.key
    }

    /// The map's declared element type, regardless of any cached value.
    pub fn elem_type(&self) -> &Type {
        &self.elem
    }

    /// Whether an effective element has been materialized.
    pub fn is_cached(&self) -> bool {
        self.effective.borrow().is_some()
    }

    fn cached(&self) -> Option<Effective> {
        self.effective.borrow().clone()
    }

    /// The entry's current value, `None` if the key is absent.
    pub(crate) fn current(&self) -> Result<Option<Value>, Error> {
        match self.cached() {
            Some(Effective::Copy(value)) => Ok(Some(value)),
            Some(Effective::Target(target)) => target.read(|value| Ok(Some(value.clone()))),
            None => self.host.read(|map| match map {
                Value::Map { .. } => Ok(map.get(&self.key).cloned()),
                other => Err(Error::KindMismatch {
                    op: "map index",
                    kind: other.kind(),
                }),
            }),
        }
    }

    /// Run `f` on the entry's current value, `None` if the key is absent.
    pub(crate) fn read<R>(
        &self,
        f: impl FnOnce(Option<&Value>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        f(self.current()?.as_ref())
    }

    /// Without a cache this is the declared element type, which differs from
    /// the stored value's type when the map holds interfaces.
    pub(crate) fn ty(&self) -> Result<Type, Error> {
        match self.cached() {
            None => Ok(self.elem.clone()),
            Some(Effective::Copy(value)) => Ok(value.type_of()),
            Some(Effective::Target(target)) => target.read(|value| Ok(value.type_of())),
        }
    }

    pub(crate) fn kind(&self) -> Kind {
        match self.cached() {
            Some(Effective::Target(target)) => target.kind(),
            _ => self.ty().map_or(Kind::Invalid, |ty| ty.kind()),
        }
    }

    /// Write `value` to the entry: re-insert it into the map under the same
    /// key and make it the effective element.
    pub(crate) fn store(&mut self, value: Value) -> Result<(), Error> {
        if let Some(Effective::Target(mut target)) = self.cached() {
            return target.store(value);
        }

        let stored = value.clone().assign_to(&self.elem)?;
        let key = self.key.clone();
        self.host.update_slot(|map| match map {
            Value::Map {
                entries: Some(entries),
                ..
            } => {
                entries.insert(key, stored);
                Ok(())
            }
            Value::Map { entries: None, .. } => Err(Error::NilMap { key }),
            other => Err(Error::KindMismatch {
                op: "map insert",
                kind: other.kind(),
            }),
        })?;
        log::trace!("re-inserted map entry [{}] as {}", self.key, self.elem);

        *self.effective.borrow_mut() = Some(Effective::Copy(value));
        Ok(())
    }

    /// Dereference the entry's value, keeping the key association.
    ///
    /// Without a cache, the value is first materialized from the map. A
    /// stored pointer makes its target the effective element; a stored
    /// interface makes its content the effective element.
    pub(crate) fn deref(mut self) -> Result<MapEntryRef, Error> {
        let current = match self.cached() {
            Some(Effective::Target(target)) => {
                self.detach(Effective::Target(target.deref()?));
                return Ok(self);
            }
            Some(Effective::Copy(value)) => value,
            None => {
                let value = self.current()?.ok_or_else(|| Error::AbsentEntry {
                    key: self.key.clone(),
                })?;
                log::trace!("materialized map entry [{}]", self.key);
                value
            }
        };

        let effective = match current {
            Value::Pointer {
                cell: Some(cell), ..
            } => Effective::Target(DirectRef::root(cell)),
            Value::Interface(Some(inner)) => Effective::Copy(*inner),
            nil @ (Value::Pointer { cell: None, .. } | Value::Interface(None)) => {
                return Err(Error::NilDereference {
                    op: "elem",
                    kind: nil.kind(),
                });
            }
            other => {
                return Err(Error::KindMismatch {
                    op: "elem",
                    kind: other.kind(),
                });
            }
        };
        self.detach(effective);
        Ok(self)
    }

    /// Replace the cache with a fresh one, leaving other clones untouched.
    fn detach(&mut self, effective: Effective) {
        self.effective = Rc::new(RefCell::new(Some(effective)));
    }

    /// A direct reference to the entry's value itself. Past a stored
    /// pointer this is the pointer's target; otherwise writes through it are
    /// re-inserted into the map.
    pub(crate) fn into_direct(self) -> DirectRef {
        match self.cached() {
            Some(Effective::Target(target)) => target,
            _ => DirectRef::anchored(self),
        }
    }
}

impl From<MapEntryRef> for Addressable {
    fn from(entry: MapEntryRef) -> Self {
        Addressable::Entry(entry)
    }
}
