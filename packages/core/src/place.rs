//! Direct references: locations reached by projecting from an anchor.
//!
//! A location is an anchor plus a list of projection steps (struct field,
//! slice element, interface content). Steps are re-resolved on every
//! access, so a handle always observes the latest state of the graph.
//!
//! The anchor is either a shared cell (a graph root or a pointer target),
//! which can be mutated in place, or a map entry, which can't: writes
//! below an entry mutate a copy of the entry's value and re-insert it.

use std::rc::Rc;

use crate::entry::MapEntryRef;
use crate::{Error, Kind, MapKey, Shared, Value};

#[derive(Clone, Debug)]
enum Anchor {
    Cell(Shared),
    Entry(Box<MapEntryRef>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Field(usize),
    Index(usize),
    /// The content of a non-nil interface.
    Unbox,
}

fn unresolved(step: Step, value: &Value) -> Error {
    Error::Unresolved {
        message: format!("{:?} on a value of type {}", step, value.type_of()),
    }
}

fn project(value: &Value, step: Step) -> Result<&Value, Error> {
    match (step, value) {
        (Step::Field(i), Value::Struct { fields, .. }) if i < fields.len() => Ok(&fields[i]),
        (Step::Index(i), Value::Slice { items, .. }) => {
            let len = items.as_ref().map_or(0, Vec::len);
            items
                .as_ref()
                .and_then(|items| items.get(i))
                .ok_or(Error::IndexOutOfRange { index: i, len })
        }
        (Step::Unbox, Value::Interface(Some(inner))) => Ok(&**inner),
        (step, value) => Err(unresolved(step, value)),
    }
}

fn project_mut(value: &mut Value, step: Step) -> Result<&mut Value, Error> {
    let failure = unresolved(step, value);
    match (step, value) {
        (Step::Field(i), Value::Struct { fields, .. }) => fields.get_mut(i).ok_or(failure),
        (Step::Index(i), Value::Slice { items, .. }) => {
            let len = items.as_ref().map_or(0, Vec::len);
            items
                .as_mut()
                .and_then(|items| items.get_mut(i))
                .ok_or(Error::IndexOutOfRange { index: i, len })
        }
        (Step::Unbox, Value::Interface(Some(inner))) => Ok(&mut **inner),
        _ => Err(failure),
    }
}

fn resolve<'v>(mut value: &'v Value, steps: &[Step]) -> Result<&'v Value, Error> {
    for &step in steps {
        value = project(value, step)?;
    }
    Ok(value)
}

fn resolve_mut<'v>(mut value: &'v mut Value, steps: &[Step]) -> Result<&'v mut Value, Error> {
    for &step in steps {
        value = project_mut(value, step)?;
    }
    Ok(value)
}

/// A handle on a natively addressable location: a graph root, a struct
/// field, a slice element, a pointer target or the content of an
/// interface.
///
/// Writes through a direct reference are visible immediately to every
/// other handle on the same location.
#[derive(Clone, Debug)]
pub struct DirectRef {
    anchor: Anchor,
    steps: Vec<Step>,
}

impl DirectRef {
    pub(crate) fn root(cell: Shared) -> Self {
        Self {
            anchor: Anchor::Cell(cell),
            steps: Vec::new(),
        }
    }

    /// A location whose reads and writes go through `entry`.
    pub(crate) fn anchored(entry: MapEntryRef) -> Self {
        Self {
            anchor: Anchor::Entry(Box::new(entry)),
            steps: Vec::new(),
        }
    }

    fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Run `f` on the current value at this location.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Value) -> Result<R, Error>) -> Result<R, Error> {
        match &self.anchor {
            Anchor::Cell(cell) => {
                let guard = cell.try_borrow().map_err(|e| Error::Unresolved {
                    message: e.to_string(),
                })?;
                f(resolve(&guard, &self.steps)?)
            }
            Anchor::Entry(entry) => {
                let whole = entry.current()?.ok_or_else(|| Error::AbsentEntry {
                    key: entry.key().clone(),
                })?;
                f(resolve(&whole, &self.steps)?)
            }
        }
    }

    /// Run `f` on the value `depth` steps below the anchor, allowing it to
    /// be replaced. Below a map entry the whole entry is written back, and
    /// only when `f` succeeds.
    fn update<R>(
        &mut self,
        depth: usize,
        f: impl FnOnce(&mut Value) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let steps = &self.steps[..depth];
        match &mut self.anchor {
            Anchor::Cell(cell) => {
                let mut guard = cell.try_borrow_mut().map_err(|e| Error::Unresolved {
                    message: e.to_string(),
                })?;
                f(resolve_mut(&mut guard, steps)?)
            }
            Anchor::Entry(entry) => {
                let mut whole = entry.current()?.ok_or_else(|| Error::AbsentEntry {
                    key: entry.key().clone(),
                })?;
                let result = f(resolve_mut(&mut whole, steps)?)?;
                entry.store(whole)?;
                Ok(result)
            }
        }
    }

    /// Run `f` on the value at this location, allowing it to be replaced.
    pub(crate) fn update_slot<R>(
        &mut self,
        f: impl FnOnce(&mut Value) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let depth = self.steps.len();
        self.update(depth, f)
    }

    pub(crate) fn kind(&self) -> Kind {
        self.read(|v| Ok(v.kind())).unwrap_or(Kind::Invalid)
    }

    /// Overwrite the value at this location.
    ///
    /// The content of an interface can take a value of any type: the
    /// interface slot is re-boxed around it.
    pub(crate) fn store(&mut self, value: Value) -> Result<(), Error> {
        match self.steps.last() {
            Some(Step::Unbox) => {
                let depth = self.steps.len() - 1;
                self.update(depth, |slot| {
                    *slot = Value::boxed(value);
                    Ok(())
                })
            }
            _ => self.update_slot(|slot| {
                *slot = value.assign_to(&slot.type_of())?;
                Ok(())
            }),
        }
    }

    /// The location one dereference below this one.
    pub(crate) fn deref(self) -> Result<DirectRef, Error> {
        let target = self.read(|v| match v {
            Value::Pointer {
                cell: Some(cell), ..
            } => Ok(Some(Rc::clone(cell))),
            Value::Interface(Some(_)) => Ok(None),
            Value::Pointer { cell: None, .. } | Value::Interface(None) => {
                Err(Error::NilDereference {
                    op: "elem",
                    kind: v.kind(),
                })
            }
            other => Err(Error::KindMismatch {
                op: "elem",
                kind: other.kind(),
            }),
        })?;
        Ok(match target {
            Some(cell) => DirectRef::root(cell),
            None => self.with_step(Step::Unbox),
        })
    }

    pub(crate) fn field(self, name: &str) -> Result<DirectRef, Error> {
        let index = self.read(|v| match v {
            Value::Struct { ty, .. } => ty.field_index(name).ok_or_else(|| Error::NoSuchField {
                ty: v.type_of(),
                name: name.to_string(),
            }),
            other => Err(Error::KindMismatch {
                op: "field",
                kind: other.kind(),
            }),
        })?;
        Ok(self.with_step(Step::Field(index)))
    }

    pub(crate) fn index(self, index: usize) -> Result<DirectRef, Error> {
        self.read(|v| match v {
            Value::Slice { .. } => {
                let len = v.len().unwrap_or(0);
                if index < len {
                    Ok(())
                } else {
                    Err(Error::IndexOutOfRange { index, len })
                }
            }
            other => Err(Error::KindMismatch {
                op: "index",
                kind: other.kind(),
            }),
        })?;
        Ok(self.with_step(Step::Index(index)))
    }

    pub(crate) fn entry(self, key: MapKey) -> Result<MapEntryRef, Error> {
        let elem = self.read(|v| match v {
            Value::Map { key: key_ty, elem, .. } => {
                if key.ty() == *key_ty {
                    Ok(elem.clone())
                } else {
                    Err(Error::NotAssignable {
                        value: key.ty(),
                        target: key_ty.clone(),
                    })
                }
            }
            other => Err(Error::KindMismatch {
                op: "entry",
                kind: other.kind(),
            }),
        })?;
        Ok(MapEntryRef::new(self, key, elem))
    }
}
