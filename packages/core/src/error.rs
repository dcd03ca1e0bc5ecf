//! Error types for addressable values.
//!
//! Every variant describes a caller-side contract violation: a path that
//! was walked wrongly, or a write of the wrong type. The panicking API
//! reports them with their `Display` text; the `try_*` API returns them so
//! a coarser boundary can turn them into user-facing messages.

use crate::{Kind, MapKey, Type};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{op} called on a value of kind {kind}")]
    KindMismatch { op: &'static str, kind: Kind },

    #[error("value of type {value} is not assignable to type {target}")]
    NotAssignable { value: Type, target: Type },

    #[error("{op} through a nil {kind}")]
    NilDereference { op: &'static str, kind: Kind },

    #[error("map entry [{key}] is absent")]
    AbsentEntry { key: MapKey },

    #[error("assignment to entry [{key}] in a nil map")]
    NilMap { key: MapKey },

    #[error("type {ty} has no field {name:?}")]
    NoSuchField { ty: Type, name: String },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("type {key} can't be used as a map key")]
    InvalidKey { key: Type },

    #[error("location no longer resolves: {message}")]
    Unresolved { message: String },
}

impl Error {
    /// Panic with this error, attributing the panic to the caller.
    #[track_caller]
    pub(crate) fn violated(self) -> ! {
        panic!("{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mismatch_display() {
        let e = Error::KindMismatch {
            op: "len",
            kind: Kind::Int,
        };
        assert_eq!(e.to_string(), "len called on a value of kind int");
    }

    #[test]
    fn not_assignable_display() {
        let e = Error::NotAssignable {
            value: Type::Int,
            target: Type::pointer(Type::String),
        };
        assert_eq!(
            e.to_string(),
            "value of type int is not assignable to type *string"
        );
    }

    #[test]
    fn entry_errors_display_key() {
        let e = Error::AbsentEntry { key: "a".into() };
        assert!(e.to_string().contains("[a]"));

        let e = Error::NilMap { key: MapKey::Int(3) };
        assert!(e.to_string().contains("nil map"));
        assert!(e.to_string().contains("[3]"));
    }

    #[test]
    fn no_such_field_display() {
        let e = Error::NoSuchField {
            ty: Type::Interface,
            name: "settings".to_string(),
        };
        assert_eq!(e.to_string(), "type any has no field \"settings\"");
    }

    #[test]
    #[should_panic(expected = "index 4 out of range for length 2")]
    fn violated_panics_with_display() {
        Error::IndexOutOfRange { index: 4, len: 2 }.violated();
    }
}
