//! fieldpath core: addressable values over a dynamic object graph
//!
//! This layer lets a caller read and write one field deep inside an object
//! graph whose shape is only known at runtime:
//! - `Type` / `Kind`: runtime type descriptors
//! - `Value`: a node of the graph (structs, maps, slices, pointers, interfaces, scalars)
//! - `Addressable`: a handle on a location, either a direct reference or a map entry
//! - `Error`: the contract violations a handle can report
//!
//! Use this layer for:
//! - Walking a path one step at a time (field, index, map key, dereference)
//! - Reading a field for validation or printing
//! - Writing a field, including fields of values stored in maps
//!
//! # Example
//!
//! ```rust
//! use fieldpath_core::{Addressable, StructType, Type, Value};
//!
//! let issuer = StructType::new("Issuer").with_field("name", Type::String).build();
//! let config = StructType::new("Config")
//!     .with_field("issuers", Type::slice(Type::Struct(issuer.clone())))
//!     .build();
//!
//! let graph = Value::structure(
//!     &config,
//!     [("issuers", Value::slice_of(Type::Struct(issuer.clone()), [issuer_value(&issuer)]))],
//! )
//! .into_shared();
//!
//! let name = Addressable::root(&graph).field("issuers").index(0).field("name");
//! assert_eq!(name.as_interface(), Value::from("garden"));
//!
//! # fn issuer_value(ty: &std::rc::Rc<StructType>) -> Value {
//! #     Value::structure(ty, [("name", "garden".into())])
//! # }
//! ```

mod addressable;
mod entry;
mod error;
mod kind;
mod place;
mod types;
mod value;

pub use addressable::Addressable;
pub use entry::MapEntryRef;
pub use error::Error;
pub use kind::Kind;
pub use place::DirectRef;
pub use types::{Field, StructType, Type};
pub use value::{MapKey, Shared, Value};
