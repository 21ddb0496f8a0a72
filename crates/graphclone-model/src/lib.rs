//! Graphclone object model
//!
//! A dynamic, metadata-described object model: the runtime type information
//! the cloning engine walks. It provides
//!
//! - [`Value`]: scalars plus shared references to heap cells
//! - heap handles ([`ObjectRef`], [`ListRef`], [`MapRef`], [`ArrayRef`],
//!   [`RecordRef`]) whose identity is the address of the cell
//! - [`Class`] metadata: storage fields, accessor-pair properties,
//!   constructors and tags
//! - a typed tag store ([`Tags`])
//!
//! # Example
//!
//! ```ignore
//! use graphclone_model::{Class, ObjectRef, TypeRef, Value};
//!
//! let person = Class::builder("Person")
//!     .auto_property("name", TypeRef::Str)
//!     .auto_property("friend", TypeRef::class("Person"))
//!     .build();
//!
//! let ada = ObjectRef::new(&person);
//! ada.set_property("name", "Ada")?;
//! ada.set_property("friend", ada.clone())?;
//! ```

pub mod class;
pub mod compare;
pub mod error;
pub mod heap;
pub mod tags;
pub mod types;
pub mod value;

pub use class::{
    Class, ClassBuilder, ClassId, ClassKind, Constructor, ConstructorFn, FieldDef, Getter,
    PropertyDef, Setter, SEQUENCE_CONTRACT,
};
pub use error::{AccessError, InstantiateError};
pub use heap::{ArrayRef, ListRef, MapRef, ObjectRef, RecordRef};
pub use tags::{CloneIgnore, PrimaryIdentifier, Tags};
pub use types::TypeRef;
pub use value::{EnumValue, Handle, Key, Value};
