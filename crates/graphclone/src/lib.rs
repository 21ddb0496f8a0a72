//! Graphclone
//!
//! Deep cloning of object graphs described by runtime metadata. The engine
//! discovers the members of each class (storage fields, accessor pairs or
//! both), copies them recursively and preserves the topology of the source:
//! cycles, shared references and null members come out the way they went in.
//!
//! - [`classify`]: decides how each value is treated
//! - [`resolver`] and [`cache`]: per-class member descriptor sets, built once
//! - [`engine`]: the clone walk itself, driven by [`CloneSettings`]
//!
//! # Example
//!
//! ```ignore
//! use graphclone::{deep_clone, model::{Class, ObjectRef, TypeRef, Value}};
//!
//! let node = Class::builder("Node")
//!     .auto_property("label", TypeRef::Str)
//!     .auto_property("next", TypeRef::class("Node"))
//!     .build();
//!
//! let head = ObjectRef::new(&node);
//! head.set_property("label", "head")?;
//! head.set_property("next", head.clone())?;
//!
//! let copy = deep_clone(&Value::Object(head))?;
//! ```

#![warn(rust_2018_idioms)]

pub mod cache;
pub mod classify;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod identity;
pub mod ignore;
pub mod resolver;
pub mod settings;

pub use graphclone_model as model;

pub use cache::{global_cache, CacheKey, DescriptorCache, SharedDescriptorCache};
pub use classify::{classify, Shape};
pub use descriptor::{MemberDescriptor, MemberSource};
pub use engine::{deep_clone, deep_clone_with, DeepCloner};
pub use error::{CloneError, CloneResult, ConfigError};
pub use identity::CloneIdentity;
pub use ignore::{IgnoreSet, MemberPath};
pub use resolver::{build_descriptor_set, resolve, DescriptorSet, MemberKind};
pub use settings::{CloneConfig, CloneLevel, CloneSettings, InstanceFactory};
