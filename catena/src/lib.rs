//! Device-side parameter model for Catena-style device control.
//!
//! A device exposes typed parameters and commands per slot. Parameters live
//! in a tree addressed by OID (`audio/eq/gain`, `channels/2/name`); writes
//! are staged and merged into the canonical document on commit.

pub mod constraint;
pub mod device;
pub mod error;
pub mod menu;
pub mod oid;
pub mod param;
pub mod payload;
pub mod text;

pub use device::{Device, DeviceModel, PushUpdate, SharedDevice};
pub use error::{ParamError, Result};
pub use param::{
    CommandManager, Param, ParamDescriptor, ParamManager, ParamType, StructField, StructValue,
    Value, WidgetHint,
};
