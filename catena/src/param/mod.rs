//! Hierarchical parameter store.
//!
//! Parameters are addressed by OID. Each top-level parameter is the root of a
//! tree of struct fields and struct-array elements; writes are staged and
//! merged into the canonical document on commit without losing sibling data.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Device                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ParamManager (params)          CommandManager (commands)    │
//! │  ├── staged_params: OID → Param      └── ParamManager        │
//! │  ├── staged_values: OID → Value                              │
//! │  ├── table: ParamTable                                       │
//! │  │   └── roots: name → ParamNode                             │
//! │  │       └── children: "field" | "i/field" → ParamNode       │
//! │  └── document: name → Param    (written on commit only)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod command;
pub mod manager;
pub mod node;
pub mod table;
pub mod types;
pub mod yaml;

pub use command::CommandManager;
pub use manager::{ParamDescriptor, ParamManager};
pub use node::ParamNode;
pub use table::ParamTable;
pub use types::{Param, ParamType, StructField, StructValue, Value, WidgetHint};
