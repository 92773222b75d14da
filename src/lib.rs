//! A decoder for the [WebAssembly 1.0 core binary format](https://webassembly.github.io/spec/core/binary/index.html).
//!
//! [`decode_module`] is the entry point: it reads a module header and its
//! ordered sections from any [`ByteSource`](io::ByteSource) and returns a
//! [`Module`] tree. The tree is produced, not validated: indices are left
//! unresolved and it is a downstream collaborator's job to check that they
//! point at something that exists and that the module is otherwise
//! well-typed.
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod builtins;
pub mod error;
pub mod indices;
pub mod instructions;
pub mod io;
pub mod module;
pub mod sections;
pub mod types;

pub use error::DecodeError;
pub use module::{decode_module, Module};
