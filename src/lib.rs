#![allow(dead_code)]

#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod header;
pub mod host;
pub mod instruction;
pub mod memory;
pub mod object;
pub mod opcode_table;
pub mod variables;
pub mod vm;

pub use config::VmConfig;
pub use error::{ZError, ZResult};
pub use vm::Vm;
