//! Handler set: bitwise logic, variable manipulation, and property
//! accessors. Each handler is a free function over a `Vm`
//! facade and a `DispatchContext`, rather than a method on an
//! interpreter struct — this lets the fetch loop look up a handler by
//! mnemonic in a plain function-pointer table instead of matching on
//! opcode a second time after `opcode_table` already did.

pub mod bitwise;
pub mod property_ops;
pub mod variable_ops;

use crate::dispatch::{DispatchContext, DispatchOutcome};
use crate::error::ZResult;
use crate::vm::Vm;

pub type Handler = fn(&mut Vm, &[u16], &DispatchContext) -> ZResult<DispatchOutcome>;

/// Resolve a mnemonic from `opcode_table` to its handler. `None` for
/// mnemonics this core recognizes in its tables but does not execute
/// (routine calls, I/O, display) — the fetch loop turns that into
/// whatever it does for "known but unimplemented".
pub fn resolve(mnemonic: &str) -> Option<Handler> {
    match mnemonic {
        "and" => Some(bitwise::and),
        "or" => Some(bitwise::or),
        "not" => Some(bitwise::not),
        "test" => Some(bitwise::test),
        "inc" => Some(variable_ops::inc),
        "dec" => Some(variable_ops::dec),
        "load" => Some(variable_ops::load),
        "store" => Some(variable_ops::store),
        "inc_chk" => Some(variable_ops::inc_chk),
        "dec_chk" => Some(variable_ops::dec_chk),
        "get_prop" => Some(property_ops::get_prop),
        "get_prop_addr" => Some(property_ops::get_prop_addr),
        "get_prop_len" => Some(property_ops::get_prop_len),
        "put_prop" => Some(property_ops::put_prop),
        "get_next_prop" => Some(property_ops::get_next_prop),
        _ => None,
    }
}
