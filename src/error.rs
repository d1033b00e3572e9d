use thiserror::Error;

/// Structured error taxonomy for the Z-machine execution core.
///
/// Every variant carries enough operand context (addresses, variable
/// numbers, the offending opcode) to reconstruct the fault without
/// re-running the instruction. Faults are fatal to the current
/// instruction; they never unwind past the fetch loop (see `dispatch`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ZError {
    #[error("memory fault: address {addr:#06x} out of range (size {size:#06x})")]
    MemoryFault { addr: u32, size: u32 },

    #[error("read-only fault: write to {addr:#06x} rejected (static base {static_base:#06x})")]
    ReadOnlyFault { addr: u32, static_base: u16 },

    #[error("bad local: variable {var:#04x} exceeds frame's {num_locals} declared locals")]
    BadLocal { var: u8, num_locals: u8 },

    #[error("stack underflow at PC {pc:#06x}")]
    StackUnderflow { pc: u32 },

    #[error("put_prop: property {prop_num} not found on object {object_id}")]
    PropertyNotFound { object_id: u16, prop_num: u8 },

    #[error("bad property size {size} for object {object_id} property {prop_num}")]
    BadPropertySize {
        object_id: u16,
        prop_num: u8,
        size: usize,
    },

    #[error("undefined opcode: form {form:?} opcode {opcode:#04x} (version {version})")]
    UndefinedOpcode {
        form: crate::instruction::InstructionForm,
        opcode: u8,
        version: u8,
    },

    #[error("version mismatch: opcode {opcode:#04x} needs [{min_v}, {max_v}], story is v{version}")]
    VersionMismatch {
        opcode: u8,
        min_v: u8,
        max_v: u8,
        version: u8,
    },
}

pub type ZResult<T> = Result<T, ZError>;
