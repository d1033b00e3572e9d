use crate::error::ZResult;
use crate::instruction::{BranchInfo, Instruction};
use crate::vm::Vm;

/// What a handler's store/branch suffix resolved to, for the fetch
/// loop to act on. `Return` carries the offset-0/1 special case from a
/// branch (the "return false"/"return true" shorthand) — this core
/// does not itself pop a call frame (routine calls are out of scope),
/// but the outcome is surfaced so a host fetch loop built on this
/// crate can.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue(u32),
    Return(u16),
    /// A host-input opcode (`sread`, `read_char`, ...) was reached.
    /// This core never produces this itself, since it has no handler
    /// for those mnemonics; modeled here so a host fetch loop built on
    /// `dispatch_one` has a stable outcome to suspend on rather than
    /// inventing its own.
    Suspend,
}

/// Opcodes this core's opcode tables recognize but has no handler for
/// (routine calls, display, I/O — all out of scope here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unhandled(pub &'static str);

/// Bundles a decoded instruction's store/branch suffix so a handler
/// commits its result through one call instead of re-deriving branch
/// arithmetic itself. Built once per instruction by the fetch loop,
/// consumed by exactly one handler.
pub struct DispatchContext {
    store_var: Option<u8>,
    branch: Option<BranchInfo>,
    next_pc: u32,
}

impl DispatchContext {
    pub fn new(inst: &Instruction, pc_after: u32) -> Self {
        DispatchContext {
            store_var: inst.store_var,
            branch: inst.branch,
            next_pc: pc_after,
        }
    }

    /// Store `value` if this instruction has a store suffix; a silent
    /// no-op otherwise (missing optional callbacks are not a fault).
    pub fn store(&self, vm: &mut Vm, value: u16) -> ZResult<()> {
        match self.store_var {
            Some(var) => vm.write_var(var, value),
            None => Ok(()),
        }
    }

    /// Resolve this instruction's branch suffix against `condition`.
    /// With no branch suffix, execution simply continues to the next
    /// instruction.
    pub fn branch(&self, condition: bool) -> DispatchOutcome {
        match &self.branch {
            None => DispatchOutcome::Continue(self.next_pc),
            Some(b) => {
                let should_branch = condition == b.on_true;
                if !should_branch {
                    return DispatchOutcome::Continue(self.next_pc);
                }
                match b.offset {
                    0 => DispatchOutcome::Return(0),
                    1 => DispatchOutcome::Return(1),
                    n => {
                        let target = self.next_pc as i64 + n as i64 - 2;
                        DispatchOutcome::Continue(target as u32)
                    }
                }
            }
        }
    }

    /// True when this instruction has no branch suffix at all (as
    /// opposed to having one that evaluated false) — handlers like
    /// `test` use this to distinguish "just store" opcodes from
    /// "branch on test" ones if ever called without a branch present.
    pub fn has_branch(&self) -> bool {
        self.branch.is_some()
    }
}

/// Resolve a decoded instruction's operand bytes into values, reading
/// through variables where the operand type calls for it, then hand
/// off to the handler its mnemonic names in `opcode_table`.
///
/// Returns `Ok(Err(Unhandled))` rather than a hard error for opcodes
/// this core's tables recognize but implements no handler for — that
/// is a scoping fact, not a malformed story file.
pub fn dispatch_one(
    vm: &mut Vm,
    inst: &Instruction,
) -> ZResult<Result<DispatchOutcome, Unhandled>> {
    use crate::instruction::OperandType;

    let mut operands = Vec::with_capacity(inst.operands.len());
    for (&raw, op_type) in inst.operands.iter().zip(inst.operand_types.iter()) {
        let value = match op_type {
            OperandType::Variable => vm.read_var(raw as u8)?,
            OperandType::SmallConstant | OperandType::LargeConstant | OperandType::Omitted => raw,
        };
        operands.push(value);
    }

    let pc_after = vm.pc + inst.size as u32;
    let ctx = DispatchContext::new(inst, pc_after);

    let mnemonic = inst.name(vm.version())?;
    match crate::handlers::resolve(mnemonic) {
        Some(handler) => handler(vm, &operands, &ctx).map(Ok),
        None => Ok(Err(Unhandled(mnemonic))),
    }
}
