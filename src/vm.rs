use crate::config::VmConfig;
use crate::error::ZResult;
use crate::memory::Memory;
use crate::object::ObjectTable;
use crate::variables::{CallFrame, VariableEngine};
use log::debug;

/// The execution core's owned state: memory, the decoded object table,
/// the variable/stack engine, and the fetch cursor. Narrow accessors
/// are exposed deliberately rather than public fields, so handlers go
/// through one seam per component instead of reaching into several
/// structs at once.
pub struct Vm {
    memory: Memory,
    objects: ObjectTable,
    vars: VariableEngine,
    pub pc: u32,
    config: VmConfig,
}

impl Vm {
    pub fn new(story: Vec<u8>, config: VmConfig) -> ZResult<Vm> {
        let memory = Memory::new(story)?;
        let objects = ObjectTable::new(memory.header(), config.strict_property_size);
        let globals_addr = memory.header().global_variables_address;
        let pc = memory.header().initial_pc as u32;
        let mut vars = VariableEngine::new(globals_addr, config.max_stack_depth);

        if memory.header().version <= 5 {
            vars.push_frame(CallFrame::new(0, None, Vec::new(), 0));
        }

        debug!(
            "VM initialized: version {}, initial PC {:#06x}",
            memory.header().version,
            pc
        );

        Ok(Vm {
            memory,
            objects,
            vars,
            pc,
            config,
        })
    }

    pub fn version(&self) -> u8 {
        self.memory.header().version
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    /// Split borrow for handlers that need to write through memory
    /// while consulting the object table, e.g. `put_prop` — a single
    /// `&mut self` method call can't hand out `&ObjectTable` and
    /// `&mut Memory` from two separate accessor calls at once.
    pub fn objects_and_memory_mut(&mut self) -> (&ObjectTable, &mut Memory) {
        (&self.objects, &mut self.memory)
    }

    pub fn vars(&self) -> &VariableEngine {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut VariableEngine {
        &mut self.vars
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn read_var(&mut self, var: u8) -> ZResult<u16> {
        let pc = self.pc;
        self.vars.read_var(&self.memory, var, pc)
    }

    pub fn peek_var(&self, var: u8) -> ZResult<u16> {
        self.vars.peek_var(&self.memory, var, self.pc)
    }

    pub fn write_var(&mut self, var: u8, value: u16) -> ZResult<()> {
        let pc = self.pc;
        self.vars.write_var(&mut self.memory, var, value, pc)
    }
}
