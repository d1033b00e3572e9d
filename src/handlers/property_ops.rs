use crate::dispatch::{DispatchContext, DispatchOutcome};
use crate::error::ZResult;
use crate::vm::Vm;

pub fn get_prop(vm: &mut Vm, operands: &[u16], ctx: &DispatchContext) -> ZResult<DispatchOutcome> {
    let value = vm
        .objects()
        .get_prop(vm.memory(), operands[0], operands[1] as u8)?;
    ctx.store(vm, value)?;
    Ok(ctx.branch(true))
}

pub fn get_prop_addr(
    vm: &mut Vm,
    operands: &[u16],
    ctx: &DispatchContext,
) -> ZResult<DispatchOutcome> {
    let addr = vm
        .objects()
        .get_prop_addr(vm.memory(), operands[0], operands[1] as u8)?;
    ctx.store(vm, addr)?;
    Ok(ctx.branch(true))
}

pub fn get_prop_len(
    vm: &mut Vm,
    operands: &[u16],
    ctx: &DispatchContext,
) -> ZResult<DispatchOutcome> {
    let len = vm.objects().get_prop_len(vm.memory(), operands[0])? as u16;
    ctx.store(vm, len)?;
    Ok(ctx.branch(true))
}

pub fn put_prop(vm: &mut Vm, operands: &[u16], ctx: &DispatchContext) -> ZResult<DispatchOutcome> {
    let (object_id, prop_num, value) = (operands[0], operands[1] as u8, operands[2]);
    let (objects, memory) = vm.objects_and_memory_mut();
    objects.put_prop(memory, object_id, prop_num, value)?;
    Ok(ctx.branch(true))
}

pub fn get_next_prop(
    vm: &mut Vm,
    operands: &[u16],
    ctx: &DispatchContext,
) -> ZResult<DispatchOutcome> {
    let next = vm
        .objects()
        .next_property(vm.memory(), operands[0], operands[1] as u8)?
        .unwrap_or(0);
    ctx.store(vm, next as u16)?;
    Ok(ctx.branch(true))
}
