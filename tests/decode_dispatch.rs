//! Round-trips raw story-file bytes through `Instruction::decode` and
//! `dispatch_one` the way a fetch loop would, rather than calling
//! handlers directly. Exercises bitwise ops, variable/stack quirks,
//! property accessors, and the `Unhandled` path together against one
//! in-memory story file.

use test_log::test;
use zmcore::config::VmConfig;
use zmcore::dispatch::{dispatch_one, DispatchOutcome, Unhandled};
use zmcore::instruction::Instruction;
use zmcore::vm::Vm;

const OBJECT_TABLE_ADDR: usize = 0x0040;
const GLOBALS_ADDR: usize = 0x0200;
const STATIC_MEM_BASE: usize = 0x0300;
const CODE_ADDR: usize = 0x0500;

/// A v3 story file with one object (#1, property 5 = 0x2A, size 2) and
/// a short stream of real instruction bytes at `CODE_ADDR`.
fn story() -> Vec<u8> {
    let mut b = vec![0u8; 0x0600];
    b[0] = 3;
    b[0x06] = (CODE_ADDR >> 8) as u8;
    b[0x07] = CODE_ADDR as u8;
    b[0x0A] = (OBJECT_TABLE_ADDR >> 8) as u8;
    b[0x0B] = OBJECT_TABLE_ADDR as u8;
    b[0x0C] = (GLOBALS_ADDR >> 8) as u8;
    b[0x0D] = GLOBALS_ADDR as u8;
    b[0x0E] = (STATIC_MEM_BASE >> 8) as u8;
    b[0x0F] = STATIC_MEM_BASE as u8;

    let tree_base = OBJECT_TABLE_ADDR + 31 * 2;
    let prop_table_addr = tree_base + 9 + 0x20;
    b[tree_base + 7] = (prop_table_addr >> 8) as u8;
    b[tree_base + 8] = prop_table_addr as u8;

    let mut p = prop_table_addr;
    b[p] = 0; // no short name
    p += 1;
    b[p] = (1 << 5) | 5; // property 5, size 2
    b[p + 1] = 0x00;
    b[p + 2] = 0x2A;
    p += 3;
    b[p] = 0; // terminator

    let code: &[u8] = &[
        // or #0x0F #0xF0 -> V16          (long form, 2 small constants)
        0x08, 0x0F, 0xF0, 0x10,
        // test #0x0E #0x06 [TRUE +5]
        0x07, 0x0E, 0x06, 0xC5,
        // inc_chk V16 #0x0A [TRUE +4]
        0x05, 0x10, 0x0A, 0xC4,
        // get_prop #0x01 #0x05 -> V17    (variable-form 2OP)
        0xD1, 0x5F, 0x01, 0x05, 0x11,
        // put_prop #0x01 #0x05 #0x7B     (var form, 3 fixed operands)
        0xE3, 0x57, 0x01, 0x05, 0x7B,
        // jz #0x05 [TRUE +3]             (recognized opcode, no handler)
        0x90, 0x05, 0xC3,
    ];
    b[CODE_ADDR..CODE_ADDR + code.len()].copy_from_slice(code);
    b
}

fn step(vm: &mut Vm) -> Result<DispatchOutcome, Unhandled> {
    let inst = Instruction::decode(vm.memory().as_bytes(), vm.pc as usize, vm.version()).unwrap();
    dispatch_one(vm, &inst).unwrap()
}

#[test]
fn or_sets_bits_and_advances_pc() {
    let mut vm = Vm::new(story(), VmConfig::default()).unwrap();
    let outcome = step(&mut vm).unwrap();
    assert_eq!(vm.read_var(16).unwrap(), 0xFF);
    assert_eq!(outcome, DispatchOutcome::Continue((CODE_ADDR + 4) as u32));
}

#[test]
fn test_branches_past_the_next_instruction() {
    let mut vm = Vm::new(story(), VmConfig::default()).unwrap();
    vm.pc = (CODE_ADDR + 4) as u32;
    let outcome = step(&mut vm).unwrap();
    // next_pc (CODE_ADDR+8) + offset(5) - 2
    assert_eq!(outcome, DispatchOutcome::Continue((CODE_ADDR + 11) as u32));
}

#[test]
fn inc_chk_branches_after_wrapping_the_bitwise_result() {
    let mut vm = Vm::new(story(), VmConfig::default()).unwrap();
    vm.write_var(16, 0xFF).unwrap();
    vm.pc = (CODE_ADDR + 8) as u32;
    let outcome = step(&mut vm).unwrap();
    assert_eq!(vm.read_var(16).unwrap(), 0x0100);
    // next_pc (CODE_ADDR+12) + offset(4) - 2
    assert_eq!(outcome, DispatchOutcome::Continue((CODE_ADDR + 14) as u32));
}

#[test]
fn get_prop_then_put_prop_round_trip_through_dispatch() {
    let mut vm = Vm::new(story(), VmConfig::default()).unwrap();

    vm.pc = (CODE_ADDR + 12) as u32;
    step(&mut vm).unwrap();
    assert_eq!(vm.read_var(17).unwrap(), 0x2A);

    vm.pc = (CODE_ADDR + 17) as u32;
    step(&mut vm).unwrap();

    vm.pc = (CODE_ADDR + 12) as u32;
    step(&mut vm).unwrap();
    assert_eq!(vm.read_var(17).unwrap(), 0x7B);
}

#[test]
fn recognized_opcode_with_no_handler_reports_unhandled() {
    let mut vm = Vm::new(story(), VmConfig::default()).unwrap();
    vm.pc = (CODE_ADDR + 22) as u32;
    let outcome = step(&mut vm);
    assert_eq!(outcome, Err(Unhandled("jz")));
}
