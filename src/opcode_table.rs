use crate::error::{ZError, ZResult};
use crate::instruction::InstructionForm;
use std::collections::HashMap;

/// Static metadata for one opcode: everything the decoder and dispatcher
/// need to know without looking at a story file.
///
/// Tables are deliberately sparse — an opcode with no entry is simply
/// unimplemented by this core, not malformed; `lookup` turns a miss into
/// `ZError::UndefinedOpcode` so the fetch loop can report it uniformly.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    pub mnemonic: &'static str,
    pub min_version: u8,
    pub max_version: u8,
    pub does_store: bool,
    pub does_branch: bool,
    pub has_text: bool,
    /// For VAR-form opcodes whose operand count is fixed by the opcode
    /// itself (`storew` always takes 3) rather than by however many
    /// operand-type slots the instruction byte happened to fill.
    pub fixed_operand_count: Option<usize>,
}

impl OpcodeInfo {
    const fn new(mnemonic: &'static str) -> Self {
        OpcodeInfo {
            mnemonic,
            min_version: 1,
            max_version: 8,
            does_store: false,
            does_branch: false,
            has_text: false,
            fixed_operand_count: None,
        }
    }

    const fn store(mut self) -> Self {
        self.does_store = true;
        self
    }

    const fn branch(mut self) -> Self {
        self.does_branch = true;
        self
    }

    const fn text(mut self) -> Self {
        self.has_text = true;
        self
    }

    const fn versions(mut self, min: u8, max: u8) -> Self {
        self.min_version = min;
        self.max_version = max;
        self
    }

    const fn operands(mut self, n: usize) -> Self {
        self.fixed_operand_count = Some(n);
        self
    }
}

macro_rules! opcode_table {
    ($($opcode:expr => $info:expr),* $(,)?) => {{
        let mut map = HashMap::new();
        $(map.insert($opcode, $info);)*
        map
    }};
}

lazy_static::lazy_static! {
    static ref OP0_TABLE: HashMap<u8, OpcodeInfo> = opcode_table! {
        0x00 => OpcodeInfo::new("rtrue"),
        0x01 => OpcodeInfo::new("rfalse"),
        0x02 => OpcodeInfo::new("print").text(),
        0x03 => OpcodeInfo::new("print_ret").text(),
        0x04 => OpcodeInfo::new("nop"),
        0x05 => OpcodeInfo::new("save").branch().versions(1, 3),
        0x06 => OpcodeInfo::new("restore").branch().versions(1, 3),
        0x07 => OpcodeInfo::new("restart"),
        0x08 => OpcodeInfo::new("ret_popped"),
        0x09 => OpcodeInfo::new("pop").versions(1, 4),
        0x0A => OpcodeInfo::new("quit"),
        0x0B => OpcodeInfo::new("new_line"),
        0x0C => OpcodeInfo::new("show_status").versions(3, 3),
        0x0D => OpcodeInfo::new("verify").branch().versions(3, 8),
        0x0F => OpcodeInfo::new("piracy").branch().versions(5, 8),
    };

    static ref OP1_TABLE: HashMap<u8, OpcodeInfo> = opcode_table! {
        0x00 => OpcodeInfo::new("jz").branch(),
        0x01 => OpcodeInfo::new("get_sibling").store().branch(),
        0x02 => OpcodeInfo::new("get_child").store().branch(),
        0x03 => OpcodeInfo::new("get_parent").store(),
        0x04 => OpcodeInfo::new("get_prop_len").store(),
        0x05 => OpcodeInfo::new("inc"),
        0x06 => OpcodeInfo::new("dec"),
        0x07 => OpcodeInfo::new("print_addr"),
        0x08 => OpcodeInfo::new("call_1s").store().versions(4, 8),
        0x09 => OpcodeInfo::new("remove_obj"),
        0x0A => OpcodeInfo::new("print_obj"),
        0x0B => OpcodeInfo::new("ret"),
        0x0C => OpcodeInfo::new("jump"),
        0x0D => OpcodeInfo::new("print_paddr"),
        0x0E => OpcodeInfo::new("load").store(),
        0x0F => OpcodeInfo::new("not").versions(1, 4),
    };

    static ref OP2_TABLE: HashMap<u8, OpcodeInfo> = opcode_table! {
        0x01 => OpcodeInfo::new("je").branch(),
        0x02 => OpcodeInfo::new("jl").branch(),
        0x03 => OpcodeInfo::new("jg").branch(),
        0x04 => OpcodeInfo::new("dec_chk").branch(),
        0x05 => OpcodeInfo::new("inc_chk").branch(),
        0x06 => OpcodeInfo::new("jin").branch(),
        0x07 => OpcodeInfo::new("test").branch(),
        0x08 => OpcodeInfo::new("or").store(),
        0x09 => OpcodeInfo::new("and").store(),
        0x0A => OpcodeInfo::new("test_attr").branch(),
        0x0B => OpcodeInfo::new("set_attr"),
        0x0C => OpcodeInfo::new("clear_attr"),
        0x0D => OpcodeInfo::new("store"),
        0x0E => OpcodeInfo::new("insert_obj"),
        0x0F => OpcodeInfo::new("loadw").store(),
        0x10 => OpcodeInfo::new("loadb").store(),
        0x11 => OpcodeInfo::new("get_prop").store(),
        0x12 => OpcodeInfo::new("get_prop_addr").store(),
        0x13 => OpcodeInfo::new("get_next_prop").store(),
        0x14 => OpcodeInfo::new("add").store(),
        0x15 => OpcodeInfo::new("sub").store(),
        0x16 => OpcodeInfo::new("mul").store(),
        0x17 => OpcodeInfo::new("div").store(),
        0x18 => OpcodeInfo::new("mod").store(),
        0x19 => OpcodeInfo::new("call_2s").store().versions(4, 8),
        0x1A => OpcodeInfo::new("call_2n").versions(5, 8),
        0x1B => OpcodeInfo::new("set_colour").versions(5, 8),
        0x1C => OpcodeInfo::new("throw").versions(5, 8),
    };

    static ref VAR_TABLE: HashMap<u8, OpcodeInfo> = opcode_table! {
        0x00 => OpcodeInfo::new("call").store(),
        0x01 => OpcodeInfo::new("storew").operands(3),
        0x02 => OpcodeInfo::new("storeb").operands(3),
        0x03 => OpcodeInfo::new("put_prop").operands(3),
        0x04 => OpcodeInfo::new("sread"),
        0x05 => OpcodeInfo::new("print_char").operands(1),
        0x06 => OpcodeInfo::new("print_num").operands(1),
        0x07 => OpcodeInfo::new("random").store().operands(1),
        0x08 => OpcodeInfo::new("push").store().operands(1),
        0x09 => OpcodeInfo::new("pull").operands(1).versions(1, 5),
        0x0A => OpcodeInfo::new("split_window").operands(1).versions(3, 8),
        0x0B => OpcodeInfo::new("set_window").operands(1).versions(3, 8),
        0x0C => OpcodeInfo::new("call_vs2").store().versions(4, 8),
        0x0D => OpcodeInfo::new("erase_window").versions(4, 8),
        0x0E => OpcodeInfo::new("erase_line").versions(4, 8),
        0x0F => OpcodeInfo::new("set_cursor").versions(4, 8),
        0x10 => OpcodeInfo::new("get_cursor").versions(4, 8),
        0x11 => OpcodeInfo::new("set_text_style").versions(4, 8),
        0x12 => OpcodeInfo::new("buffer_mode").versions(4, 8),
        0x13 => OpcodeInfo::new("output_stream").versions(3, 8),
        0x14 => OpcodeInfo::new("input_stream").versions(3, 8),
        0x15 => OpcodeInfo::new("sound_effect").versions(3, 8),
        0x16 => OpcodeInfo::new("read_char").store().versions(4, 8),
        0x17 => OpcodeInfo::new("scan_table").store().branch().versions(4, 8),
        0x18 => OpcodeInfo::new("not").store().versions(5, 8),
        0x19 => OpcodeInfo::new("call_vn").versions(5, 8),
        0x1A => OpcodeInfo::new("call_vn2").versions(5, 8),
        0x1B => OpcodeInfo::new("tokenise").versions(5, 8),
        0x1C => OpcodeInfo::new("encode_text").versions(5, 8),
        0x1D => OpcodeInfo::new("copy_table").versions(5, 8),
        0x1E => OpcodeInfo::new("print_table").versions(5, 8),
        0x1F => OpcodeInfo::new("check_arg_count").branch().versions(5, 8),
    };

    static ref EXT_TABLE: HashMap<u8, OpcodeInfo> = opcode_table! {
        0x00 => OpcodeInfo::new("save").store().versions(5, 8),
        0x01 => OpcodeInfo::new("restore").store().versions(5, 8),
        0x02 => OpcodeInfo::new("log_shift").store().versions(5, 8),
        0x03 => OpcodeInfo::new("art_shift").store().versions(5, 8),
        0x04 => OpcodeInfo::new("set_font").store().versions(5, 8),
        0x09 => OpcodeInfo::new("save_undo").store().versions(5, 8),
        0x0A => OpcodeInfo::new("restore_undo").store().versions(5, 8),
        0x0B => OpcodeInfo::new("print_unicode").versions(5, 8),
        0x0C => OpcodeInfo::new("check_unicode").store().versions(5, 8),
    };
}

/// Opcodes named by `VAR` form in the 0x00-0x1F range that are really
/// the variable-form encoding of a 2OP opcode (the top bit of the
/// instruction byte only selects operand *encoding*, not operand count).
pub fn lookup(
    form: InstructionForm,
    opcode: u8,
    is_2op_in_var_form: bool,
    version: u8,
) -> ZResult<&'static OpcodeInfo> {
    let info = match form {
        InstructionForm::Extended => EXT_TABLE.get(&opcode),
        InstructionForm::Long => OP2_TABLE.get(&opcode),
        InstructionForm::Variable if is_2op_in_var_form => OP2_TABLE.get(&opcode),
        InstructionForm::Variable => VAR_TABLE.get(&opcode),
        InstructionForm::Short => unreachable!("short form dispatched via lookup_short"),
    };

    match info {
        None => Err(ZError::UndefinedOpcode {
            form,
            opcode,
            version,
        }),
        Some(info) if version < info.min_version || version > info.max_version => {
            Err(ZError::VersionMismatch {
                opcode,
                min_v: info.min_version,
                max_v: info.max_version,
                version,
            })
        }
        Some(info) => Ok(info),
    }
}

/// Short-form lookup needs the 0OP/1OP split, which the caller already
/// knows from `OperandCount` — kept as a separate entry point rather
/// than overloading `lookup`'s signature with an extra enum.
pub fn lookup_short(
    is_0op: bool,
    opcode: u8,
    version: u8,
) -> ZResult<&'static OpcodeInfo> {
    let table = if is_0op { &OP0_TABLE } else { &OP1_TABLE };
    match table.get(&opcode) {
        None => Err(ZError::UndefinedOpcode {
            form: InstructionForm::Short,
            opcode,
            version,
        }),
        Some(info) if version < info.min_version || version > info.max_version => {
            Err(ZError::VersionMismatch {
                opcode,
                min_v: info.min_version,
                max_v: info.max_version,
                version,
            })
        }
        Some(info) => Ok(info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_known_2op_opcode() {
        let info = lookup(InstructionForm::Long, 0x09, false, 3).unwrap();
        assert_eq!(info.mnemonic, "and");
        assert!(info.does_store);
    }

    #[test]
    fn reports_undefined_opcode() {
        let err = lookup(InstructionForm::Long, 0x1E, false, 3);
        assert!(matches!(err, Err(ZError::UndefinedOpcode { .. })));
    }

    #[test]
    fn reports_version_mismatch() {
        let err = lookup_short(false, 0x0F, 5);
        assert!(matches!(err, Err(ZError::VersionMismatch { .. })));
    }

    #[test]
    fn var_form_2op_disambiguation_reuses_2op_table() {
        let info = lookup(InstructionForm::Variable, 0x14, true, 3).unwrap();
        assert_eq!(info.mnemonic, "add");
    }

    #[test]
    fn every_table_entry_is_self_consistent() {
        for (opcode, info) in OP2_TABLE.iter() {
            assert!(info.min_version <= info.max_version);
            assert!(*opcode >= 1);
        }
    }
}
