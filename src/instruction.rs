use crate::error::{ZError, ZResult};
use crate::opcode_table::{self, OpcodeInfo};
use std::fmt::{self, Debug, Display, Formatter, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    LargeConstant,
    SmallConstant,
    Variable,
    Omitted,
}

impl OperandType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0b00 => OperandType::LargeConstant,
            0b01 => OperandType::SmallConstant,
            0b10 => OperandType::Variable,
            0b11 => OperandType::Omitted,
            _ => unreachable!(),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            OperandType::LargeConstant => 2,
            OperandType::SmallConstant => 1,
            OperandType::Variable => 1,
            OperandType::Omitted => 0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionForm {
    Long,
    Short,
    Extended,
    Variable,
}

impl Debug for InstructionForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstructionForm::Long => "Long",
            InstructionForm::Short => "Short",
            InstructionForm::Extended => "Extended",
            InstructionForm::Variable => "Variable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandCount {
    OP0,
    OP1,
    OP2,
    VAR,
}

#[derive(Debug, Clone, Copy)]
pub struct BranchInfo {
    pub on_true: bool,
    pub offset: i16,
}

/// A decoded instruction: everything the dispatcher needs, with the
/// operand bytes fully resolved except variable reads (done at
/// dispatch time against the live VM state).
#[derive(Debug, Clone)]
pub struct Instruction {
    pub opcode: u8,
    pub ext_opcode: Option<u8>,
    pub form: InstructionForm,
    pub operand_count: OperandCount,
    pub operand_types: Vec<OperandType>,
    pub operands: Vec<u16>,
    pub store_var: Option<u8>,
    pub branch: Option<BranchInfo>,
    /// Byte length of an inline Z-string following `print`/`print_ret`.
    /// Decoding its text content is a host/collaborator concern (out of
    /// scope here); the decoder only needs the length to compute `size`.
    pub text_length: Option<usize>,
    pub size: usize,
}

impl Instruction {
    pub fn decode(memory: &[u8], addr: usize, version: u8) -> ZResult<Self> {
        if addr >= memory.len() {
            return Err(ZError::MemoryFault {
                addr: addr as u32,
                size: memory.len() as u32,
            });
        }

        let mut offset = addr;
        let opcode_byte = memory[offset];
        offset += 1;

        let form = match opcode_byte >> 6 {
            0b11 => InstructionForm::Variable,
            0b10 => InstructionForm::Short,
            0b01 => InstructionForm::Long,
            0b00 => {
                if opcode_byte == 0xBE && version >= 5 {
                    InstructionForm::Extended
                } else {
                    InstructionForm::Long
                }
            }
            _ => unreachable!(),
        };

        let (opcode, ext_opcode, operand_count) = match form {
            InstructionForm::Long => {
                let opcode = opcode_byte & 0x1F;
                if opcode == 0x00 {
                    return Err(ZError::UndefinedOpcode {
                        form,
                        opcode,
                        version,
                    });
                }
                (opcode, None, OperandCount::OP2)
            }
            InstructionForm::Short => {
                let op_count = if (opcode_byte >> 4) & 0x03 == 0x03 {
                    OperandCount::OP0
                } else {
                    OperandCount::OP1
                };
                (opcode_byte & 0x0F, None, op_count)
            }
            InstructionForm::Variable => {
                let op_count = if opcode_byte & 0x20 == 0 {
                    OperandCount::OP2
                } else {
                    OperandCount::VAR
                };
                (opcode_byte & 0x1F, None, op_count)
            }
            InstructionForm::Extended => {
                if offset >= memory.len() {
                    return Err(ZError::MemoryFault {
                        addr: offset as u32,
                        size: memory.len() as u32,
                    });
                }
                let ext_op = memory[offset];
                offset += 1;
                (opcode_byte, Some(ext_op), OperandCount::VAR)
            }
        };

        let mut operand_types = Vec::new();
        match form {
            InstructionForm::Long => {
                let type1 = if opcode_byte & 0x40 != 0 {
                    OperandType::Variable
                } else {
                    OperandType::SmallConstant
                };
                let type2 = if opcode_byte & 0x20 != 0 {
                    OperandType::Variable
                } else {
                    OperandType::SmallConstant
                };
                operand_types.push(type1);
                operand_types.push(type2);
            }
            InstructionForm::Short => {
                if operand_count != OperandCount::OP0 {
                    let op_type = OperandType::from_bits((opcode_byte >> 4) & 0x03);
                    if op_type != OperandType::Omitted {
                        operand_types.push(op_type);
                    }
                }
            }
            InstructionForm::Variable | InstructionForm::Extended => {
                if offset >= memory.len() {
                    return Err(ZError::MemoryFault {
                        addr: offset as u32,
                        size: memory.len() as u32,
                    });
                }
                let mut type_bytes = vec![memory[offset]];
                offset += 1;

                if operand_count == OperandCount::VAR && type_bytes[0] == 0xFF {
                    if offset >= memory.len() {
                        return Err(ZError::MemoryFault {
                            addr: offset as u32,
                            size: memory.len() as u32,
                        });
                    }
                    type_bytes.push(memory[offset]);
                    offset += 1;
                }

                for type_byte in type_bytes {
                    for i in 0..4 {
                        let op_type = OperandType::from_bits(type_byte >> (6 - i * 2));
                        if op_type == OperandType::Omitted {
                            break;
                        }
                        operand_types.push(op_type);
                    }
                }
            }
        }

        let is_2op_in_var_form =
            form == InstructionForm::Variable && operand_count == OperandCount::OP2;
        let info = Self::lookup_info(form, opcode, ext_opcode, operand_count, is_2op_in_var_form, version)?;

        let operand_limit = match info.fixed_operand_count {
            Some(count) => operand_types.len().min(count),
            None => operand_types.len(),
        };

        let mut operands = Vec::new();
        for (i, op_type) in operand_types.iter().enumerate() {
            if i >= operand_limit {
                break;
            }
            match op_type {
                OperandType::LargeConstant => {
                    if offset + 1 >= memory.len() {
                        return Err(ZError::MemoryFault {
                            addr: offset as u32,
                            size: memory.len() as u32,
                        });
                    }
                    let value = ((memory[offset] as u16) << 8) | (memory[offset + 1] as u16);
                    operands.push(value);
                    offset += 2;
                }
                OperandType::SmallConstant | OperandType::Variable => {
                    if offset >= memory.len() {
                        return Err(ZError::MemoryFault {
                            addr: offset as u32,
                            size: memory.len() as u32,
                        });
                    }
                    operands.push(memory[offset] as u16);
                    offset += 1;
                }
                OperandType::Omitted => break,
            }
        }

        let store_var = if info.does_store {
            if offset >= memory.len() {
                return Err(ZError::MemoryFault {
                    addr: offset as u32,
                    size: memory.len() as u32,
                });
            }
            let var = memory[offset];
            offset += 1;
            Some(var)
        } else {
            None
        };

        let branch = if info.does_branch {
            if offset >= memory.len() {
                return Err(ZError::MemoryFault {
                    addr: offset as u32,
                    size: memory.len() as u32,
                });
            }
            let first_byte = memory[offset];
            offset += 1;

            let on_true = (first_byte & 0x80) != 0;
            let offset_val = if (first_byte & 0x40) != 0 {
                (first_byte & 0x3F) as i16
            } else {
                if offset >= memory.len() {
                    return Err(ZError::MemoryFault {
                        addr: offset as u32,
                        size: memory.len() as u32,
                    });
                }
                let second_byte = memory[offset];
                offset += 1;
                let val = (((first_byte & 0x3F) as i16) << 8) | (second_byte as i16);
                if val & 0x2000 != 0 {
                    val | (0xC000u16 as i16)
                } else {
                    val
                }
            };

            Some(BranchInfo {
                on_true,
                offset: offset_val,
            })
        } else {
            None
        };

        let text_length = if info.has_text {
            let start = offset;
            loop {
                if offset + 1 >= memory.len() {
                    return Err(ZError::MemoryFault {
                        addr: offset as u32,
                        size: memory.len() as u32,
                    });
                }
                let word = ((memory[offset] as u16) << 8) | memory[offset + 1] as u16;
                offset += 2;
                if word & 0x8000 != 0 {
                    break;
                }
            }
            Some(offset - start)
        } else {
            None
        };

        let mut actual_operand_types = operand_types;
        actual_operand_types.truncate(operands.len());

        Ok(Instruction {
            opcode,
            ext_opcode,
            form,
            operand_count,
            operand_types: actual_operand_types,
            operands,
            store_var,
            branch,
            text_length,
            size: offset - addr,
        })
    }

    fn lookup_info(
        form: InstructionForm,
        opcode: u8,
        ext_opcode: Option<u8>,
        operand_count: OperandCount,
        is_2op_in_var_form: bool,
        version: u8,
    ) -> ZResult<&'static OpcodeInfo> {
        match form {
            InstructionForm::Short => {
                opcode_table::lookup_short(operand_count == OperandCount::OP0, opcode, version)
            }
            InstructionForm::Extended => {
                opcode_table::lookup(form, ext_opcode.unwrap_or(0), false, version)
            }
            _ => opcode_table::lookup(form, opcode, is_2op_in_var_form, version),
        }
    }

    pub fn name(&self, version: u8) -> ZResult<&'static str> {
        let is_2op_in_var_form =
            self.form == InstructionForm::Variable && self.operand_count == OperandCount::OP2;
        Self::lookup_info(
            self.form,
            self.opcode,
            self.ext_opcode,
            self.operand_count,
            is_2op_in_var_form,
            version,
        )
        .map(|info| info.mnemonic)
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = self.name(8).unwrap_or("unknown");
        write!(f, "{name}")?;
        for (i, op) in self.operands.iter().enumerate() {
            if i == 0 {
                write!(f, " ")?;
            } else {
                write!(f, ", ")?;
            }
            match self.operand_types.get(i) {
                Some(OperandType::Variable) => write!(f, "V{op:02x}")?,
                _ => write!(f, "#{op:04x}")?,
            }
        }
        if let Some(var) = self.store_var {
            write!(f, " -> V{var:02x}")?;
        }
        if let Some(ref branch) = self.branch {
            let mut tail = String::new();
            match branch.offset {
                0 => write!(tail, " RFALSE")?,
                1 => write!(tail, " RTRUE")?,
                n => write!(tail, " {n:+}")?,
            }
            write!(f, " [{}{}]", if branch.on_true { "TRUE" } else { "FALSE" }, tail)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_type_from_bits() {
        assert_eq!(OperandType::from_bits(0b00), OperandType::LargeConstant);
        assert_eq!(OperandType::from_bits(0b01), OperandType::SmallConstant);
        assert_eq!(OperandType::from_bits(0b10), OperandType::Variable);
        assert_eq!(OperandType::from_bits(0b11), OperandType::Omitted);
    }

    #[test]
    fn test_decode_long_form() {
        // je #0x34 #0x78, branch on true to return false
        let memory = vec![0x41, 0x34, 0x78, 0x80, 0x00, 0x00];
        let inst = Instruction::decode(&memory, 0, 3).unwrap();
        assert_eq!(inst.form, InstructionForm::Long);
        assert_eq!(inst.opcode, 0x01);
        assert_eq!(inst.operands, vec![0x34, 0x78]);
        assert!(inst.branch.is_some());
    }

    #[test]
    fn test_decode_short_form() {
        // jump #0x34 (small constant)
        let memory = vec![0x9C, 0x34, 0x00, 0x00];
        let inst = Instruction::decode(&memory, 0, 3).unwrap();
        assert_eq!(inst.form, InstructionForm::Short);
        assert_eq!(inst.opcode, 0x0C);
        assert_eq!(inst.operands, vec![0x34]);
    }

    #[test]
    fn test_decode_variable_form_and_uses_get_prop() {
        // get_prop (2OP:0x11 in variable encoding), object=1, prop=5 -> store
        let memory = vec![0xD1, 0x5F, 0x01, 0x05, 0x00];
        let inst = Instruction::decode(&memory, 0, 3).unwrap();
        assert_eq!(inst.form, InstructionForm::Variable);
        assert_eq!(inst.operand_count, OperandCount::OP2);
        assert_eq!(inst.operands, vec![0x01, 0x05]);
        assert_eq!(inst.store_var, Some(0x00));
        assert_eq!(inst.name(3).unwrap(), "get_prop");
    }

    #[test]
    fn undefined_opcode_is_reported() {
        // Long form opcode 0x1E has no 2OP table entry.
        let memory = vec![0x5E, 0x00, 0x00, 0x00];
        let err = Instruction::decode(&memory, 0, 3);
        assert!(matches!(err, Err(ZError::UndefinedOpcode { .. })));
    }

    #[test]
    fn version_gated_opcode_rejected_below_minimum() {
        // call_2s is 2OP:0x19, v4+ only.
        let memory = vec![0x59, 0x00, 0x00, 0x00];
        let err = Instruction::decode(&memory, 0, 3);
        assert!(matches!(err, Err(ZError::VersionMismatch { .. })));
    }
}
