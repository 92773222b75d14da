//! WebAssembly [instruction set](https://webassembly.github.io/spec/core/binary/instructions.html).
//!
//! Structured control flow (`block`, `loop`, `if`) is represented as a tree:
//! each owns the `Vec<Instruction>` of its body directly, rather than as
//! start/end marker instructions inside one flat stream. The *end* (and, for
//! `if`, *else*) opcode that terminates a body in the binary encoding is
//! consumed by the decoder but never stored as an [`Instruction`] itself.

use crate::builtins::FloatConst;
use crate::error::{DecodeError, Result};
use crate::indices::{
    DataIndex, ElemIndex, FunctionIndex, GlobalIndex, LabelIndex, LocalIndex, TableIndex,
    TypeIndex,
};
use crate::io::{
    decode_i32, decode_i64, decode_u32, decode_u8, decode_vec, reclassify_eof, ByteSource, Pushback,
};
use crate::types::{decode_result_type, BlockType, ResultType, ValueType};

const OP_END: u8 = 0x0B;
const OP_ELSE: u8 = 0x05;

/// [Memory immediate argument](https://webassembly.github.io/spec/core/binary/instructions.html#memory-instructions).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct MemoryArgument {
    /// Base-2 log of the access's natural alignment. Not validated against
    /// the instruction's own natural alignment here; that's a validator's job.
    pub align: u32,
    pub offset: u32,
}

impl MemoryArgument {
    fn decode(src: &mut dyn ByteSource) -> Result<Self> {
        let align = decode_u32(src)?;
        let offset = decode_u32(src)?;
        Ok(Self { align, offset })
    }
}

/// Operand of [`Instruction::CallIndirect`]/[`Instruction::ReturnCallIndirect`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct IndirectCall {
    pub type_index: TypeIndex,
    pub table: TableIndex,
}

impl IndirectCall {
    fn decode(src: &mut dyn ByteSource) -> Result<Self> {
        Ok(Self {
            type_index: TypeIndex::decode(src)?,
            table: TableIndex::decode(src)?,
        })
    }
}

/// Operand of [`Instruction::BrTable`].
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct TableBranch {
    pub branches: Vec<LabelIndex>,
    pub default: LabelIndex,
}

impl TableBranch {
    fn decode(src: &mut dyn ByteSource) -> Result<Self> {
        let branches = decode_vec(src, None, |s| LabelIndex::decode(s))?;
        let default = LabelIndex::decode(src)?;
        Ok(Self { branches, default })
    }
}

/// Operand of [`Instruction::MemoryInit`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct MemoryDataArgs {
    pub data: DataIndex,
    pub memory: crate::indices::MemoryIndex,
}

/// Operand of [`Instruction::MemoryCopy`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct MemoryCopyArgs {
    pub dst: crate::indices::MemoryIndex,
    pub src: crate::indices::MemoryIndex,
}

/// Operand of [`Instruction::TableInit`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct TableElementArgs {
    pub table: TableIndex,
    pub element: ElemIndex,
}

/// Operand of [`Instruction::TableCopy`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct TableTableArgs {
    pub dst: TableIndex,
    pub src: TableIndex,
}

/// A reserved memory-index byte that, without multi-memory support, must
/// always decode to zero.
fn decode_reserved_memory(src: &mut dyn ByteSource) -> Result<crate::indices::MemoryIndex> {
    let index = crate::indices::MemoryIndex::decode(src)?;
    if index.0 != 0 {
        return Err(DecodeError::InvalidInput(
            "nonzero reserved memory index (multi-memory is not supported)",
        ));
    }
    Ok(index)
}

/// WebAssembly [instruction set](https://webassembly.github.io/spec/core/binary/instructions.html).
///
/// `Block`, `Loop` and `If` own their body (or bodies) directly as nested
/// vectors rather than as flat start/end markers: the parsed form is a tree,
/// matching the shape of the source rather than the shape of the bytecode.
#[derive(Debug, PartialEq, Clone)]
pub enum Instruction {
    Unreachable,
    Nop,
    Block(BlockType, Vec<Instruction>),
    Loop(BlockType, Vec<Instruction>),
    /// `then`, `else`. `else` is empty when the instruction had no else-arm.
    If(BlockType, Vec<Instruction>, Vec<Instruction>),
    Br(LabelIndex),
    BrIf(LabelIndex),
    BrTable(TableBranch),
    Return,
    Call(FunctionIndex),
    CallIndirect(IndirectCall),
    ReturnCall(FunctionIndex),
    ReturnCallIndirect(IndirectCall),
    Drop,
    Select,
    SelectWithTypes(ResultType),
    LocalGet(LocalIndex),
    LocalSet(LocalIndex),
    LocalTee(LocalIndex),
    GlobalGet(GlobalIndex),
    GlobalSet(GlobalIndex),
    TableGet(TableIndex),
    TableSet(TableIndex),
    I32Load(MemoryArgument),
    I64Load(MemoryArgument),
    F32Load(MemoryArgument),
    F64Load(MemoryArgument),
    I32Load8S(MemoryArgument),
    I32Load8U(MemoryArgument),
    I32Load16S(MemoryArgument),
    I32Load16U(MemoryArgument),
    I64Load8S(MemoryArgument),
    I64Load8U(MemoryArgument),
    I64Load16S(MemoryArgument),
    I64Load16U(MemoryArgument),
    I64Load32S(MemoryArgument),
    I64Load32U(MemoryArgument),
    I32Store(MemoryArgument),
    I64Store(MemoryArgument),
    F32Store(MemoryArgument),
    F64Store(MemoryArgument),
    I32Store8(MemoryArgument),
    I32Store16(MemoryArgument),
    I64Store8(MemoryArgument),
    I64Store16(MemoryArgument),
    I64Store32(MemoryArgument),
    MemorySize,
    MemoryGrow,
    I32Const(i32),
    I64Const(i64),
    F32Const(FloatConst<f32>),
    F64Const(FloatConst<f64>),
    I32Eqz,
    I32Eq,
    I32Ne,
    I32LtS,
    I32LtU,
    I32GtS,
    I32GtU,
    I32LeS,
    I32LeU,
    I32GeS,
    I32GeU,
    I64Eqz,
    I64Eq,
    I64Ne,
    I64LtS,
    I64LtU,
    I64GtS,
    I64GtU,
    I64LeS,
    I64LeU,
    I64GeS,
    I64GeU,
    F32Eq,
    F32Ne,
    F32Lt,
    F32Gt,
    F32Le,
    F32Ge,
    F64Eq,
    F64Ne,
    F64Lt,
    F64Gt,
    F64Le,
    F64Ge,
    I32Clz,
    I32Ctz,
    I32PopCnt,
    I32Add,
    I32Sub,
    I32Mul,
    I32DivS,
    I32DivU,
    I32RemS,
    I32RemU,
    I32And,
    I32Or,
    I32Xor,
    I32Shl,
    I32ShrS,
    I32ShrU,
    I32RotL,
    I32RotR,
    I64Clz,
    I64Ctz,
    I64PopCnt,
    I64Add,
    I64Sub,
    I64Mul,
    I64DivS,
    I64DivU,
    I64RemS,
    I64RemU,
    I64And,
    I64Or,
    I64Xor,
    I64Shl,
    I64ShrS,
    I64ShrU,
    I64RotL,
    I64RotR,
    F32Abs,
    F32Neg,
    F32Ceil,
    F32Floor,
    F32Trunc,
    F32Nearest,
    F32Sqrt,
    F32Add,
    F32Sub,
    F32Mul,
    F32Div,
    F32Min,
    F32Max,
    F32CopySign,
    F64Abs,
    F64Neg,
    F64Ceil,
    F64Floor,
    F64Trunc,
    F64Nearest,
    F64Sqrt,
    F64Add,
    F64Sub,
    F64Mul,
    F64Div,
    F64Min,
    F64Max,
    F64CopySign,
    I32WrapI64,
    I32TruncF32S,
    I32TruncF32U,
    I32TruncF64S,
    I32TruncF64U,
    I64ExtendI32S,
    I64ExtendI32U,
    I64TruncF32S,
    I64TruncF32U,
    I64TruncF64S,
    I64TruncF64U,
    F32ConvertI32S,
    F32ConvertI32U,
    F32ConvertI64S,
    F32ConvertI64U,
    F32DemoteF64,
    F64ConvertI32S,
    F64ConvertI32U,
    F64ConvertI64S,
    F64ConvertI64U,
    F64PromoteF32,
    I32ReinterpretF32,
    I64ReinterpretF64,
    F32ReinterpretI32,
    F64ReinterpretI64,
    I32Extend8S,
    I32Extend16S,
    I64Extend8S,
    I64Extend16S,
    I64Extend32S,
    RefNull(ValueType),
    RefIsNull,
    RefFunc(FunctionIndex),
    // Secondary (0xFC-prefixed) opcode space: saturating truncation and bulk
    // memory/table operations, both part of the WebAssembly 1.0 core.
    I32TruncSatF32S,
    I32TruncSatF32U,
    I32TruncSatF64S,
    I32TruncSatF64U,
    I64TruncSatF32S,
    I64TruncSatF32U,
    I64TruncSatF64S,
    I64TruncSatF64U,
    MemoryInit(MemoryDataArgs),
    DataDrop(DataIndex),
    MemoryCopy(MemoryCopyArgs),
    MemoryFill(crate::indices::MemoryIndex),
    TableInit(TableElementArgs),
    ElemDrop(ElemIndex),
    TableCopy(TableTableArgs),
    TableGrow(TableIndex),
    TableSize(TableIndex),
    TableFill(TableIndex),
}

/// [Expression](https://webassembly.github.io/spec/core/binary/instructions.html#expressions):
/// a terminated list of instructions. The terminating *end* opcode is
/// consumed during decoding and is not represented in this vector.
pub type Expression = Vec<Instruction>;

enum Terminator {
    End,
    Else,
}

/// Decodes a complete [`Expression`], consuming its terminating *end* opcode.
pub fn decode_expression(src: &mut dyn ByteSource) -> Result<Expression> {
    let mut pb = Pushback::new(src);
    let (body, terminator) = decode_sequence(&mut pb)?;
    match terminator {
        Terminator::End => Ok(body),
        Terminator::Else => Err(DecodeError::InvalidInput("unexpected else outside an if block")),
    }
}

fn decode_sequence(src: &mut Pushback<'_>) -> Result<(Vec<Instruction>, Terminator)> {
    let mut out = Vec::new();
    loop {
        let opcode =
            decode_u8(src).map_err(|err| reclassify_eof(src, err, DecodeError::ExpectedValueOrTerminator))?;
        match opcode {
            OP_END => return Ok((out, Terminator::End)),
            OP_ELSE => return Ok((out, Terminator::Else)),
            _ => out.push(decode_one(opcode, src)?),
        }
    }
}

fn decode_block_body(src: &mut Pushback<'_>) -> Result<Vec<Instruction>> {
    let (body, terminator) = decode_sequence(src)?;
    match terminator {
        Terminator::End => Ok(body),
        Terminator::Else => Err(DecodeError::InvalidInput("block or loop terminated by else")),
    }
}

fn decode_if_bodies(src: &mut Pushback<'_>) -> Result<(Vec<Instruction>, Vec<Instruction>)> {
    let (then_body, terminator) = decode_sequence(src)?;
    match terminator {
        Terminator::End => Ok((then_body, Vec::new())),
        Terminator::Else => {
            let else_body = decode_block_body(src)?;
            Ok((then_body, else_body))
        }
    }
}

fn decode_one(opcode: u8, src: &mut Pushback<'_>) -> Result<Instruction> {
    use Instruction as I;
    Ok(match opcode {
        0x00 => I::Unreachable,
        0x01 => I::Nop,
        0x02 => {
            let block_type = BlockType::decode(src)?;
            let body = decode_block_body(src)?;
            I::Block(block_type, body)
        }
        0x03 => {
            let block_type = BlockType::decode(src)?;
            let body = decode_block_body(src)?;
            I::Loop(block_type, body)
        }
        0x04 => {
            let block_type = BlockType::decode(src)?;
            let (then_body, else_body) = decode_if_bodies(src)?;
            I::If(block_type, then_body, else_body)
        }
        0x0C => I::Br(LabelIndex::decode(src)?),
        0x0D => I::BrIf(LabelIndex::decode(src)?),
        0x0E => I::BrTable(TableBranch::decode(src)?),
        0x0F => I::Return,
        0x10 => I::Call(FunctionIndex::decode(src)?),
        0x11 => I::CallIndirect(IndirectCall::decode(src)?),
        0x12 => I::ReturnCall(FunctionIndex::decode(src)?),
        0x13 => I::ReturnCallIndirect(IndirectCall::decode(src)?),
        0x1A => I::Drop,
        0x1B => I::Select,
        0x1C => I::SelectWithTypes(decode_result_type(src, None)?),
        0x20 => I::LocalGet(LocalIndex::decode(src)?),
        0x21 => I::LocalSet(LocalIndex::decode(src)?),
        0x22 => I::LocalTee(LocalIndex::decode(src)?),
        0x23 => I::GlobalGet(GlobalIndex::decode(src)?),
        0x24 => I::GlobalSet(GlobalIndex::decode(src)?),
        0x25 => I::TableGet(TableIndex::decode(src)?),
        0x26 => I::TableSet(TableIndex::decode(src)?),
        0x28 => I::I32Load(MemoryArgument::decode(src)?),
        0x29 => I::I64Load(MemoryArgument::decode(src)?),
        0x2A => I::F32Load(MemoryArgument::decode(src)?),
        0x2B => I::F64Load(MemoryArgument::decode(src)?),
        0x2C => I::I32Load8S(MemoryArgument::decode(src)?),
        0x2D => I::I32Load8U(MemoryArgument::decode(src)?),
        0x2E => I::I32Load16S(MemoryArgument::decode(src)?),
        0x2F => I::I32Load16U(MemoryArgument::decode(src)?),
        0x30 => I::I64Load8S(MemoryArgument::decode(src)?),
        0x31 => I::I64Load8U(MemoryArgument::decode(src)?),
        0x32 => I::I64Load16S(MemoryArgument::decode(src)?),
        0x33 => I::I64Load16U(MemoryArgument::decode(src)?),
        0x34 => I::I64Load32S(MemoryArgument::decode(src)?),
        0x35 => I::I64Load32U(MemoryArgument::decode(src)?),
        0x36 => I::I32Store(MemoryArgument::decode(src)?),
        0x37 => I::I64Store(MemoryArgument::decode(src)?),
        0x38 => I::F32Store(MemoryArgument::decode(src)?),
        0x39 => I::F64Store(MemoryArgument::decode(src)?),
        0x3A => I::I32Store8(MemoryArgument::decode(src)?),
        0x3B => I::I32Store16(MemoryArgument::decode(src)?),
        0x3C => I::I64Store8(MemoryArgument::decode(src)?),
        0x3D => I::I64Store16(MemoryArgument::decode(src)?),
        0x3E => I::I64Store32(MemoryArgument::decode(src)?),
        0x3F => {
            decode_reserved_memory(src)?;
            I::MemorySize
        }
        0x40 => {
            decode_reserved_memory(src)?;
            I::MemoryGrow
        }
        0x41 => I::I32Const(decode_i32(src)?),
        0x42 => I::I64Const(decode_i64(src)?),
        0x43 => I::F32Const(FloatConst::decode(src)?),
        0x44 => I::F64Const(FloatConst::decode(src)?),
        0x45 => I::I32Eqz,
        0x46 => I::I32Eq,
        0x47 => I::I32Ne,
        0x48 => I::I32LtS,
        0x49 => I::I32LtU,
        0x4A => I::I32GtS,
        0x4B => I::I32GtU,
        0x4C => I::I32LeS,
        0x4D => I::I32LeU,
        0x4E => I::I32GeS,
        0x4F => I::I32GeU,
        0x50 => I::I64Eqz,
        0x51 => I::I64Eq,
        0x52 => I::I64Ne,
        0x53 => I::I64LtS,
        0x54 => I::I64LtU,
        0x55 => I::I64GtS,
        0x56 => I::I64GtU,
        0x57 => I::I64LeS,
        0x58 => I::I64LeU,
        0x59 => I::I64GeS,
        0x5A => I::I64GeU,
        0x5B => I::F32Eq,
        0x5C => I::F32Ne,
        0x5D => I::F32Lt,
        0x5E => I::F32Gt,
        0x5F => I::F32Le,
        0x60 => I::F32Ge,
        0x61 => I::F64Eq,
        0x62 => I::F64Ne,
        0x63 => I::F64Lt,
        0x64 => I::F64Gt,
        0x65 => I::F64Le,
        0x66 => I::F64Ge,
        0x67 => I::I32Clz,
        0x68 => I::I32Ctz,
        0x69 => I::I32PopCnt,
        0x6A => I::I32Add,
        0x6B => I::I32Sub,
        0x6C => I::I32Mul,
        0x6D => I::I32DivS,
        0x6E => I::I32DivU,
        0x6F => I::I32RemS,
        0x70 => I::I32RemU,
        0x71 => I::I32And,
        0x72 => I::I32Or,
        0x73 => I::I32Xor,
        0x74 => I::I32Shl,
        0x75 => I::I32ShrS,
        0x76 => I::I32ShrU,
        0x77 => I::I32RotL,
        0x78 => I::I32RotR,
        0x79 => I::I64Clz,
        0x7A => I::I64Ctz,
        0x7B => I::I64PopCnt,
        0x7C => I::I64Add,
        0x7D => I::I64Sub,
        0x7E => I::I64Mul,
        0x7F => I::I64DivS,
        0x80 => I::I64DivU,
        0x81 => I::I64RemS,
        0x82 => I::I64RemU,
        0x83 => I::I64And,
        0x84 => I::I64Or,
        0x85 => I::I64Xor,
        0x86 => I::I64Shl,
        0x87 => I::I64ShrS,
        0x88 => I::I64ShrU,
        0x89 => I::I64RotL,
        0x8A => I::I64RotR,
        0x8B => I::F32Abs,
        0x8C => I::F32Neg,
        0x8D => I::F32Ceil,
        0x8E => I::F32Floor,
        0x8F => I::F32Trunc,
        0x90 => I::F32Nearest,
        0x91 => I::F32Sqrt,
        0x92 => I::F32Add,
        0x93 => I::F32Sub,
        0x94 => I::F32Mul,
        0x95 => I::F32Div,
        0x96 => I::F32Min,
        0x97 => I::F32Max,
        0x98 => I::F32CopySign,
        0x99 => I::F64Abs,
        0x9A => I::F64Neg,
        0x9B => I::F64Ceil,
        0x9C => I::F64Floor,
        0x9D => I::F64Trunc,
        0x9E => I::F64Nearest,
        0x9F => I::F64Sqrt,
        0xA0 => I::F64Add,
        0xA1 => I::F64Sub,
        0xA2 => I::F64Mul,
        0xA3 => I::F64Div,
        0xA4 => I::F64Min,
        0xA5 => I::F64Max,
        0xA6 => I::F64CopySign,
        0xA7 => I::I32WrapI64,
        0xA8 => I::I32TruncF32S,
        0xA9 => I::I32TruncF32U,
        0xAA => I::I32TruncF64S,
        0xAB => I::I32TruncF64U,
        0xAC => I::I64ExtendI32S,
        0xAD => I::I64ExtendI32U,
        0xAE => I::I64TruncF32S,
        0xAF => I::I64TruncF32U,
        0xB0 => I::I64TruncF64S,
        0xB1 => I::I64TruncF64U,
        0xB2 => I::F32ConvertI32S,
        0xB3 => I::F32ConvertI32U,
        0xB4 => I::F32ConvertI64S,
        0xB5 => I::F32ConvertI64U,
        0xB6 => I::F32DemoteF64,
        0xB7 => I::F64ConvertI32S,
        0xB8 => I::F64ConvertI32U,
        0xB9 => I::F64ConvertI64S,
        0xBA => I::F64ConvertI64U,
        0xBB => I::F64PromoteF32,
        0xBC => I::I32ReinterpretF32,
        0xBD => I::I64ReinterpretF64,
        0xBE => I::F32ReinterpretI32,
        0xBF => I::F64ReinterpretI64,
        0xC0 => I::I32Extend8S,
        0xC1 => I::I32Extend16S,
        0xC2 => I::I64Extend8S,
        0xC3 => I::I64Extend16S,
        0xC4 => I::I64Extend32S,
        0xD0 => {
            let reftype = ValueType::decode(src)?;
            if !reftype.is_reference() {
                return Err(DecodeError::InvalidInput("ref.null of a non-reference type"));
            }
            I::RefNull(reftype)
        }
        0xD1 => I::RefIsNull,
        0xD2 => I::RefFunc(FunctionIndex::decode(src)?),
        0xFC => decode_secondary(src)?,
        other => return Err(DecodeError::InvalidTag(other)),
    })
}

fn decode_secondary(src: &mut Pushback<'_>) -> Result<Instruction> {
    use Instruction as I;
    let sub_opcode = decode_u32(src)?;
    Ok(match sub_opcode {
        0 => I::I32TruncSatF32S,
        1 => I::I32TruncSatF32U,
        2 => I::I32TruncSatF64S,
        3 => I::I32TruncSatF64U,
        4 => I::I64TruncSatF32S,
        5 => I::I64TruncSatF32U,
        6 => I::I64TruncSatF64S,
        7 => I::I64TruncSatF64U,
        8 => {
            let data = DataIndex::decode(src)?;
            let memory = decode_reserved_memory(src)?;
            I::MemoryInit(MemoryDataArgs { data, memory })
        }
        9 => I::DataDrop(DataIndex::decode(src)?),
        10 => {
            let dst = decode_reserved_memory(src)?;
            let src_mem = decode_reserved_memory(src)?;
            I::MemoryCopy(MemoryCopyArgs { dst, src: src_mem })
        }
        11 => {
            let memory = decode_reserved_memory(src)?;
            I::MemoryFill(memory)
        }
        12 => {
            let element = ElemIndex::decode(src)?;
            let table = TableIndex::decode(src)?;
            I::TableInit(TableElementArgs { table, element })
        }
        13 => I::ElemDrop(ElemIndex::decode(src)?),
        14 => {
            let dst = TableIndex::decode(src)?;
            let src_table = TableIndex::decode(src)?;
            I::TableCopy(TableTableArgs { dst, src: src_table })
        }
        15 => I::TableGrow(TableIndex::decode(src)?),
        16 => I::TableSize(TableIndex::decode(src)?),
        17 => I::TableFill(TableIndex::decode(src)?),
        _ => return Err(DecodeError::InvalidInput("unknown secondary (0xFC) opcode")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SliceSource;

    fn expr(bytes: &[u8]) -> Result<Expression> {
        decode_expression(&mut SliceSource::new(bytes))
    }

    #[test]
    fn decodes_flat_sequence() {
        let body = expr(&[0x41, 0x01, 0x41, 0x02, 0x6A, 0x0B]).unwrap();
        assert_eq!(
            body,
            vec![
                Instruction::I32Const(1),
                Instruction::I32Const(2),
                Instruction::I32Add,
            ]
        );
    }

    #[test]
    fn decodes_nested_block_and_if_else() {
        // block (result i32)
        //   i32.const 0
        //   if (result i32)
        //     i32.const 1
        //   else
        //     i32.const 2
        //   end
        // end
        let bytes = [
            0x02, 0x7F, // block (result i32)
            0x41, 0x00, // i32.const 0
            0x04, 0x7F, // if (result i32)
            0x41, 0x01, // i32.const 1
            0x05, // else
            0x41, 0x02, // i32.const 2
            0x0B, // end (if)
            0x0B, // end (block)
            0x0B, // end (expression)
        ];
        let body = expr(&bytes).unwrap();
        assert_eq!(body.len(), 1);
        match &body[0] {
            Instruction::Block(BlockType::Value(ValueType::I32), inner) => {
                assert_eq!(inner.len(), 2);
                assert_eq!(inner[0], Instruction::I32Const(0));
                match &inner[1] {
                    Instruction::If(BlockType::Value(ValueType::I32), then_body, else_body) => {
                        assert_eq!(then_body, &vec![Instruction::I32Const(1)]);
                        assert_eq!(else_body, &vec![Instruction::I32Const(2)]);
                    }
                    other => panic!("expected If, got {other:?}"),
                }
            }
            other => panic!("expected Block, got {other:?}"),
        }
    }

    #[test]
    fn decodes_loop_without_else() {
        let body = expr(&[0x03, 0x40, 0x01, 0x0B, 0x0B]).unwrap();
        assert_eq!(
            body,
            vec![Instruction::Loop(BlockType::Empty, vec![Instruction::Nop])]
        );
    }

    #[test]
    fn rejects_unterminated_expression() {
        assert!(expr(&[0x01]).is_err());
    }

    #[test]
    fn rejects_unknown_opcode() {
        assert_eq!(expr(&[0xEE, 0x0B]), Err(DecodeError::InvalidTag(0xEE)));
    }

    #[test]
    fn decodes_bulk_memory_and_sat_trunc() {
        let body = expr(&[0xFC, 0x00, 0x0B]).unwrap();
        assert_eq!(body, vec![Instruction::I32TruncSatF32S]);

        let body = expr(&[0xFC, 0x0B, 0x00, 0x0B]).unwrap();
        assert_eq!(
            body,
            vec![Instruction::MemoryFill(crate::indices::MemoryIndex(0))]
        );
    }

    #[test]
    fn rejects_nonzero_reserved_memory_index() {
        assert!(expr(&[0x3F, 0x01, 0x0B]).is_err());
    }

    #[test]
    fn decodes_br_table() {
        let body = expr(&[0x0E, 0x02, 0x00, 0x01, 0x02, 0x0B]).unwrap();
        assert_eq!(
            body,
            vec![Instruction::BrTable(TableBranch {
                branches: vec![LabelIndex(0), LabelIndex(1)],
                default: LabelIndex(2),
            })]
        );
    }
}
