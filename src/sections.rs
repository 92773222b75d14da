//! [Section decoders](https://webassembly.github.io/spec/core/binary/modules.html#sections).
//!
//! Every section (and every code entry within the code section) is parsed
//! through a [`Bounded`] view sized to its declared length; a successful
//! decode must leave that view with nothing left over, or the section's
//! declared size disagreed with its actual contents.

use crate::error::{DecodeError, Result};
use crate::indices::{DataIndex, FunctionIndex, GlobalIndex, MemoryIndex, TableIndex, TypeIndex};
use crate::instructions::{decode_expression, Expression};
use crate::io::{
    decode_bytes, decode_name, decode_u32, decode_u8, decode_vec, reclassify_eof, Bounded, ByteSource,
};
use crate::types::{FunctionType, GlobalType, MemoryType, TableType, ValueType};

fn decode_kind_tag(src: &mut dyn ByteSource) -> Result<u8> {
    decode_u8(src).map_err(|err| reclassify_eof(src, err, DecodeError::ExpectedKindTag))
}

fn decode_size(src: &mut dyn ByteSource) -> Result<u32> {
    decode_u32(src).map_err(|err| reclassify_eof(src, err, DecodeError::ExpectedSize))
}

/// Like [`decode_kind_tag`] but for the LEB128-encoded discriminants used by
/// the element and data segment encodings, rather than a single raw byte.
fn decode_kind_tag_u32(src: &mut dyn ByteSource) -> Result<u32> {
    decode_u32(src).map_err(|err| reclassify_eof(src, err, DecodeError::ExpectedKindTag))
}

/// A custom section: a name followed by an opaque payload this crate does
/// not interpret.
#[derive(Debug, PartialEq, Clone)]
pub struct CustomSection {
    pub name: String,
    pub data: Vec<u8>,
}

/// The kind of external entity an [`Import`] or [`Export`] refers to.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ImportDesc {
    Function(TypeIndex),
    Table(TableType),
    Memory(MemoryType),
    Global(GlobalType),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Import {
    pub module: String,
    pub name: String,
    pub desc: ImportDesc,
}

fn decode_import_desc(src: &mut dyn ByteSource) -> Result<ImportDesc> {
    match decode_kind_tag(src)? {
        0x00 => Ok(ImportDesc::Function(TypeIndex::decode(src)?)),
        0x01 => Ok(ImportDesc::Table(TableType::decode(src)?)),
        0x02 => Ok(ImportDesc::Memory(MemoryType::decode(src)?)),
        0x03 => Ok(ImportDesc::Global(GlobalType::decode(src)?)),
        other => Err(DecodeError::InvalidTag(other)),
    }
}

fn decode_import(src: &mut dyn ByteSource) -> Result<Import> {
    let module = decode_name(src, None)?;
    let name = decode_name(src, None)?;
    let desc = decode_import_desc(src)?;
    Ok(Import { module, name, desc })
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ExportDesc {
    Function(FunctionIndex),
    Table(TableIndex),
    Memory(MemoryIndex),
    Global(GlobalIndex),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Export {
    pub name: String,
    pub desc: ExportDesc,
}

fn decode_export_desc(src: &mut dyn ByteSource) -> Result<ExportDesc> {
    match decode_kind_tag(src)? {
        0x00 => Ok(ExportDesc::Function(FunctionIndex::decode(src)?)),
        0x01 => Ok(ExportDesc::Table(TableIndex::decode(src)?)),
        0x02 => Ok(ExportDesc::Memory(MemoryIndex::decode(src)?)),
        0x03 => Ok(ExportDesc::Global(GlobalIndex::decode(src)?)),
        other => Err(DecodeError::InvalidTag(other)),
    }
}

fn decode_export(src: &mut dyn ByteSource) -> Result<Export> {
    let name = decode_name(src, None)?;
    let desc = decode_export_desc(src)?;
    Ok(Export { name, desc })
}

/// A module-level global: its type together with its constant initializer.
#[derive(Debug, PartialEq, Clone)]
pub struct Global {
    pub ty: GlobalType,
    pub init: Expression,
}

fn decode_global(src: &mut dyn ByteSource) -> Result<Global> {
    let ty = GlobalType::decode(src)?;
    let init = decode_expression(src)?;
    Ok(Global { ty, init })
}

/// A group of locals of the same type, as declared at the head of a function body.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Locals {
    pub count: u32,
    pub value_type: ValueType,
}

fn decode_locals(src: &mut dyn ByteSource) -> Result<Locals> {
    let count = decode_u32(src)?;
    let value_type = ValueType::decode(src)?;
    Ok(Locals { count, value_type })
}

/// A function body: its locals declarations and its instruction expression.
#[derive(Debug, PartialEq, Clone)]
pub struct Code {
    pub locals: Vec<Locals>,
    pub body: Expression,
}

fn decode_code(src: &mut dyn ByteSource) -> Result<Code> {
    let size = decode_size(src)? as usize;
    let mut body_view = Bounded::new(src, size);
    let hint = Some(body_view.remaining() as u64);
    let locals = decode_vec(&mut body_view, hint, |s| decode_locals(s))?;
    let body = decode_expression(&mut body_view)?;
    if body_view.remaining() != 0 {
        return Err(DecodeError::InvalidSize {
            expected: size as u32,
            actual: (size - body_view.remaining()) as u32,
        });
    }
    Ok(Code { locals, body })
}

/// The initializer location of a [`Data`] segment.
#[derive(Debug, PartialEq, Clone)]
pub enum DataMode {
    Active {
        memory: MemoryIndex,
        offset: Expression,
    },
    Passive,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Data {
    pub mode: DataMode,
    pub bytes: Vec<u8>,
}

fn decode_data(src: &mut dyn ByteSource) -> Result<Data> {
    let mode = match decode_kind_tag_u32(src)? {
        0 => {
            let offset = decode_expression(src)?;
            DataMode::Active {
                memory: MemoryIndex(0),
                offset,
            }
        }
        1 => DataMode::Passive,
        2 => {
            let memory = MemoryIndex::decode(src)?;
            if memory.0 != 0 {
                return Err(DecodeError::InvalidInput(
                    "nonzero reserved memory index (multi-memory is not supported)",
                ));
            }
            let offset = decode_expression(src)?;
            DataMode::Active { memory, offset }
        }
        other => return Err(DecodeError::InvalidTag(other as u8)),
    };
    let bytes = decode_bytes(src, None)?;
    Ok(Data { mode, bytes })
}

/// An entry of the element section: a table, its offset expression (empty
/// for passive/declarative segments), and its function-index initializer list.
#[derive(Debug, PartialEq, Clone)]
pub struct ElementSegment {
    pub table: TableIndex,
    pub offset: Expression,
    pub init: Vec<FunctionIndex>,
}

fn decode_elem_kind(src: &mut dyn ByteSource) -> Result<()> {
    let kind = decode_kind_tag(src)?;
    if kind != 0x00 {
        return Err(DecodeError::InvalidTag(kind));
    }
    Ok(())
}

fn decode_element_segment(src: &mut dyn ByteSource) -> Result<ElementSegment> {
    match decode_kind_tag_u32(src)? {
        0 => {
            let offset = decode_expression(src)?;
            let init = decode_vec(src, None, |s| FunctionIndex::decode(s))?;
            Ok(ElementSegment {
                table: TableIndex(0),
                offset,
                init,
            })
        }
        1 => {
            decode_elem_kind(src)?;
            let init = decode_vec(src, None, |s| FunctionIndex::decode(s))?;
            Ok(ElementSegment {
                table: TableIndex(0),
                offset: Vec::new(),
                init,
            })
        }
        2 => {
            let table = TableIndex::decode(src)?;
            let offset = decode_expression(src)?;
            decode_elem_kind(src)?;
            let init = decode_vec(src, None, |s| FunctionIndex::decode(s))?;
            Ok(ElementSegment { table, offset, init })
        }
        3 => {
            decode_elem_kind(src)?;
            let init = decode_vec(src, None, |s| FunctionIndex::decode(s))?;
            Ok(ElementSegment {
                table: TableIndex(0),
                offset: Vec::new(),
                init,
            })
        }
        4 | 5 | 6 | 7 => Err(DecodeError::NotImplemented(
            "expression-initialized element segment encodings are not supported",
        )),
        _ => Err(DecodeError::InvalidInput("unknown element segment encoding")),
    }
}

/// One top-level section of a module, carrying its parsed payload.
#[derive(Debug, PartialEq, Clone)]
pub enum Section {
    Custom(CustomSection),
    Type(Vec<FunctionType>),
    Import(Vec<Import>),
    Function(Vec<TypeIndex>),
    Table(Vec<TableType>),
    Memory(Vec<MemoryType>),
    Global(Vec<Global>),
    Export(Vec<Export>),
    Start(FunctionIndex),
    Element(Vec<ElementSegment>),
    Code(Vec<Code>),
    Data(Vec<Data>),
    DataCount(u32),
}

impl Section {
    /// The section ID this variant's kind is tagged with in the binary format.
    pub fn id(&self) -> u8 {
        match self {
            Section::Custom(_) => 0,
            Section::Type(_) => 1,
            Section::Import(_) => 2,
            Section::Function(_) => 3,
            Section::Table(_) => 4,
            Section::Memory(_) => 5,
            Section::Global(_) => 6,
            Section::Export(_) => 7,
            Section::Start(_) => 8,
            Section::Element(_) => 9,
            Section::Code(_) => 10,
            Section::Data(_) => 11,
            Section::DataCount(_) => 12,
        }
    }
}

/// Decodes one section given its id and declared payload size, wrapping
/// `src` in a [`Bounded`] view for exactly `size` bytes and requiring that
/// view be fully consumed on success.
pub(crate) fn decode_section(id: u8, size: u32, src: &mut dyn ByteSource) -> Result<Section> {
    let mut view = Bounded::new(src, size as usize);
    let hint = Some(view.remaining() as u64);
    let section = match id {
        0 => {
            let name = decode_name(&mut view, hint)?;
            let data = view.read_remaining()?;
            Section::Custom(CustomSection { name, data })
        }
        1 => Section::Type(decode_vec(&mut view, hint, |s| FunctionType::decode(s))?),
        2 => Section::Import(decode_vec(&mut view, hint, |s| decode_import(s))?),
        3 => Section::Function(decode_vec(&mut view, hint, |s| TypeIndex::decode(s))?),
        4 => Section::Table(decode_vec(&mut view, hint, |s| TableType::decode(s))?),
        5 => Section::Memory(decode_vec(&mut view, hint, |s| MemoryType::decode(s))?),
        6 => Section::Global(decode_vec(&mut view, hint, |s| decode_global(s))?),
        7 => Section::Export(decode_vec(&mut view, hint, |s| decode_export(s))?),
        8 => Section::Start(FunctionIndex::decode(&mut view)?),
        9 => Section::Element(decode_vec(&mut view, hint, |s| decode_element_segment(s))?),
        10 => Section::Code(decode_vec(&mut view, hint, |s| decode_code(s))?),
        11 => Section::Data(decode_vec(&mut view, hint, |s| decode_data(s))?),
        12 => Section::DataCount(decode_u32(&mut view)?),
        other => return Err(DecodeError::InvalidTag(other)),
    };
    if view.remaining() != 0 {
        return Err(DecodeError::InvalidSize {
            expected: size,
            actual: size - view.remaining() as u32,
        });
    }
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SliceSource;

    #[test]
    fn decodes_type_section() {
        let bytes = [0x01, 0x60, 0x00, 0x00];
        let mut src = SliceSource::new(&bytes);
        let section = decode_section(1, 4, &mut src).unwrap();
        assert_eq!(
            section,
            Section::Type(vec![FunctionType {
                params: vec![],
                results: vec![],
            }])
        );
    }

    #[test]
    fn rejects_section_with_leftover_bytes() {
        let bytes = [0x01, 0x60, 0x00, 0x00, 0xAA];
        let mut src = SliceSource::new(&bytes);
        assert!(matches!(
            decode_section(1, 5, &mut src),
            Err(DecodeError::InvalidSize { .. })
        ));
    }

    #[test]
    fn decodes_import_and_export() {
        let bytes = [
            0x01, // one import
            1, b'm', // module "m"
            1, b'n', // name "n"
            0x00, 0x05, // func import, type index 5
        ];
        let mut src = SliceSource::new(&bytes);
        let section = decode_section(2, bytes.len() as u32, &mut src).unwrap();
        assert_eq!(
            section,
            Section::Import(vec![Import {
                module: "m".into(),
                name: "n".into(),
                desc: ImportDesc::Function(TypeIndex(5)),
            }])
        );
    }

    #[test]
    fn decodes_active_data_segment() {
        let bytes = [
            0x01, // one segment
            0x00, // active, implicit memory 0
            0x41, 0x00, 0x0B, // i32.const 0; end
            0x02, b'h', b'i', // 2-byte payload "hi"
        ];
        let mut src = SliceSource::new(&bytes);
        let section = decode_section(11, bytes.len() as u32, &mut src).unwrap();
        match section {
            Section::Data(mut data) => {
                let entry = data.remove(0);
                assert_eq!(entry.bytes, b"hi");
                assert!(matches!(entry.mode, DataMode::Active { memory, .. } if memory.0 == 0));
            }
            other => panic!("expected Data, got {other:?}"),
        }
    }

    #[test]
    fn decodes_element_segment_encoding_zero() {
        let bytes = [
            0x01, // one segment
            0x00, // encoding 0
            0x41, 0x00, 0x0B, // offset: i32.const 0; end
            0x01, 0x02, // init: one FunctionIndex(2)
        ];
        let mut src = SliceSource::new(&bytes);
        let section = decode_section(9, bytes.len() as u32, &mut src).unwrap();
        assert_eq!(
            section,
            Section::Element(vec![ElementSegment {
                table: TableIndex(0),
                offset: vec![crate::instructions::Instruction::I32Const(0)],
                init: vec![FunctionIndex(2)],
            }])
        );
    }

    #[test]
    fn decodes_declarative_element_segment_encoding_three() {
        let bytes = [
            0x01, // one segment
            0x03, // encoding 3: declarative, elemkind + vec(funcidx)
            0x00, // elemkind: funcref
            0x01, 0x02, // init: one FunctionIndex(2)
        ];
        let mut src = SliceSource::new(&bytes);
        let section = decode_section(9, bytes.len() as u32, &mut src).unwrap();
        assert_eq!(
            section,
            Section::Element(vec![ElementSegment {
                table: TableIndex(0),
                offset: Vec::new(),
                init: vec![FunctionIndex(2)],
            }])
        );
    }

    #[test]
    fn rejects_unsupported_element_segment_encoding() {
        let bytes = [0x01, 0x04];
        let mut src = SliceSource::new(&bytes);
        assert_eq!(
            decode_section(9, bytes.len() as u32, &mut src),
            Err(DecodeError::NotImplemented(
                "expression-initialized element segment encodings are not supported"
            ))
        );
    }

    #[test]
    fn decodes_code_section() {
        // one entry, size 4: locals-count 0, `local.get 0`, end
        let bytes = [0x01, 0x04, 0x00, 0x20, 0x00, 0x0B];
        let mut src = SliceSource::new(&bytes);
        let section = decode_section(10, bytes.len() as u32, &mut src).unwrap();
        assert_eq!(
            section,
            Section::Code(vec![Code {
                locals: vec![],
                body: vec![crate::instructions::Instruction::LocalGet(
                    crate::indices::LocalIndex(0)
                )],
            }])
        );
    }
}
