//! The top-level [module decoder](https://webassembly.github.io/spec/core/binary/modules.html#binary-module).

use crate::error::{DecodeError, Result};
use crate::io::{decode_u32, reclassify_eof, ByteSource};
use crate::sections::{decode_section, Section};

const MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];
const VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// A decoded WebAssembly module: its header has already been validated, and
/// what remains is the ordered sequence of sections exactly as they appeared
/// in the binary.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Module {
    pub sections: Vec<Section>,
}

fn read_header_field(src: &mut dyn ByteSource, expected: [u8; 4], on_mismatch: DecodeError) -> Result<()> {
    let mut buf = [0u8; 4];
    let n = src.read(&mut buf);
    if n != buf.len() {
        return Err(DecodeError::UnexpectedEof);
    }
    if buf != expected {
        return Err(on_mismatch);
    }
    Ok(())
}

/// Decodes a complete module from `src`.
///
/// The section-reading loop distinguishes a clean end of module (the byte
/// source is exhausted exactly where the next section id would begin) from a
/// truncated one (exhaustion anywhere else yields [`DecodeError::UnexpectedEof`]):
/// only a zero-byte read attempting the next section id is treated as
/// termination.
pub fn decode_module(src: &mut dyn ByteSource) -> Result<Module> {
    read_header_field(src, MAGIC, DecodeError::InvalidModuleMagic)?;
    read_header_field(src, VERSION, DecodeError::InvalidModuleVersion)?;

    let mut sections = Vec::new();
    let mut last_id: Option<u8> = None;
    loop {
        let mut id_buf = [0u8; 1];
        if src.read(&mut id_buf) == 0 {
            break;
        }
        let id = id_buf[0];
        let size = decode_u32(src).map_err(|err| reclassify_eof(src, err, DecodeError::ExpectedSize))?;

        if id != 0 {
            if let Some(last) = last_id {
                if id <= last {
                    return Err(DecodeError::InvalidInput(
                        "non-custom sections must appear at most once, in ascending id order",
                    ));
                }
            }
            last_id = Some(id);
        }

        sections.push(decode_section(id, size, src)?);
    }

    Ok(Module { sections })
}
