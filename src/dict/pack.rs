use crate::dict::compile_error::CompileError;

/// Pack a literal string into the interpreter's length-prefixed form.
///
/// The byte stream `[len, b0, b1, ...]` goes two bytes per 16-bit unit,
/// high byte first; an odd final byte is zero-padded low. The interpreter
/// unpacks by the inverse rule, so this layout is bit-exact by contract.
pub fn pack(bytes: &[u8]) -> Result<Vec<u16>, CompileError> {
    if bytes.len() > 255 {
        return Err(CompileError::string_too_long(bytes.len()));
    }

    let mut units = Vec::with_capacity((bytes.len() + 2) / 2);
    let mut high = bytes.len() as u8;
    let mut have_high = true;

    for &b in bytes {
        if have_high {
            units.push((high as u16) << 8 | b as u16);
            have_high = false;
        } else {
            high = b;
            have_high = true;
        }
    }
    if have_high {
        units.push((high as u16) << 8);
    }

    Ok(units)
}
