//! Copying strings into caller-owned byte buffers

/// What a string accessor wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferWrite {
    /// Bytes written, excluding the NUL terminator
    pub written: usize,
    /// Buffer size needed for the whole string plus terminator
    pub required: usize,
    pub truncated: bool,
}

/// Writes `value` NUL-terminated into `buffer`, cutting on a char boundary if
/// it does not fit. Never writes past `buffer.len()`.
pub fn write_str(value: &str, buffer: &mut [u8]) -> BufferWrite {
    let required = value.len() + 1;
    if buffer.is_empty() {
        return BufferWrite {
            written: 0,
            required,
            truncated: true,
        };
    }
    let mut written = value.len().min(buffer.len() - 1);
    while !value.is_char_boundary(written) {
        written -= 1;
    }
    buffer[..written].copy_from_slice(&value.as_bytes()[..written]);
    buffer[written] = 0;
    BufferWrite {
        written,
        required,
        truncated: written < value.len(),
    }
}
