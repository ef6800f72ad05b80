//! Primitive field encoding inside a frame.
//!
//! All integers are big-endian. Strings are a `u32` byte length followed by
//! UTF-8. Booleans are one byte, anything non-zero reads as `true`.

use crate::error::{DecodeError, EncodeError};
use crate::key::Key;

/// Largest string a frame may carry.
pub const MAX_STRING_LEN: usize = 4 * 1024 * 1024;

#[derive(Debug, Default)]
pub struct PacketWriter {
    buf: Vec<u8>,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    pub fn write_str(&mut self, value: &str) -> Result<(), EncodeError> {
        if value.len() > MAX_STRING_LEN {
            return Err(EncodeError::StringTooLong(value.len()));
        }
        self.buf.extend_from_slice(&(value.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    pub fn write_key(&mut self, key: &Key) -> Result<(), EncodeError> {
        self.write_str(key.as_str())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over one received frame.
#[derive(Debug)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if remaining < len {
            return Err(DecodeError::UnexpectedEof {
                needed: len - remaining,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_be_bytes(self.take_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        let [byte] = self.take_array()?;
        Ok(byte != 0)
    }

    pub fn read_str(&mut self) -> Result<&'a str, DecodeError> {
        let len = u32::from_be_bytes(self.take_array()?) as usize;
        if len > MAX_STRING_LEN {
            return Err(DecodeError::Malformed(format!(
                "string field of {len} bytes exceeds the frame limit"
            )));
        }
        std::str::from_utf8(self.take(len)?).map_err(|_| DecodeError::InvalidUtf8)
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        self.read_str().map(str::to_string)
    }

    pub fn read_key(&mut self) -> Result<Key, DecodeError> {
        Ok(Key::parse(self.read_str()?)?)
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_big_endian() {
        let mut writer = PacketWriter::new();
        writer.write_i32(1);
        writer.write_bool(true);
        writer.write_str("ab").unwrap();
        assert_eq!(
            writer.into_bytes(),
            [0, 0, 0, 1, 1, 0, 0, 0, 2, b'a', b'b']
        );
    }

    #[test]
    fn reads_back_in_order() {
        let mut writer = PacketWriter::new();
        writer.write_f64(-0.5);
        writer.write_key(&Key::parse("ns:thing").unwrap()).unwrap();
        writer.write_bool(false);
        let bytes = writer.into_bytes();

        let mut reader = PacketReader::new(&bytes);
        assert_eq!(reader.read_f64().unwrap(), -0.5);
        assert_eq!(reader.read_key().unwrap().as_str(), "ns:thing");
        assert!(!reader.read_bool().unwrap());
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn truncated_input_reports_missing_bytes() {
        let mut reader = PacketReader::new(&[0, 0]);
        assert_eq!(
            reader.read_i32(),
            Err(DecodeError::UnexpectedEof { needed: 2 })
        );

        let mut reader = PacketReader::new(&[0, 0, 0, 5, b'h', b'i']);
        assert_eq!(
            reader.read_str(),
            Err(DecodeError::UnexpectedEof { needed: 3 })
        );
    }

    #[test]
    fn rejects_bad_utf8_and_bad_keys() {
        let mut reader = PacketReader::new(&[0, 0, 0, 1, 0xFF]);
        assert_eq!(reader.read_str(), Err(DecodeError::InvalidUtf8));

        let mut reader = PacketReader::new(&[0, 0, 0, 3, b'a', b' ', b'b']);
        assert!(matches!(reader.read_key(), Err(DecodeError::InvalidKey(_))));
    }
}
