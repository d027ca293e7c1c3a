/*
This code is part of the prominence-tools terrain analysis toolkit.
License: MIT
*/
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::prelude::*;
use std::io::{Result, SeekFrom};

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub enum Endianness {
    #[default]
    LittleEndian,
    BigEndian,
}

impl Endianness {
    pub fn from_str<'a>(val: &'a str) -> Endianness {
        let val_lc: &str = &val.to_lowercase();
        if val_lc.contains("lsb")
            || val_lc.contains("little")
            || val_lc.contains("intel")
            || val_lc.contains("least")
        {
            return Endianness::LittleEndian;
        }
        Endianness::BigEndian
    }
}

/// A reader that decodes binary values of a configurable byte order.
pub struct ByteOrderReader<R: Read + Seek> {
    is_le: bool,
    reader: R,
    pos: usize,
    len: usize,
}

impl<R: Read + Seek> ByteOrderReader<R> {
    pub fn new(reader: R, byte_order: Endianness) -> ByteOrderReader<R> {
        let is_le = byte_order == Endianness::LittleEndian;
        let mut bor = ByteOrderReader {
            reader: reader,
            is_le: is_le,
            pos: 0usize,
            len: 0, // don't know the length yet
        };
        // now get the length
        let len = bor.reader.seek(SeekFrom::End(0)).unwrap() as usize;
        bor.len = len;
        bor.seek(0); // return the cursor to the start.
        bor
    }

    pub fn set_byte_order(&mut self, byte_order: Endianness) {
        self.is_le = byte_order == Endianness::LittleEndian;
    }

    pub fn seek(&mut self, position: usize) {
        self.pos = position;
        self.reader.seek(SeekFrom::Start(self.pos as u64)).unwrap();
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn read_utf8(&mut self, length: usize) -> String {
        let mut bytes = vec![0u8; length];
        self.reader.read_exact(&mut bytes).unwrap();
        let val = String::from_utf8_lossy(&bytes).to_string();
        self.pos += length;
        val
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.pos += 1;
        self.reader.read_u8()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.pos += 2;
        if self.is_le {
            self.reader.read_u16::<LittleEndian>()
        } else {
            self.reader.read_u16::<BigEndian>()
        }
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.pos += 4;
        if self.is_le {
            self.reader.read_u32::<LittleEndian>()
        } else {
            self.reader.read_u32::<BigEndian>()
        }
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.pos += 1;
        self.reader.read_i8()
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.pos += 2;
        if self.is_le {
            self.reader.read_i16::<LittleEndian>()
        } else {
            self.reader.read_i16::<BigEndian>()
        }
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.pos += 4;
        if self.is_le {
            self.reader.read_i32::<LittleEndian>()
        } else {
            self.reader.read_i32::<BigEndian>()
        }
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.pos += 4;
        if self.is_le {
            self.reader.read_f32::<LittleEndian>()
        } else {
            self.reader.read_f32::<BigEndian>()
        }
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.pos += 8;
        if self.is_le {
            self.reader.read_f64::<LittleEndian>()
        } else {
            self.reader.read_f64::<BigEndian>()
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ByteOrderReader, Endianness};
    use std::io::Cursor;

    #[test]
    fn test_read_mixed_le() {
        let mut bytes = vec![];
        bytes.extend_from_slice(&42u16.to_le_bytes());
        bytes.extend_from_slice(&(-7i32).to_le_bytes());
        bytes.extend_from_slice(&1234.5f64.to_le_bytes());
        let mut r = ByteOrderReader::new(Cursor::new(bytes), Endianness::LittleEndian);
        assert_eq!(r.read_u16().unwrap(), 42);
        assert_eq!(r.read_i32().unwrap(), -7);
        assert_eq!(r.read_f64().unwrap(), 1234.5);
        assert_eq!(r.pos(), 14);
    }

    #[test]
    fn test_read_f32_be() {
        let bytes = 8.25f32.to_be_bytes().to_vec();
        let mut r = ByteOrderReader::new(Cursor::new(bytes), Endianness::BigEndian);
        assert_eq!(r.read_f32().unwrap(), 8.25);
    }

    #[test]
    fn test_endianness_from_str() {
        assert_eq!(Endianness::from_str("LITTLE_ENDIAN"), Endianness::LittleEndian);
        assert_eq!(Endianness::from_str("lsbfirst"), Endianness::LittleEndian);
        assert_eq!(Endianness::from_str("big"), Endianness::BigEndian);
    }
}
