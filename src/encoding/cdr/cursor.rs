// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR cursor for reading CDR-encoded data with proper alignment.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::core::{BagError, Result};

/// Size of the CDR encapsulation header (4 bytes).
pub const CDR_HEADER_SIZE: usize = 4;

/// CDR cursor that tracks position for aligned reads.
///
/// Alignment is measured from the end of the encapsulation header, so the
/// first payload byte is aligned for every primitive size. ROS 2 plain CDR
/// does not reset alignment for nested structures.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rosbag2csv::encoding::cdr::cursor::CdrCursor;
///
/// let data = vec![0x00, 0x01, 0x00, 0x00, 0x2A, 0x00, 0x00, 0x00]; // CDR header + value
/// let mut cursor = CdrCursor::new(&data)?;
/// assert_eq!(cursor.read_u32()?, 42);
/// # Ok(())
/// # }
/// ```
pub struct CdrCursor<'a> {
    /// The data buffer (includes CDR header)
    data: &'a [u8],
    /// Current read position
    offset: usize,
    /// Whether the data uses little endian encoding
    little_endian: bool,
}

macro_rules! read_aligned {
    ($name:ident, $ty:ty, $size:expr, $read:ident) => {
        #[doc = concat!("Read an aligned `", stringify!($ty), "` value.")]
        pub fn $name(&mut self) -> Result<$ty> {
            self.align($size)?;
            let bytes = self.read_bytes($size)?;
            Ok(if self.little_endian {
                LittleEndian::$read(bytes)
            } else {
                BigEndian::$read(bytes)
            })
        }
    };
}

impl<'a> CdrCursor<'a> {
    /// Create a new CDR cursor from CDR-encoded data.
    ///
    /// # CDR Header Format
    ///
    /// The CDR header is 4 bytes:
    /// - Byte 0: Unused (always 0)
    /// - Byte 1: Encapsulation kind (1 = little endian, 0 = big endian)
    /// - Bytes 2-3: Options (ignored)
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < CDR_HEADER_SIZE {
            return Err(BagError::buffer_too_short(CDR_HEADER_SIZE, data.len(), 0));
        }

        Ok(Self {
            data,
            offset: CDR_HEADER_SIZE,
            little_endian: data[1] == 1,
        })
    }

    /// Get the current position relative to the data start.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Get the remaining bytes available to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if at end of buffer.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Whether the payload is little endian.
    #[inline]
    pub fn is_little_endian(&self) -> bool {
        self.little_endian
    }

    /// Align to the specified boundary, relative to the end of the header.
    pub fn align(&mut self, size: usize) -> Result<()> {
        let alignment = (self.offset - CDR_HEADER_SIZE) % size;
        if alignment > 0 {
            self.skip(size - alignment)?;
        }
        Ok(())
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    read_aligned!(read_u16, u16, 2, read_u16);
    read_aligned!(read_i16, i16, 2, read_i16);
    read_aligned!(read_u32, u32, 4, read_u32);
    read_aligned!(read_i32, i32, 4, read_i32);
    read_aligned!(read_u64, u64, 8, read_u64);
    read_aligned!(read_i64, i64, 8, read_i64);
    read_aligned!(read_f32, f32, 4, read_f32);
    read_aligned!(read_f64, f64, 8, read_f64);

    /// Read a byte slice.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(BagError::buffer_too_short(
                count,
                self.remaining(),
                self.offset as u64,
            ));
        }
        let start = self.offset;
        self.offset += count;
        Ok(&self.data[start..self.offset])
    }

    /// Skip bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }
}
