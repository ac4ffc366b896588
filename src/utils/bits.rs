use crate::error::{HlsError, Result};

/// A bit-level reader for parsing binary headers.
///
/// Example:
/// ```
/// use hlsmux::utils::BitReader;
///
/// let data = [0b10110011];
/// let mut reader = BitReader::new(&data);
///
/// assert_eq!(reader.read_bit().unwrap(), true);   // 1
/// assert_eq!(reader.read_bits(3).unwrap(), 0b011); // 011
/// ```
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_offset: usize,
    bit_offset: u8,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader from a byte slice
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            byte_offset: 0,
            bit_offset: 0,
        }
    }

    /// Reads a single bit from the stream.
    ///
    /// Returns error if end of data is reached.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.byte_offset >= self.data.len() {
            return Err(HlsError::Codec("Reached end of data".into()));
        }

        let bit = (self.data[self.byte_offset] >> (7 - self.bit_offset)) & 1;
        self.bit_offset += 1;

        if self.bit_offset == 8 {
            self.bit_offset = 0;
            self.byte_offset += 1;
        }

        Ok(bit == 1)
    }

    /// Reads n bits (big-endian) and returns them as a number.
    ///
    /// Returns error if n > 32 or end of data is reached.
    pub fn read_bits(&mut self, n: u32) -> Result<u32> {
        if n > 32 {
            return Err(HlsError::Codec("Too many bits requested".into()));
        }

        let mut value = 0u32;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// Skips n bits in the stream.
    pub fn skip_bits(&mut self, n: u32) -> Result<()> {
        for _ in 0..n {
            self.read_bit()?;
        }
        Ok(())
    }

    /// Returns number of bits available to read.
    pub fn available_bits(&self) -> usize {
        (self.data.len() - self.byte_offset) * 8 - self.bit_offset as usize
    }
}

/// Packs big-endian bit fields into bytes, the mirror of [`BitReader`].
#[derive(Debug, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    bit_offset: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the low `n` bits of `value`, most significant first.
    pub fn write_bits(&mut self, n: u32, value: u64) {
        for i in (0..n).rev() {
            if self.bit_offset == 0 {
                self.data.push(0);
            }
            if (value >> i) & 1 == 1 {
                if let Some(last) = self.data.last_mut() {
                    *last |= 1 << (7 - self.bit_offset);
                }
            }
            self.bit_offset = (self.bit_offset + 1) % 8;
        }
    }

    pub fn write_flag(&mut self, flag: bool) {
        self.write_bits(1, flag as u64);
    }

    /// Returns the written bytes; a trailing partial byte is zero padded.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
