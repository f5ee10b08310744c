use crate::errors::PersistenceError;

/// Little-endian encoder for auxiliary file payloads.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a list length as the `u32` count prefix.
    pub fn write_count(&mut self, count: usize) -> Result<(), PersistenceError> {
        let count = u32::try_from(count).map_err(|_| PersistenceError::InvalidAttribute {
            attribute: "count".to_string(),
            value: count.to_string(),
            expected: "a count that fits in 32 bits",
        })?;
        self.write_u32(count);
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Little-endian decoder over a borrowed payload.
#[derive(Debug)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Fail early when fewer than `bytes` remain, before allocating for a count.
    pub fn ensure(&self, bytes: usize) -> Result<(), PersistenceError> {
        if bytes > self.remaining() {
            return Err(PersistenceError::UnexpectedEof {
                wanted: bytes,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u32(&mut self) -> Result<u32, PersistenceError> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, PersistenceError> {
        Ok(f32::from_le_bytes(self.take::<4>()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, PersistenceError> {
        Ok(f64::from_le_bytes(self.take::<8>()?))
    }

    /// Read a `u32` count prefix and check that `count * item_size` bytes follow.
    pub fn read_count(&mut self, item_size: usize) -> Result<usize, PersistenceError> {
        let count = self.read_u32()? as usize;
        self.ensure(count.saturating_mul(item_size))?;
        Ok(count)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], PersistenceError> {
        self.ensure(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_prefix_is_little_endian() {
        let mut w = BinaryWriter::new();
        w.write_count(3).unwrap();
        assert_eq!(w.into_bytes(), vec![3, 0, 0, 0]);
    }

    #[test]
    fn values_read_back() {
        let mut w = BinaryWriter::new();
        w.write_u32(0xDEAD_BEEF);
        w.write_f32(1.5);
        w.write_f64(-2.25);
        let bytes = w.into_bytes();

        let mut r = BinaryReader::new(&bytes);
        assert_eq!(r.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert_eq!(r.read_f64().unwrap(), -2.25);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let bytes = [1u8, 0];
        let mut r = BinaryReader::new(&bytes);
        assert_eq!(
            r.read_u32(),
            Err(PersistenceError::UnexpectedEof {
                wanted: 4,
                available: 2
            })
        );
    }

    #[test]
    fn oversized_count_fails_before_allocation() {
        let mut w = BinaryWriter::new();
        w.write_u32(u32::MAX);
        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        assert!(matches!(
            r.read_count(8),
            Err(PersistenceError::UnexpectedEof { .. })
        ));
    }
}
