use alloc::vec::Vec;

/// A [BoundedBuffer] was asked to hold more than it can.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapacityError {
    pub needed: usize,
    pub capacity: usize,
}

#[cfg(feature = "std")]
impl std::error::Error for CapacityError {}

impl core::fmt::Display for CapacityError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "capacity overflow: {} bytes needed, {} available",
            self.needed, self.capacity
        )
    }
}

/// A byte buffer whose capacity is fixed when it is created.
///
/// Storage is allocated once, up front. Writes that would go past the
/// capacity fail with [CapacityError] and leave the contents alone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundedBuffer {
    buffer: Vec<u8>,
    capacity: usize,
}

impl BoundedBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns [true] if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Drop up to `n` bytes from the end.
    pub fn shrink(&mut self, n: usize) {
        let len = self.buffer.len().saturating_sub(n);
        self.buffer.truncate(len);
    }

    /// Append `bytes`, or fail without changing anything.
    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), CapacityError> {
        let needed = self.buffer.len() + bytes.len();
        if needed > self.capacity {
            return Err(CapacityError {
                needed,
                capacity: self.capacity,
            });
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Replace the contents with `bytes`, or fail without changing
    /// anything.
    pub fn replace(&mut self, bytes: &[u8]) -> Result<(), CapacityError> {
        if bytes.len() > self.capacity {
            return Err(CapacityError {
                needed: bytes.len(),
                capacity: self.capacity,
            });
        }
        self.buffer.clear();
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Read at most `max` bytes from a reader onto the end.
    ///
    /// Returns the number of bytes read, which is zero if the reader
    /// is exhausted or the buffer is full.
    pub fn read<R>(&mut self, reader: &mut R, max: usize) -> Result<usize, R::Error>
    where
        R: embedded_io::Read,
    {
        let len = self.buffer.len();
        let want = max.min(self.remaining());
        if want == 0 {
            return Ok(0);
        }

        self.buffer.resize(len + want, 0);
        match reader.read(&mut self.buffer[len..]) {
            Ok(amt) => {
                self.buffer.truncate(len + amt);
                Ok(amt)
            }
            Err(e) => {
                self.buffer.truncate(len);
                Err(e)
            }
        }
    }
}
