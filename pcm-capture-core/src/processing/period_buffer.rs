/// Storage for exactly one hardware period of interleaved audio.
///
/// Allocated once with the ring and reused in place for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBuffer {
    data: Vec<u8>,
}

impl PeriodBuffer {
    pub fn new(len: usize) -> Self {
        Self { data: vec![0; len] }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Copy this period into `dest`, which must be exactly one period long.
    pub fn copy_to(&self, dest: &mut [u8]) {
        dest.copy_from_slice(&self.data);
    }
}
