use log::warn;

const MAX_PENDING_BYTES: usize = 64 * 1024;

/// Reassembles complete lines from output that arrives in arbitrary pieces.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line it completed, in order. A
    /// trailing partial line is held until its newline arrives.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            if self.pending.len() > MAX_PENDING_BYTES {
                warn!("Discarding {} bytes of output without a line break", self.pending.len());
                self.pending.clear();
            }
            return Vec::new();
        };

        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        String::from_utf8_lossy(&complete)
            .lines()
            .map(str::to_owned)
            .collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
