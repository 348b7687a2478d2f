// Scripted transport for unit tests: each write makes the next queued reply
// available for reading.

use std::collections::VecDeque;

use super::transport::{Result, Transport};

#[derive(Debug, Default)]
pub struct MockTransport {
    replies: VecDeque<Vec<u8>>,
    pending: VecDeque<u8>,
    pub written: Vec<String>,
}

impl MockTransport {
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            replies: replies
                .into_iter()
                .map(|r| r.as_ref().as_bytes().to_vec())
                .collect(),
            ..Self::default()
        }
    }
}

impl Transport for MockTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.push(String::from_utf8_lossy(bytes).into_owned());
        if let Some(reply) = self.replies.pop_front() {
            self.pending.extend(reply);
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.pending.len())
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
