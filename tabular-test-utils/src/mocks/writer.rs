//! In-memory writer for text progress output

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tabular_core::progress::SharedWriter;

/// Cloneable in-memory writer
///
/// Hand [`SharedBuffer::writer`] to a backend and read the text back with
/// [`SharedBuffer::lines`].
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer sharing this buffer
    pub fn writer(&self) -> SharedWriter {
        Arc::new(Mutex::new(self.clone()))
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        let bytes = self.inner.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("buffer lock poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
