//! Output sinks for the streaming encoder.

use bytes::{BufMut, BytesMut};
use std::io;
use tracing::warn;

/// Destination for encoded bytes.
///
/// `write` returns the sink's backpressure answer: `false` asks the caller
/// to stop writing until the sink drains. `cork`/`uncork` bracket a group of
/// writes that should reach the underlying transport as one flush; sinks
/// that do not batch leave them as no-ops.
pub trait PacketSink {
    fn write(&mut self, bytes: &[u8]) -> bool;

    fn cork(&mut self) {}

    fn uncork(&mut self) {}
}

impl PacketSink for BytesMut {
    fn write(&mut self, bytes: &[u8]) -> bool {
        self.put_slice(bytes);
        true
    }
}

impl PacketSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) -> bool {
        self.extend_from_slice(bytes);
        true
    }
}

impl<S: PacketSink + ?Sized> PacketSink for &mut S {
    fn write(&mut self, bytes: &[u8]) -> bool {
        (**self).write(bytes)
    }

    fn cork(&mut self) {
        (**self).cork()
    }

    fn uncork(&mut self) {
        (**self).uncork()
    }
}

/// Corks a sink for its lifetime.
pub(crate) struct CorkGuard<'a, S: PacketSink + ?Sized> {
    sink: &'a mut S,
}

impl<'a, S: PacketSink + ?Sized> CorkGuard<'a, S> {
    pub(crate) fn new(sink: &'a mut S) -> Self {
        sink.cork();
        Self { sink }
    }

    pub(crate) fn write(&mut self, bytes: &[u8]) -> bool {
        self.sink.write(bytes)
    }
}

impl<S: PacketSink + ?Sized> Drop for CorkGuard<'_, S> {
    fn drop(&mut self) {
        self.sink.uncork();
    }
}

/// Adapts an [`io::Write`] into a [`PacketSink`].
///
/// While corked, writes are buffered and flushed in one `write_all` on the
/// outermost uncork. The first I/O error is kept and every later write
/// reports `false`; retrieve it with [`IoSink::take_error`].
pub struct IoSink<W: io::Write> {
    inner: W,
    pending: BytesMut,
    depth: usize,
    error: Option<io::Error>,
}

impl<W: io::Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pending: BytesMut::new(),
            depth: 0,
            error: None,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn is_corked(&self) -> bool {
        self.depth > 0
    }

    /// Bytes waiting for the outermost uncork.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Returns the writer. Bytes still buffered by a cork are dropped.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_through(&mut self, bytes: &[u8]) -> bool {
        if let Err(e) = self.inner.write_all(bytes) {
            warn!(error = %e, "sink write failed");
            self.error = Some(e);
            return false;
        }
        true
    }
}

impl<W: io::Write> PacketSink for IoSink<W> {
    fn write(&mut self, bytes: &[u8]) -> bool {
        if self.error.is_some() {
            return false;
        }
        if self.is_corked() {
            self.pending.put_slice(bytes);
            return true;
        }
        self.write_through(bytes)
    }

    fn cork(&mut self) {
        self.depth += 1;
    }

    fn uncork(&mut self) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        if self.depth > 0 || self.error.is_some() {
            return;
        }

        let pending = self.pending.split();
        if !pending.is_empty() && !self.write_through(&pending) {
            return;
        }
        if let Err(e) = self.inner.flush() {
            warn!(error = %e, "sink flush failed");
            self.error = Some(e);
        }
    }
}
