/// Observer of transfer progress
pub trait Progress {
    /// SELECT succeeded and announced `file_size` bytes
    fn on_selected(&mut self, file_size: usize) {
        let _ = file_size;
    }

    /// A chunk was accepted; `received` of `total` bytes have arrived
    fn on_chunk(&mut self, received: usize, total: usize);
}

/// Progress observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn on_chunk(&mut self, _received: usize, _total: usize) {}
}

impl<F: FnMut(usize, usize)> Progress for F {
    fn on_chunk(&mut self, received: usize, total: usize) {
        self(received, total)
    }
}
