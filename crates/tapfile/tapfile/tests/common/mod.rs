#![allow(dead_code, unreachable_pub)]

use std::collections::VecDeque;
use std::path::Path;
use std::time::{Duration, Instant};

use bytes::{BufMut, Bytes, BytesMut};
use tapfile::TransferConfig;
use tapfile_apdu_core::{CardTransport, TransportError};

/// Transport answering from a fixed script and recording every command
#[derive(Debug, Default)]
pub struct ScriptedCard {
    responses: VecDeque<Result<Bytes, TransportError>>,
    pub commands: Vec<Bytes>,
    /// Arrival time of each entry in `commands`
    pub sent_at: Vec<Instant>,
}

impl ScriptedCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with payload and status word
    pub fn respond(mut self, payload: &[u8], sw: u16) -> Self {
        let mut buf = BytesMut::with_capacity(payload.len() + 2);
        buf.put_slice(payload);
        buf.put_u16(sw);
        self.responses.push_back(Ok(buf.freeze()));
        self
    }

    /// Queue a raw response, status bytes included
    pub fn respond_raw(mut self, raw: &[u8]) -> Self {
        self.responses.push_back(Ok(Bytes::copy_from_slice(raw)));
        self
    }

    /// Queue a transport failure
    pub fn fail(mut self, error: TransportError) -> Self {
        self.responses.push_back(Err(error));
        self
    }

    pub fn instructions(&self) -> Vec<u8> {
        self.commands.iter().map(|c| c[1]).collect()
    }
}

impl CardTransport for ScriptedCard {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.commands.push(Bytes::copy_from_slice(command));
        self.sent_at.push(Instant::now());
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::other("script exhausted")))
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Configuration writing into `dir` without pauses between reads
pub fn config(dir: &Path) -> TransferConfig {
    TransferConfig::new()
        .with_output_dir(dir)
        .with_inter_chunk_delay(Duration::ZERO)
}

/// Deterministic test payload
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}

pub fn md5(data: &[u8]) -> [u8; 16] {
    *tapfile::FileDigest::compute(data).as_bytes()
}
