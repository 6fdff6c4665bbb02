use std::thread;

use bytes::Bytes;
use tapfile_apdu_core::{ApduCommand, CardTransport};
use tracing::{debug, info, warn};

use super::{
    Failure, FailureReason, NoProgress, Progress, Step, TransferReport, TransferSession,
    TransferState,
};
use crate::audit::AuditLog;
use crate::checksum::{ChecksumOutcome, FileDigest};
use crate::commands::{GetChecksumCommand, GetMetadataCommand, SelectCommand};
use crate::sink::FileSink;
use crate::{Error, FileIdentity, Result, TransferConfig};

/// Drives one file transfer over a [`CardTransport`]
///
/// The receiver owns the transport for the duration of the run. Protocol failures never
/// surface as `Err`; they end the run early and are recorded in the [`TransferReport`],
/// with every byte received up to that point kept in the temporary artifact.
#[derive(Debug)]
pub struct Receiver<T: CardTransport> {
    transport: T,
    config: TransferConfig,
    state: TransferState,
}

impl<T: CardTransport> Receiver<T> {
    /// Create a receiver, validating `config`
    pub fn new(transport: T, config: TransferConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            config,
            state: TransferState::Idle,
        })
    }

    /// Current state
    pub const fn state(&self) -> TransferState {
        self.state
    }

    /// Configuration in use
    pub const fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Borrow the transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Give the transport back
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Run a transfer without progress reporting
    pub fn run(&mut self) -> TransferReport {
        self.run_with_progress(&mut NoProgress)
    }

    /// Run a transfer, reporting each accepted chunk to `progress`
    pub fn run_with_progress(&mut self, progress: &mut dyn Progress) -> TransferReport {
        self.state = TransferState::Idle;
        let mut report = TransferReport::new(self.config.default_identity.clone());

        let file_size = match self.select() {
            Ok(size) => size as usize,
            Err(error) => {
                let failure = Failure {
                    step: Step::Select,
                    reason: FailureReason::for_select(&error),
                    offset: 0,
                    received: 0,
                    expected: 0,
                    error,
                };
                warn!(%failure, "Could not select the file transfer application");
                report.failure = Some(failure);
                return self.finish(report);
            }
        };
        report.file_size = file_size;
        self.transition(TransferState::Selected);
        info!(file_size, "Sender announced file");
        progress.on_selected(file_size);

        if file_size == 0 {
            info!("Sender announced an empty file, nothing to receive");
            return self.finish(report);
        }

        match self.metadata() {
            Ok(payload) => {
                report.identity =
                    FileIdentity::from_metadata(&payload, &self.config.default_identity);
                report.metadata_received = true;
            }
            Err(error) => {
                warn!(%error, fallback = %report.identity, "Metadata unavailable, using defaults");
            }
        }
        self.transition(TransferState::MetadataKnown);
        info!(file = %report.identity, "Receiving file");

        let mut session = TransferSession::new(file_size, self.config.chunk_size);
        let mut audit = if self.config.audit_log {
            AuditLog::open(self.config.output_dir.join(report.identity.audit_file_name()))
        } else {
            AuditLog::disabled()
        };
        if audit.is_enabled() {
            report.audit_path = Some(audit.path().to_path_buf());
        }

        self.transition(TransferState::Receiving);
        match FileSink::create(&self.config.output_dir, &report.identity) {
            Ok(mut sink) => {
                report.failure = self.receive(&mut session, &mut sink, &mut audit, progress);
                match sink.close() {
                    Ok(artifact) => report.artifact = Some(artifact),
                    Err(error) => {
                        warn!(%error, "Failed to close temporary artifact");
                        if report.failure.is_none() {
                            report.failure =
                                Some(Self::failure(Step::Write, &session, error.into()));
                        }
                    }
                }
            }
            Err(error) => {
                let failure = Self::failure(Step::Write, &session, error.into());
                warn!(%failure, "Could not create temporary artifact");
                report.failure = Some(failure);
            }
        }
        report.total_received = session.total_received();
        report.chunks = session.chunks();

        self.transition(TransferState::Verifying);
        let calculated = session.digest();
        report.checksum = Some(self.verify(&calculated));

        if self.config.verify_written {
            if let Some(artifact) = &report.artifact {
                report.written_digest_matches = match FileDigest::of_file(artifact.temp_path()) {
                    Ok(written) => Some(written == calculated),
                    Err(error) => {
                        warn!(%error, "Could not re-read temporary artifact");
                        None
                    }
                };
                if report.written_digest_matches == Some(false) {
                    warn!(
                        path = %artifact.temp_path().display(),
                        "Written artifact differs from the received bytes"
                    );
                }
            }
        }

        self.finish(report)
    }

    fn select(&mut self) -> Result<u32> {
        let command = SelectCommand::with_aid(self.config.aid.clone());
        debug!(aid = %hex::encode(command.aid()), "Selecting application");
        self.exchange(&command)
    }

    fn metadata(&mut self) -> Result<Bytes> {
        self.exchange(&GetMetadataCommand)
    }

    fn receive(
        &mut self,
        session: &mut TransferSession,
        sink: &mut FileSink,
        audit: &mut AuditLog,
        progress: &mut dyn Progress,
    ) -> Option<Failure> {
        while !session.is_complete() {
            let offset = session.total_received();

            let chunk = match session
                .next_command()
                .and_then(|command| self.exchange(&command))
            {
                Ok(chunk) => chunk,
                Err(error) => return Some(Self::read_failure(session, error)),
            };

            let (index, accepted) = match session.accept(&chunk) {
                Ok(accepted) => accepted,
                Err(error) => return Some(Self::read_failure(session, error)),
            };

            if let Err(error) = sink.write(accepted) {
                let failure = Self::failure(Step::Write, session, error.into());
                warn!(%failure, "Could not write chunk");
                return Some(failure);
            }
            audit.record(index, offset, accepted);

            debug!(
                chunk = index,
                offset,
                len = accepted.len(),
                dropped = chunk.len() - accepted.len(),
                "Accepted chunk"
            );
            progress.on_chunk(session.total_received(), session.file_size());

            if !session.is_complete() && !self.config.inter_chunk_delay.is_zero() {
                thread::sleep(self.config.inter_chunk_delay);
            }
        }
        None
    }

    fn verify(&mut self, calculated: &FileDigest) -> ChecksumOutcome {
        match self.exchange(&GetChecksumCommand) {
            Ok(received) => {
                let outcome = ChecksumOutcome::compare(&received, calculated);
                if outcome.is_verified() {
                    info!(digest = %calculated, "Checksum verified");
                } else {
                    warn!(%outcome, "Checksum mismatch");
                }
                outcome
            }
            Err(error) => {
                warn!(%error, "Checksum unavailable, verification skipped");
                ChecksumOutcome::Unavailable {
                    reason: error.to_string(),
                }
            }
        }
    }

    fn exchange<C>(&mut self, command: &C) -> Result<C::Success>
    where
        C: ApduCommand<Error = Error>,
    {
        let response = self.transport.transmit_raw(&command.to_bytes())?;
        C::parse_response_raw(&response)
    }

    fn read_failure(session: &TransferSession, error: Error) -> Failure {
        let failure = Self::failure(Step::Read, session, error);
        warn!(%failure, "Read loop stopped");
        failure
    }

    fn failure(step: Step, session: &TransferSession, error: Error) -> Failure {
        let reason = match step {
            Step::Write => FailureReason::SinkError,
            Step::Read => FailureReason::for_read(&error),
            Step::Select => FailureReason::for_select(&error),
        };
        Failure {
            step,
            reason,
            offset: session.total_received(),
            received: session.total_received(),
            expected: session.file_size(),
            error,
        }
    }

    fn transition(&mut self, next: TransferState) {
        debug!(from = %self.state, to = %next, "Transfer state changed");
        self.state = next;
    }

    fn finish(&mut self, mut report: TransferReport) -> TransferReport {
        let end = if report.failure.is_some() {
            TransferState::Failed
        } else {
            TransferState::Done
        };
        self.transition(end);
        report.state = end;

        info!(
            state = %end,
            received = report.total_received,
            expected = report.file_size,
            verified = report.checksum_verified(),
            "Transfer finished"
        );
        report
    }
}
