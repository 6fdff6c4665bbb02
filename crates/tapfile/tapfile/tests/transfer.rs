mod common;

use std::fs;
use std::time::Instant;

use common::{ScriptedCard, config, md5, payload};
use hex_literal::hex;
use tapfile::constants::INTER_CHUNK_DELAY;
use tapfile::{
    ChecksumOutcome, Error, FailureReason, KeepReason, Receiver, Resolution, Resolver, Step,
    TransferState,
};
use tapfile_apdu_core::{StatusWord, TransportError};

const OK: u16 = 0x9000;

fn size_field(size: u32) -> [u8; 4] {
    size.to_be_bytes()
}

#[test]
fn five_hundred_bytes_in_three_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let data = payload(500);
    let mut card = ScriptedCard::new()
        .respond(&size_field(500), OK)
        .respond(b"report\npdf", OK)
        .respond(&data[..230], OK)
        .respond(&data[230..460], OK)
        .respond(&data[460..], OK)
        .respond(&md5(&data), OK);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    assert_eq!(
        card.commands,
        vec![
            hex!("00A4040007F0010203040506").to_vec(),
            hex!("00B2000000").to_vec(),
            hex!("00B00000E6").to_vec(),
            hex!("00B000E6E6").to_vec(),
            hex!("00B001CC28").to_vec(),
            hex!("00B1000000").to_vec(),
        ]
    );
    assert_eq!(report.state, TransferState::Done);
    assert!(report.failure.is_none());
    assert_eq!(report.file_size, 500);
    assert_eq!(report.total_received, 500);
    assert_eq!(report.chunks, 3);
    assert!(report.metadata_received);
    assert_eq!(report.identity.file_name(), "report.pdf");
    assert!(report.transfer_complete());
    assert!(report.checksum_verified());
    assert_eq!(report.written_digest_matches, Some(true));

    let temp = dir.path().join("report.pdf.temp");
    assert_eq!(report.temp_path(), Some(temp.as_path()));
    assert_eq!(fs::read(&temp).unwrap(), data);

    let audit = fs::read_to_string(dir.path().join("report.pdf.chunks.log")).unwrap();
    let indices: Vec<_> = audit
        .lines()
        .map(|line| line.split_whitespace().next().unwrap().to_string())
        .collect();
    assert_eq!(indices, vec!["chunk=1", "chunk=2", "chunk=3"]);

    let resolution = Resolver::new().resolve(&report).unwrap();
    assert_eq!(resolution, Resolution::Promoted(dir.path().join("report.pdf")));
    assert_eq!(fs::read(dir.path().join("report.pdf")).unwrap(), data);
    assert!(!temp.exists());
}

#[test]
fn reads_are_paced_except_after_the_last() {
    let dir = tempfile::tempdir().unwrap();
    let data = payload(500);
    let mut card = ScriptedCard::new()
        .respond(&size_field(500), OK)
        .respond(b"report\npdf", OK)
        .respond(&data[..230], OK)
        .respond(&data[230..460], OK)
        .respond(&data[460..], OK)
        .respond(&md5(&data), OK);
    let config = config(dir.path()).with_inter_chunk_delay(INTER_CHUNK_DELAY);

    let started = Instant::now();
    let report = Receiver::new(&mut card, config).unwrap().run();
    let elapsed = started.elapsed();

    assert_eq!(report.state, TransferState::Done);
    assert_eq!(report.chunks, 3);
    assert!(elapsed >= INTER_CHUNK_DELAY * 2, "elapsed {elapsed:?}");
    assert!(elapsed < INTER_CHUNK_DELAY * 3, "elapsed {elapsed:?}");

    // commands: SELECT, METADATA, READ x3, CHECKSUM
    let gap = |i: usize| card.sent_at[i + 1] - card.sent_at[i];
    assert!(gap(2) >= INTER_CHUNK_DELAY);
    assert!(gap(3) >= INTER_CHUNK_DELAY);
    assert!(gap(4) < INTER_CHUNK_DELAY);
}

#[test]
fn rejected_select_sends_nothing_else() {
    let dir = tempfile::tempdir().unwrap();
    let mut card = ScriptedCard::new().respond(&[], 0x6A82);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    assert_eq!(card.commands.len(), 1);
    assert_eq!(report.state, TransferState::Failed);
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.step, Step::Select);
    assert_eq!(failure.reason, FailureReason::SelectRejected);
    assert_eq!(failure.status(), Some(StatusWord::new(0x6A, 0x82)));
    assert!(!report.transfer_complete());
    assert!(report.checksum.is_none());
    assert!(report.artifact.is_none());

    assert_eq!(
        Resolver::new().resolve(&report).unwrap(),
        Resolution::NothingStored
    );
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn select_transport_failure_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut card = ScriptedCard::new().fail(TransportError::CardGone);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    let failure = report.failure.unwrap();
    assert_eq!(failure.reason, FailureReason::SelectRejected);
    assert!(failure.error.is_transport());
}

#[test]
fn select_without_size_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut card = ScriptedCard::new().respond(&hex!("01F4"), OK);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    assert_eq!(card.commands.len(), 1);
    assert_eq!(
        report.failure.unwrap().reason,
        FailureReason::MissingSizeField
    );
}

#[test]
fn empty_file_is_done_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let mut card = ScriptedCard::new().respond(&size_field(0), OK);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    assert_eq!(card.commands.len(), 1);
    assert_eq!(report.state, TransferState::Done);
    assert_eq!(report.total_received, 0);
    assert!(report.transfer_complete());
    assert_eq!(
        Resolver::new().resolve(&report).unwrap(),
        Resolution::NothingStored
    );
}

#[test]
fn zero_progress_stops_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let mut card = ScriptedCard::new()
        .respond(&size_field(10), OK)
        .respond(b"a\nb", OK)
        .respond(&[], OK)
        .respond(&md5(&payload(10)), OK);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    // SELECT, METADATA, one READ BINARY, then straight to GET CHECKSUM
    assert_eq!(card.instructions(), vec![0xA4, 0xB2, 0xB0, 0xB1]);
    assert_eq!(report.state, TransferState::Failed);
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.reason, FailureReason::ZeroProgress);
    assert_eq!(failure.offset, 0);
    assert_eq!(report.total_received, 0);
    assert!(!report.checksum_verified());
}

#[test]
fn rejected_read_keeps_partial_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let data = payload(500);
    let mut card = ScriptedCard::new()
        .respond(&size_field(500), OK)
        .respond(b"photo\njpg", OK)
        .respond(&data[..230], OK)
        .respond(&[], 0x6B00)
        .respond(&md5(&data), OK);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.step, Step::Read);
    assert_eq!(failure.reason, FailureReason::ReadRejected);
    assert_eq!(failure.status(), Some(StatusWord::new(0x6B, 0x00)));
    assert_eq!((failure.offset, failure.received, failure.expected), (230, 230, 500));
    assert!(failure.to_string().contains("received 230 of 500 bytes"));

    assert_eq!(report.total_received, 230);
    assert!(!report.transfer_complete());
    assert!(matches!(report.checksum, Some(ChecksumOutcome::Mismatch { .. })));

    let temp = dir.path().join("photo.jpg.temp");
    assert_eq!(fs::read(&temp).unwrap(), &data[..230]);

    // Incomplete transfers stay temporary whatever the user answers
    let resolver = Resolver::with_confirmation(Box::new(|_: &str| true));
    assert_eq!(
        resolver.resolve(&report).unwrap(),
        Resolution::KeptTemporary {
            path: temp.clone(),
            reason: KeepReason::Incomplete,
        }
    );
    assert!(temp.exists());
    assert!(!dir.path().join("photo.jpg").exists());
}

#[test]
fn malformed_read_response() {
    let dir = tempfile::tempdir().unwrap();
    let mut card = ScriptedCard::new()
        .respond(&size_field(4), OK)
        .respond(b"a\nb", OK)
        .respond_raw(&[0x90])
        .respond(&[], 0x6F00);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.reason, FailureReason::MalformedResponse);
    assert!(matches!(failure.error, Error::MalformedResponse { length: 1 }));
    assert!(matches!(
        report.checksum,
        Some(ChecksumOutcome::Unavailable { .. })
    ));
}

#[test]
fn transport_failure_while_reading() {
    let dir = tempfile::tempdir().unwrap();
    let data = payload(300);
    let mut card = ScriptedCard::new()
        .respond(&size_field(300), OK)
        .respond(b"a\nb", OK)
        .respond(&data[..230], OK)
        .fail(TransportError::Timeout)
        .fail(TransportError::CardGone);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.reason, FailureReason::ReadTransportError);
    assert_eq!(report.total_received, 230);
    assert!(matches!(
        report.checksum,
        Some(ChecksumOutcome::Unavailable { .. })
    ));
    assert_eq!(fs::read(dir.path().join("a.b.temp")).unwrap(), &data[..230]);
}

#[test]
fn metadata_failure_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let data = payload(20);
    let mut card = ScriptedCard::new()
        .respond(&size_field(20), OK)
        .respond(&[], 0x6D00)
        .respond(&data, OK)
        .respond(&md5(&data), OK);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    assert_eq!(report.state, TransferState::Done);
    assert!(!report.metadata_received);
    assert_eq!(report.identity.file_name(), "received_file.bin");
    assert!(report.checksum_verified());
    assert_eq!(
        Resolver::new().resolve(&report).unwrap(),
        Resolution::Promoted(dir.path().join("received_file.bin"))
    );
}

#[test]
fn excess_bytes_are_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut card = ScriptedCard::new()
        .respond(&size_field(5), OK)
        .respond(b"short\ntxt", OK)
        .respond(b"0123456789", OK)
        .respond(&md5(b"01234"), OK);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    assert_eq!(report.state, TransferState::Done);
    assert_eq!(report.total_received, 5);
    assert!(report.checksum_verified());
    assert_eq!(fs::read(dir.path().join("short.txt.temp")).unwrap(), b"01234");
}

#[test]
fn unavailable_checksum_asks_before_keeping() {
    let data = payload(40);
    let script = || {
        ScriptedCard::new()
            .respond(&size_field(40), OK)
            .respond(b"notes\ntxt", OK)
            .respond(&data, OK)
            .respond(&[], 0x6F00)
    };

    let dir = tempfile::tempdir().unwrap();
    let mut card = script();
    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();
    assert_eq!(report.state, TransferState::Done);
    assert!(report.transfer_complete());
    assert!(matches!(
        report.checksum,
        Some(ChecksumOutcome::Unavailable { .. })
    ));

    let declined = Resolver::with_confirmation(Box::new(|_: &str| false))
        .resolve(&report)
        .unwrap();
    assert!(matches!(
        declined,
        Resolution::KeptTemporary {
            reason: KeepReason::Declined,
            ..
        }
    ));

    let accepted = Resolver::with_confirmation(Box::new(|_: &str| true))
        .resolve(&report)
        .unwrap();
    assert_eq!(accepted, Resolution::Promoted(dir.path().join("notes.txt")));
    assert_eq!(fs::read(dir.path().join("notes.txt")).unwrap(), data);
}

#[test]
fn mismatch_declined_keeps_temp_only() {
    let dir = tempfile::tempdir().unwrap();
    let data = payload(64);
    let mut card = ScriptedCard::new()
        .respond(&size_field(64), OK)
        .respond(b"image\npng", OK)
        .respond(&data, OK)
        .respond(&[0u8; 16], OK);

    let report = Receiver::new(&mut card, config(dir.path())).unwrap().run();

    assert!(report.transfer_complete());
    assert!(!report.checksum_verified());
    let Some(ChecksumOutcome::Mismatch { received, calculated }) = &report.checksum else {
        panic!("expected a mismatch, got {:?}", report.checksum);
    };
    assert_eq!(received, "00000000000000000000000000000000");
    assert_eq!(calculated, &hex::encode(md5(&data)));

    let prompts = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen = prompts.clone();
    let resolver = Resolver::with_confirmation(Box::new(move |message: &str| {
        seen.lock().unwrap().push(message.to_string());
        false
    }));

    let resolution = resolver.resolve(&report).unwrap();
    assert!(matches!(
        resolution,
        Resolution::KeptTemporary {
            reason: KeepReason::Declined,
            ..
        }
    ));
    assert!(dir.path().join("image.png.temp").exists());
    assert!(!dir.path().join("image.png").exists());

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("checksum mismatch"));
    assert!(prompts[0].contains("Possible causes"));
}

#[test]
fn progress_is_reported_per_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let data = payload(500);
    let mut card = ScriptedCard::new()
        .respond(&size_field(500), OK)
        .respond(b"a\nb", OK)
        .respond(&data[..230], OK)
        .respond(&data[230..460], OK)
        .respond(&data[460..], OK)
        .respond(&md5(&data), OK);

    let mut seen = Vec::new();
    let mut receiver = Receiver::new(&mut card, config(dir.path())).unwrap();
    let report = receiver.run_with_progress(&mut |received: usize, total: usize| {
        seen.push((received, total))
    });

    assert_eq!(receiver.state(), TransferState::Done);
    assert!(report.transfer_complete());
    assert_eq!(seen, vec![(230, 500), (460, 500), (500, 500)]);
}

#[test]
fn audit_log_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let data = payload(8);
    let mut card = ScriptedCard::new()
        .respond(&size_field(8), OK)
        .respond(b"a\nb", OK)
        .respond(&data, OK)
        .respond(&md5(&data), OK);

    let report = Receiver::new(&mut card, config(dir.path()).with_audit_log(false))
        .unwrap()
        .run();

    assert!(report.audit_path.is_none());
    assert!(!dir.path().join("a.b.chunks.log").exists());
}

#[test]
fn missing_output_dir_is_a_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let mut card = ScriptedCard::new()
        .respond(&size_field(8), OK)
        .respond(b"a\nb", OK)
        .respond(&[0u8; 16], OK);

    let report = Receiver::new(&mut card, config(&missing)).unwrap().run();

    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.step, Step::Write);
    assert_eq!(failure.reason, FailureReason::SinkError);
    assert!(report.artifact.is_none());
    // No READ BINARY is attempted without somewhere to put the bytes
    assert_eq!(card.instructions(), vec![0xA4, 0xB2, 0xB1]);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let result = Receiver::new(ScriptedCard::new(), config(dir.path()).with_chunk_size(0));
    assert!(matches!(result, Err(Error::Config(_))));
}
