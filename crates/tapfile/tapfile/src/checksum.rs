//! MD5 verification of received bytes against the sender's digest
//!
//! The digest is computed over the bytes actually received, so a truncated transfer can
//! still be compared and reported.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::{Digest as _, Md5};

/// Length of an MD5 digest in bytes
pub const DIGEST_LEN: usize = 16;

const BUF_SIZE: usize = 64 * 1024;

/// MD5 digest of a byte stream
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileDigest([u8; DIGEST_LEN]);

impl FileDigest {
    /// Digest of an in-memory buffer
    pub fn compute(data: &[u8]) -> Self {
        Self::from_slice(&Md5::digest(data))
    }

    /// Digest of a file, read in bounded chunks
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut hasher = Md5::new();
        let mut buf = vec![0u8; BUF_SIZE];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Self::from_slice(&hasher.finalize()))
    }

    fn from_slice(digest: &[u8]) -> Self {
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(digest);
        Self(bytes)
    }

    /// Raw digest bytes
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex rendering, two characters per byte
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileDigest({})", self.to_hex())
    }
}

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compare two hex renderings of a digest
///
/// The comparison ignores case. When it fails, it is retried once with all whitespace
/// removed from both sides.
pub fn hex_matches(received: &str, calculated: &str) -> bool {
    if received.eq_ignore_ascii_case(calculated) {
        return true;
    }

    let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    strip(received).eq_ignore_ascii_case(&strip(calculated))
}

/// Result of comparing the sender's digest with the digest of the received bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumOutcome {
    /// Both digests agree
    Verified {
        /// Agreed digest in hex
        digest: String,
    },
    /// The digests differ
    Mismatch {
        /// Digest reported by the sender, in hex
        received: String,
        /// Digest of the received bytes, in hex
        calculated: String,
    },
    /// No digest could be obtained from the sender
    Unavailable {
        /// Why the digest could not be obtained
        reason: String,
    },
}

impl ChecksumOutcome {
    /// Compare the sender's raw digest with the digest of the received bytes
    ///
    /// The structural byte comparison and the hex comparison must both succeed.
    pub fn compare(received: &[u8], calculated: &FileDigest) -> Self {
        let received_hex = hex::encode(received);
        let calculated_hex = calculated.to_hex();

        let structural = received == calculated.as_bytes().as_slice();
        let rendered = hex_matches(&received_hex, &calculated_hex);

        if structural && rendered {
            Self::Verified {
                digest: calculated_hex,
            }
        } else {
            Self::Mismatch {
                received: received_hex,
                calculated: calculated_hex,
            }
        }
    }

    /// Returns true if the digests agree
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    /// Likely explanations for a mismatch, shown to the user before deciding
    pub const fn plausible_causes(&self) -> &'static [&'static str] {
        match self {
            Self::Verified { .. } => &[],
            Self::Mismatch { .. } => &[
                "the transfer was interrupted and the file is incomplete",
                "the sender computed the digest differently",
                "data was corrupted in transit",
            ],
            Self::Unavailable { .. } => &[
                "the sender does not implement GET CHECKSUM",
                "the card was removed before the digest was read",
            ],
        }
    }
}

impl fmt::Display for ChecksumOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified { digest } => write!(f, "checksum verified ({digest})"),
            Self::Mismatch {
                received,
                calculated,
            } => write!(
                f,
                "checksum mismatch (sender {received}, calculated {calculated})"
            ),
            Self::Unavailable { reason } => write!(f, "checksum not verified: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use std::io::Write;

    #[test]
    fn digest_of_known_content() {
        assert_eq!(
            FileDigest::compute(b"").to_hex(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            FileDigest::compute(b"abc").as_bytes(),
            &hex!("900150983cd24fb0d6963f7d28e17f72")
        );
    }

    #[test]
    fn digest_of_file_matches_memory() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();

        let digest = FileDigest::of_file(f.path()).unwrap();
        assert_eq!(digest.to_hex(), "b1946ac92492d2347c6235b4d2611184");
        assert_eq!(digest, FileDigest::compute(b"hello\n"));
    }

    #[test]
    fn hex_comparison_ignores_case_and_whitespace() {
        assert!(hex_matches("AB12", "ab12"));
        assert!(hex_matches("AB12", "ab 12"));
        assert!(hex_matches(" ab\t12\n", "AB12"));
        assert!(!hex_matches("AB12", "AB13"));
        assert!(!hex_matches("AB12", "AB1"));
    }

    #[test]
    fn compare_verifies_equal_digests() {
        let calculated = FileDigest::compute(b"abc");
        let outcome =
            ChecksumOutcome::compare(&hex!("900150983cd24fb0d6963f7d28e17f72"), &calculated);
        assert!(outcome.is_verified());
        assert!(outcome.plausible_causes().is_empty());
    }

    #[test]
    fn compare_reports_both_digests_on_mismatch() {
        let calculated = FileDigest::compute(b"abc");
        let outcome = ChecksumOutcome::compare(&[0u8; DIGEST_LEN], &calculated);
        assert_eq!(
            outcome,
            ChecksumOutcome::Mismatch {
                received: "00000000000000000000000000000000".into(),
                calculated: "900150983cd24fb0d6963f7d28e17f72".into(),
            }
        );
        assert!(!outcome.plausible_causes().is_empty());
    }

    #[test]
    fn short_digest_never_verifies() {
        let calculated = FileDigest::compute(b"abc");
        let outcome = ChecksumOutcome::compare(&hex!("900150983cd24fb0"), &calculated);
        assert!(!outcome.is_verified());
    }
}
