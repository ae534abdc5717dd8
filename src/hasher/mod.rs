use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub mod xxhash;

const READ_BUFFER_LENGTH: usize = 64 * 1024;

/// Content digest used to decide whether two files hold the same bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Fast non-cryptographic 64-bit hash
    #[default]
    Xxhash64,
    /// 256-bit BLAKE3
    Blake3,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Xxhash64 => f.write_str("xxhash64"),
            HashAlgorithm::Blake3 => f.write_str("blake3"),
        }
    }
}

/// Fixed-size fingerprint of a file's bytes. Equal fingerprints are treated
/// as equal content; collisions are an accepted risk.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fingerprint {
    XxHash64(u64),
    Blake3([u8; 32]),
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::XxHash64(hash) => write!(f, "{:016x}", hash),
            Fingerprint::Blake3(bytes) => {
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Fingerprint the entire content of `file`. Open and read failures are
/// returned to the caller.
pub fn fingerprint_file(file: &Path, algorithm: HashAlgorithm) -> io::Result<Fingerprint> {
    match algorithm {
        HashAlgorithm::Xxhash64 => xxhash::hash_file(file).map(Fingerprint::XxHash64),
        HashAlgorithm::Blake3 => blake3_file(file).map(Fingerprint::Blake3),
    }
}

pub fn fingerprint_data(data: &[u8], algorithm: HashAlgorithm) -> Fingerprint {
    match algorithm {
        HashAlgorithm::Xxhash64 => Fingerprint::XxHash64(xxhash::hash_data(data)),
        HashAlgorithm::Blake3 => Fingerprint::Blake3(*blake3::hash(data).as_bytes()),
    }
}

fn blake3_file(file: &Path) -> io::Result<[u8; 32]> {
    let mut f = File::open(file)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0; READ_BUFFER_LENGTH];

    loop {
        let bytes_read = f.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(*hasher.finalize().as_bytes())
}
