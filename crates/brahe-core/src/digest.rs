use crate::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::Instant;
use tracing::trace;

const READ_CHUNK_SIZE: usize = 4 * 1024 * 1024; // 4 MiB

/// 256-bit BLAKE3 content digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    /// Splits the hex form into the shard directory name (first byte) and
    /// the entry file name (remaining bytes).
    pub fn shard_parts(&self) -> (String, String) {
        let hex = self.to_hex();
        let (shard, rest) = hex.split_at(2);
        (shard.to_string(), rest.to_string())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HashedFile {
    pub digest: Digest,
    pub bytes: u64,
    pub mb_per_sec: f64,
}

/// Streams a file through BLAKE3 in fixed-size chunks.
/// Any open or read failure is returned as a fatal error.
pub fn hash_file(path: &Path) -> Result<HashedFile, Error> {
    let started = Instant::now();
    let mut file = File::open(path).map_err(|e| Error::io("open", path, e))?;

    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; READ_CHUNK_SIZE];
    let mut total_bytes: u64 = 0;

    loop {
        let n = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io("read", path, e)),
        };
        hasher.update(&buffer[..n]);
        total_bytes += n as u64;
    }

    let digest = Digest(*hasher.finalize().as_bytes());
    let elapsed = started.elapsed().as_secs_f64();
    let mb_per_sec = if elapsed > 0.0 {
        (total_bytes as f64 / 1000.0 / 1000.0) / elapsed
    } else {
        0.0
    };
    trace!(
        "Hashed {} ({} bytes) at {:.2} MB/s",
        path.display(),
        total_bytes,
        mb_per_sec
    );

    Ok(HashedFile {
        digest,
        bytes: total_bytes,
        mb_per_sec,
    })
}
