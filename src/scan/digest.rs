//! Content and permission fingerprints for a single filesystem entry

use crate::error::DigestError;
use crate::types::{ContentDigest, PermissionMode};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Read buffer size for streaming digests
pub const CHUNK_SIZE: usize = 8192;

/// Compute the SHA-256 digest of a file, streaming it in `CHUNK_SIZE` reads.
///
/// Opening follows symlinks, matching `permission_mode`. Anything other than
/// a regular file (directory, FIFO, socket, device) is rejected before it is
/// opened, since opening a FIFO blocks until a writer appears.
pub fn content_digest(path: &Path) -> Result<ContentDigest, DigestError> {
    let metadata = fs::metadata(path).map_err(|e| DigestError::from_io(path, e))?;
    if !metadata.is_file() {
        return Err(DigestError::NotRegularFile(path.to_path_buf()));
    }

    let mut file = File::open(path).map_err(|e| DigestError::from_io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DigestError::from_io(path, e)),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(ContentDigest::from_bytes(hasher.finalize().into()))
}

/// Compute the digest of an in-memory buffer
pub fn compute_content_hash(content: &[u8]) -> ContentDigest {
    ContentDigest::from_bytes(Sha256::digest(content).into())
}

/// Query the access-mode bits of a path using default stat semantics.
pub fn permission_mode(path: &Path) -> Result<PermissionMode, DigestError> {
    let metadata = fs::metadata(path).map_err(|e| DigestError::from_io(path, e))?;
    Ok(mode_from_metadata(&metadata))
}

#[cfg(unix)]
fn mode_from_metadata(metadata: &fs::Metadata) -> PermissionMode {
    use std::os::unix::fs::PermissionsExt;
    // Permission bits plus setuid/setgid/sticky; file type bits are dropped.
    PermissionMode::new(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn mode_from_metadata(metadata: &fs::Metadata) -> PermissionMode {
    if metadata.permissions().readonly() {
        PermissionMode::new(0o444)
    } else {
        PermissionMode::new(0o666)
    }
}

/// Whether the path exists, following symlinks
///
/// Any stat error other than NotFound means the path exists but cannot be
/// inspected; callers treat that as unreadable rather than missing.
pub fn path_exists(path: &Path) -> Result<bool, DigestError> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DigestError::from_io(path, e)),
    }
}
