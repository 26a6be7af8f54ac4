//! Content hash for cache-busting file names.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Default length of a `[chunkhash]` value.
pub const DEFAULT_HASH_LENGTH: usize = 20;

/// Hash the contents of `files` into a short hex string.
///
/// Each file is digested on its own and the digests are sorted before being
/// combined, so the result depends only on the multiset of file contents:
/// reordering or renaming inputs leaves it unchanged.
///
/// `length` truncates the hex digest (64 characters at most).
pub fn hash_files<P: AsRef<Path>>(files: &[P], length: Option<usize>) -> Result<String> {
    let mut digests = files
        .iter()
        .map(|file| {
            let file = file.as_ref();
            fs::read(file)
                .map(|bytes| Sha256::digest(&bytes).to_vec())
                .map_err(|e| Error::io(file, e))
        })
        .collect::<Result<Vec<_>>>()?;
    digests.sort_unstable();

    let mut hasher = Sha256::new();
    for digest in &digests {
        hasher.update(digest);
    }

    Ok(truncate_hex(&hex(&hasher.finalize()), length.unwrap_or(DEFAULT_HASH_LENGTH)))
}

/// Hash a single buffer; used for `[contenthash]` in emitted names.
pub fn hash_bytes(bytes: &[u8], length: usize) -> String {
    truncate_hex(&hex(&Sha256::digest(bytes)), length)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn truncate_hex(hex: &str, length: usize) -> String {
    hex[..length.min(hex.len())].to_string()
}
