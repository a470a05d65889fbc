// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document integrity — SHA-256 fingerprints of finished scans.

use std::path::Path;

use scanwerk_core::error::Result;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Hash a file on disk, e.g. the PDF a scan job just wrote.
///
/// Recorded on the scan record so a delivered copy can be checked against
/// the one left in the work directory.
pub fn hash_file(path: impl AsRef<Path>) -> Result<String> {
    let data = std::fs::read(path.as_ref())?;
    Ok(hash_bytes(&data))
}
