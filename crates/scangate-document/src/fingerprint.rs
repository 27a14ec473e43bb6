// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input fingerprints. Every pipeline run records the digest of the bytes it
// was given, so repeated uploads of one photo line up in the logs.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of an upload, as recorded on the pipeline span.
pub fn input_fingerprint(upload: &[u8]) -> String {
    hex::encode(Sha256::digest(upload))
}
