//! Deliberately invalid output: a marker readers will reject, then zeros.

pub const MARKER: &[u8] = b"DUMMYFORGE::CORRUPTED::";

/// Exactly `budget` bytes beginning with (a prefix of) [`MARKER`].
pub fn corrupt(budget: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(budget);
    out.extend_from_slice(&MARKER[..MARKER.len().min(budget)]);
    out.resize(budget, 0);
    out
}
