/// Compare a presented metrics key with the configured one.
///
/// Runs in time independent of where the first mismatching byte sits.
pub fn verify_api_key(provided: &str, expected: &str) -> bool {
    let (provided, expected) = (provided.as_bytes(), expected.as_bytes());

    if provided.len() != expected.len() {
        return false;
    }

    provided
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
