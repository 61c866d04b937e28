use rand::Rng;

const ACCEPTABLE_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generates the subscribe-confirmation challenge: a fixed-length string
/// drawn from `[a-z0-9]`, unpredictable per request. Not a cryptographic
/// MAC — good enough for the hub's threat model (confirming the caller
/// controls the callback URL), not for authenticating the publisher.
pub fn challenge(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| ACCEPTABLE_CHARS[rng.random_range(0..ACCEPTABLE_CHARS.len())] as char)
        .collect()
}
