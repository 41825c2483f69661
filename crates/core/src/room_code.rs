use rand::Rng;

/// Room codes are 8 characters drawn from the uppercase base-36 alphabet.
pub const ROOM_CODE_LEN: usize = 8;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Produces a short human-shareable room code. Not guaranteed unique by
/// itself; callers verify against the store before use.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Whether `code` has the shape produced by [`generate`].
pub fn is_valid(code: &str) -> bool {
    code.len() == ROOM_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
}
