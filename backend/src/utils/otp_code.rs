use rand::Rng;

/// Generates a random numeric one-time passcode of the specified length.
///
/// Each position is an independent uniform draw over 0-9, so leading zeros
/// are possible and codes may repeat across issuances.
///
/// # Arguments
///
/// * `length` - The desired number of digits
///
/// # Returns
///
/// A `String` of exactly `length` ASCII digits
pub fn generate_numeric_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
