use rand::Rng;

use super::SeatPosition;

const FALLBACK_PREFIX: &str = "TRP";
const PREFIX_LEN: usize = 3;
const SUFFIX_BYTES: usize = 3;

/// Build a ticket code: name prefix, 6 random hex digits, seat label.
///
/// Uniqueness is not guaranteed here; the store retries on collision.
pub fn generate_ticket_code(name: &str, position: SeatPosition) -> String {
    let prefix: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(PREFIX_LEN)
        .collect::<String>()
        .to_uppercase();
    let prefix = if prefix.is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        prefix
    };

    let bytes: [u8; SUFFIX_BYTES] = rand::thread_rng().gen();

    format!("{}{}{}", prefix, hex::encode_upper(bytes), position.label())
}
