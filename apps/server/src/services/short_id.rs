//! Short human-readable identifiers for class sections and recaps.

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const RECAP_PREFIX: &str = "REC";
const RECAP_SUFFIX_LEN: usize = 5;
const CLASS_SECTION_CODE_LEN: usize = 3;

/// `len` characters drawn uniformly from `A-Z0-9`.
fn alphanumeric(len: usize) -> String {
    (0..len)
        .map(|_| ALPHANUMERIC[rand::random_range(0..ALPHANUMERIC.len())] as char)
        .collect()
}

/// `REC` followed by five characters from `A-Z0-9`, e.g. `REC7K2QZ`.
pub fn recap_id() -> String {
    format!("{}{}", RECAP_PREFIX, alphanumeric(RECAP_SUFFIX_LEN))
}

/// Three characters from `A-Z0-9` followed by five digits, e.g. `ABC12345`.
pub fn class_section_id() -> String {
    let number: u32 = rand::random_range(10_000..100_000);
    format!("{}{}", alphanumeric(CLASS_SECTION_CODE_LEN), number)
}
