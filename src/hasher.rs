//! Per-line hash tags: FNV-1a over the line's index and trailing-trimmed content.

/// Line count at or below which three hex chars are enough.
pub const ADAPTIVE_THRESHOLD: usize = 4096;

/// FNV-1a 32-bit offset basis.
const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime.
const FNV_PRIME: u32 = 0x0100_0193;

/// Longest tag a 32-bit hash can fill.
pub const MAX_HASH_LENGTH: usize = 8;

/// Shortest tag ever generated. Parsing still accepts two chars.
pub const MIN_GENERATED_HASH_LENGTH: usize = 3;

/// Shortest tag accepted when parsing older references.
pub const MIN_PARSED_HASH_LENGTH: usize = 2;

/// Pick a tag length from the document size.
pub const fn adaptive_hash_length(line_count: usize) -> usize {
    if line_count <= ADAPTIVE_THRESHOLD {
        return MIN_GENERATED_HASH_LENGTH;
    }
    return MIN_GENERATED_HASH_LENGTH.saturating_add(1);
}

/// Compute the tag for the line at zero-based `index`.
///
/// Hashes `"<index>:<content without trailing whitespace>"` with 32-bit FNV-1a,
/// reduces modulo `16^length` and renders zero-padded lowercase hex. Leading
/// whitespace is part of the input; trailing whitespace (including a stray
/// `\r`) is not. `length` is clamped to `2..=8`.
pub fn compute_line_hash(index: usize, content: &str, length: usize) -> String {
    let length = length.clamp(MIN_PARSED_HASH_LENGTH, MAX_HASH_LENGTH);
    let keyed = format!("{index}:{}", content.trim_end());
    let digest = fnv1a(keyed.as_bytes());

    // 16^length == 2^(4 * length); at length 8 the modulus covers the full u32.
    let bits = u32::try_from(length.saturating_mul(4)).unwrap_or(32);
    let modulus = 1_u64.checked_shl(bits).unwrap_or(u64::MAX);
    let reduced = u64::from(digest).checked_rem(modulus).unwrap_or(0);

    return format!("{reduced:0length$x}");
}

/// Clamp a requested length into what generation supports, or fall back
/// to the adaptive length when the request is missing or too short.
pub fn effective_hash_length(line_count: usize, length_override: Option<usize>) -> usize {
    return match length_override {
        Some(length) if length >= MIN_GENERATED_HASH_LENGTH => length.min(MAX_HASH_LENGTH),
        _ => adaptive_hash_length(line_count),
    };
}

/// 32-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u32 {
    return bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        return (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME);
    });
}
