/// Number of digits in a CEP.
pub const CEP_LEN: usize = 8;

/// Returns `true` iff `cep` is exactly eight ASCII decimal digits.
///
/// No trimming happens here; callers strip surrounding whitespace first.
pub fn is_valid_cep(cep: &str) -> bool {
    cep.len() == CEP_LEN && cep.bytes().all(|b| b.is_ascii_digit())
}
