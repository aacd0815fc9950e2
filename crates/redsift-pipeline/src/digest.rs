//! Content hashing for analysis records.

use sha2::{Digest, Sha512};

/// Lowercase hex SHA-512 of the UTF-8 bytes of `text`.
///
/// Always taken over the plaintext, so the same analysis hashes the same
/// whether or not it is stored encrypted.
pub fn sha512_hex(text: &str) -> String {
  hex::encode(Sha512::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_vector() {
    assert_eq!(
      sha512_hex("abc"),
      "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
       2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
    );
  }

  #[test]
  fn output_is_128_hex_chars() {
    let h = sha512_hex("");
    assert_eq!(h.len(), 128);
    assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
  }
}
