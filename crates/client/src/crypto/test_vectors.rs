//! Fixed RSA key material for tests, plus a decryption oracle.
//!
//! Only depends on external crates so integration tests can include it with
//! `#[path]`.
#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use num_bigint::BigUint;

/// 1024-bit key, SPKI form. The modulus top byte is 0xc8, so its DER INTEGER
/// carries a leading 0x00 sign byte.
pub const SPKI_1024_PEM: &str = "-----BEGIN PUBLIC KEY-----
MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQDInX0L4dbOy2R8CGzy8Oj9qvsz
d4PdeKTo0mJQ/Rl0ovVLW1y6gQS8l2XaOFB+xFlJR63/M+YO16Mo0NT5fvCJhbYE
P927Ae1owOwa+iA4xg/62MdsnE9wSHbel0PSF0XBLCvi8Q5ALyumhWyg5+WM/Kvu
zi1qouGmufx0z6mePwIDAQAB
-----END PUBLIC KEY-----
";

/// Same key as [`SPKI_1024_PEM`], bare PKCS#1 form.
pub const PKCS1_1024_PEM: &str = "-----BEGIN RSA PUBLIC KEY-----
MIGJAoGBAMidfQvh1s7LZHwIbPLw6P2q+zN3g914pOjSYlD9GXSi9UtbXLqBBLyX
Zdo4UH7EWUlHrf8z5g7XoyjQ1Pl+8ImFtgQ/3bsB7WjA7Br6IDjGD/rYx2ycT3BI
dt6XQ9IXRcEsK+LxDkAvK6aFbKDn5Yz8q+7OLWqi4aa5/HTPqZ4/AgMBAAE=
-----END RSA PUBLIC KEY-----
";

/// Modulus of the 1024-bit key, hex.
pub const MODULUS_1024_HEX: &str = "c89d7d0be1d6cecb647c086cf2f0e8fdaafb337783dd78a4e8d26250fd1974a2\
f54b5b5cba8104bc9765da38507ec4594947adff33e60ed7a328d0d4f97ef089\
85b6043fddbb01ed68c0ec1afa2038c60ffad8c76c9c4f704876de9743d21745\
c12c2be2f10e402f2ba6856ca0e7e58cfcabeece2d6aa2e1a6b9fc74cfa99e3f";

/// Private exponent of the 1024-bit key, hex. Test oracle only.
pub const PRIVATE_EXPONENT_1024_HEX: &str = "102a68a62977a6c84afb97ae37d163e4f4ff33018175ba4007a6d457545dd5c1\
3fe4e7a2cc409342232d08ed9ac6ec49899726153778655fc8fd03fef56fde30\
02386154703588861a0523e0bed1006dd2d12dad19d038200aa13bbf150fae19\
80c4388e16891535a1c4d4144f32560350e8c27c72076cb6fb51c6508aab3391";

/// Unrelated 2048-bit key, SPKI form.
pub const SPKI_2048_PEM: &str = "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAkU5dSJw6Br4p7FuEFveY
1oacbXal9pvaPDIIc+B9gREpSXZzTpHckSq4ABn9Ul8u303P9HAihR14G4EWML0u
CSN/BO85Leuu0jMwER6Mnn4zA6iu87hB8vgs0+GOB1Db7vV7mmnbnT67dwQ5+tdg
Ct0LoORhPFbC9mKGCte8PerN/vOKkxSDRB3VwYWnTjK08mkx7OOvl5zvAK1KkJn8
1MIQs7b2Zlf95K9GP0wv4rbmNQXdh8mrQu7CadjZzpYxuGJ9ugg8RIR0iusAbDvj
GMGGChHfXsH2PDpOGn3ttFvhVSlC4YUB3pXRaUZ2c8FIvKbWSgbxTj4dYqTfGx4o
RwIDAQAB
-----END PUBLIC KEY-----
";

pub fn modulus_1024() -> BigUint {
    BigUint::parse_bytes(MODULUS_1024_HEX.as_bytes(), 16).expect("modulus hex")
}

/// Raw RSA decryption of base64 ciphertext with the 1024-bit private key.
///
/// Returns the full `k`-byte encoded block, leading zeros included.
pub fn decrypt_block_1024(ciphertext_b64: &str) -> Vec<u8> {
    let n = modulus_1024();
    let d = BigUint::parse_bytes(PRIVATE_EXPONENT_1024_HEX.as_bytes(), 16).expect("d hex");
    let c = STANDARD.decode(ciphertext_b64).expect("ciphertext base64");
    assert_eq!(c.len(), 128, "ciphertext must be exactly k bytes");
    let m = BigUint::from_bytes_be(&c).modpow(&d, &n).to_bytes_be();
    let mut block = vec![0u8; 128 - m.len()];
    block.extend_from_slice(&m);
    block
}

/// Decrypt and strip PKCS#1 v1.5 type-2 padding.
pub fn decrypt_1024(ciphertext_b64: &str) -> String {
    let block = decrypt_block_1024(ciphertext_b64);
    assert_eq!(&block[..2], &[0x00, 0x02], "block type");
    let separator = block[2..]
        .iter()
        .position(|&b| b == 0)
        .map(|p| p + 2)
        .expect("padding separator");
    assert!(separator >= 10, "padding string shorter than 8 bytes");
    String::from_utf8(block[separator + 1..].to_vec()).expect("utf-8 plaintext")
}
