use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2;
use sha2::Sha256;
use rand::Rng;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Hash un mot de passe au format `pbkdf2:sha256:iterations$salt$hash`
/// (PBKDF2-HMAC-SHA256, salt aléatoire de 16 bytes, base64 URL-safe sans padding)
pub fn hash_password(password: &str, iterations: u32) -> Result<String, AppError> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut key)
        .map_err(|e| AppError::Internal(format!("PBKDF2 hash generation failed: {}", e)))?;

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    Ok(format!("pbkdf2:sha256:{}${}${}", iterations, salt_b64, hash_b64))
}

/// Vérifie un mot de passe contre un hash produit par `hash_password`
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    let invalid = |what: &str| AppError::Internal(format!("Invalid password hash: {}", what));

    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return Err(invalid("format"));
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" || header_parts[1] != "sha256" {
        return Err(invalid("header"));
    }

    let iterations = header_parts[2]
        .parse::<u32>()
        .map_err(|_| invalid("iterations"))?;

    let salt = URL_SAFE_NO_PAD.decode(parts[1]).map_err(|_| invalid("salt"))?;
    let expected_hash = URL_SAFE_NO_PAD.decode(parts[2]).map_err(|_| invalid("hash"))?;

    let mut computed = vec![0u8; expected_hash.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|e| AppError::Internal(format!("PBKDF2 hash verification failed: {}", e)))?;

    Ok(constant_time_eq(&computed, &expected_hash))
}

/// Comparaison en temps constant via la vérification de tag HMAC
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(b"password-compare") else {
        return false;
    };
    mac.update(a);
    let tag_a = mac.finalize().into_bytes();

    let Ok(mut mac) = HmacSha256::new_from_slice(b"password-compare") else {
        return false;
    };
    mac.update(b);
    mac.verify_slice(&tag_a).is_ok()
}
