use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Bearer Tokens
// =============================================================================

/// Compute the hex HMAC-SHA256 of `data` under `secret`
fn sign(data: &str, secret: &str) -> Option<String> {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return None;
        }
    };
    mac.update(data.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verify HMAC-SHA256 signature
///
/// # Arguments
/// * `data` - The data that was signed
/// * `signature` - The hex-encoded HMAC signature
/// * `secret` - The shared secret key (from environment)
pub fn verify_hmac(data: &str, signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    mac.update(data.as_bytes());

    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid hex signature format");
            return false;
        }
    };

    // Constant-time comparison
    mac.verify_slice(&sig_bytes).is_ok()
}

/// Issue a bearer token for `user_id`
///
/// Token format: `<user_id>.<hex HMAC-SHA256(user_id)>`. Login lives in a
/// separate service; it signs with the same `APP_SECRET_KEY`.
pub fn sign_user_token(user_id: &str, secret: &str) -> String {
    let signature = sign(user_id, secret).unwrap_or_default();
    format!("{}.{}", user_id, signature)
}

/// Extract the user id from a bearer token, or `None` if it is forged
pub fn verify_user_token(token: &str, secret: &str) -> Option<String> {
    // User ids never contain '.', the signature is the last segment
    let (user_id, signature) = token.rsplit_once('.')?;

    if !crate::models::post::validate_id(user_id) {
        tracing::warn!("Malformed user id in bearer token");
        return None;
    }

    if !verify_hmac(user_id, signature, secret) {
        tracing::warn!("Invalid bearer token signature");
        return None;
    }

    Some(user_id.to_string())
}
