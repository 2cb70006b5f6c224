//! Checkout signature verification (HMAC-SHA256)

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn signed_payload(provider_order_id: &str, provider_payment_id: &str) -> String {
    format!("{provider_order_id}|{provider_payment_id}")
}

/// Check `signature` (lowercase hex) against
/// `HMAC-SHA256(secret, "{order_id}|{payment_id}")` in constant time.
pub fn verify_payment_signature(
    secret: &str,
    provider_order_id: &str,
    provider_payment_id: &str,
    signature: &str,
) -> bool {
    // The provider sends lowercase hex; anything else is not its signature
    if signature.bytes().any(|b| b.is_ascii_uppercase()) {
        return false;
    }
    let Ok(sig_bytes) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(signed_payload(provider_order_id, provider_payment_id).as_bytes());
    mac.verify_slice(&sig_bytes).is_ok()
}

/// Produce the signature the provider would hand to the client.
///
/// Used by the mock gateway and in tests.
pub fn sign_payment(secret: &str, provider_order_id: &str, provider_payment_id: &str) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(signed_payload(provider_order_id, provider_payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_signature() {
        let sig = sign_payment("secret", "order_1", "pay_1");
        assert_eq!(sig.len(), 64);
        assert!(verify_payment_signature("secret", "order_1", "pay_1", &sig));
    }

    #[test]
    fn test_signature_binds_all_inputs() {
        let sig = sign_payment("secret", "order_1", "pay_1");
        assert!(!verify_payment_signature("other", "order_1", "pay_1", &sig));
        assert!(!verify_payment_signature("secret", "order_2", "pay_1", &sig));
        assert!(!verify_payment_signature("secret", "order_1", "pay_2", &sig));
    }

    #[test]
    fn test_garbage_signature() {
        assert!(!verify_payment_signature("secret", "o", "p", "not-hex"));
        assert!(!verify_payment_signature("secret", "o", "p", ""));
        assert!(!verify_payment_signature("secret", "o", "p", "abcd"));
    }

    #[test]
    fn test_uppercase_hex_rejected() {
        let sig = sign_payment("secret", "order_1", "pay_1");
        assert!(!verify_payment_signature(
            "secret",
            "order_1",
            "pay_1",
            &sig.to_ascii_uppercase()
        ));
    }
}
