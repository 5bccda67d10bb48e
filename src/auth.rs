use sha2::{Digest, Sha256};

use crate::error::GatewayError;

/// Checks the shared secret sent in the generate body.
///
/// Both sides are hashed first so the comparison runs over fixed-length
/// digests and does not leak the secret length.
#[derive(Clone)]
pub struct SecretVerifier {
    expected: Option<[u8; 32]>,
}

impl SecretVerifier {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            expected: secret.filter(|s| !s.is_empty()).map(digest),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.expected.is_some()
    }

    pub fn verify(&self, provided: &str) -> Result<(), GatewayError> {
        let expected = self.expected.as_ref().ok_or(GatewayError::AuthNotConfigured)?;

        if constant_time_eq(expected, &digest(provided)) {
            Ok(())
        } else {
            Err(GatewayError::Unauthorized)
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(value.as_bytes()));
    out
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_secret() {
        let verifier = SecretVerifier::new(Some("test_secret_12345"));
        assert!(verifier.verify("test_secret_12345").is_ok());
    }

    #[test]
    fn test_wrong_secret() {
        let verifier = SecretVerifier::new(Some("test_secret_12345"));
        assert!(matches!(
            verifier.verify("wrong_secret"),
            Err(GatewayError::Unauthorized)
        ));
        assert!(matches!(verifier.verify(""), Err(GatewayError::Unauthorized)));
    }

    #[test]
    fn test_unconfigured_rejects_everything() {
        for verifier in [SecretVerifier::new(None), SecretVerifier::new(Some(""))] {
            assert!(!verifier.is_configured());
            assert!(matches!(
                verifier.verify("anything"),
                Err(GatewayError::AuthNotConfigured)
            ));
        }
    }
}
