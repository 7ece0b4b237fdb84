use base64::{URL_SAFE_NO_PAD, encode_config};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// Shared secret guarding the delivery trigger.
#[derive(Clone)]
pub(crate) struct TriggerAuth {
    secret: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("trigger secret cannot be empty")]
    EmptySecret,
}

impl std::fmt::Debug for TriggerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerAuth").finish_non_exhaustive()
    }
}

impl TriggerAuth {
    pub(crate) fn from_secret(secret: Option<&str>) -> Result<Option<Self>, AuthError> {
        let Some(secret) = secret else {
            return Ok(None);
        };
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }
        Ok(Some(Self {
            secret: secret.to_string(),
        }))
    }

    /// Checks an `Authorization` header value of the form `Bearer <secret>`.
    pub(crate) fn verify_header(&self, header: Option<&str>) -> bool {
        let Some(token) = header.and_then(|value| value.strip_prefix("Bearer ")) else {
            return false;
        };
        constant_time_eq(token.trim().as_bytes(), self.secret.as_bytes())
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

pub fn generate_trigger_secret() -> String {
    let mut rng = OsRng;
    generate_trigger_secret_with_rng(&mut rng)
}

pub(crate) fn generate_trigger_secret_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    encode_config(bytes, URL_SAFE_NO_PAD)
}
