use base64::{URL_SAFE_NO_PAD, encode_config};
use jwt_simple::prelude::ES256KeyPair;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::config;
use crate::types::push::VapidConfig;

#[derive(Debug, Clone)]
pub struct VapidCredentials {
    pub private_key: String,
    pub public_key: String,
}

#[derive(Debug, Clone)]
pub enum VapidConfigStatus {
    Missing,
    Incomplete,
    Ready(VapidConfig),
}

pub fn load_vapid_config(config: &config::AppConfig) -> VapidConfigStatus {
    let private_key = non_blank(config.vapid_private_key.as_ref());
    let public_key = non_blank(config.vapid_public_key.as_ref());
    let subject = non_blank(config.vapid_subject.as_ref());
    let has_any = private_key.is_some() || public_key.is_some() || subject.is_some();

    match (private_key, public_key, subject) {
        (Some(private_key), Some(public_key), Some(subject)) => {
            VapidConfigStatus::Ready(VapidConfig {
                private_key: private_key.clone(),
                public_key: public_key.clone(),
                subject: subject.clone(),
            })
        }
        _ if has_any => VapidConfigStatus::Incomplete,
        _ => VapidConfigStatus::Missing,
    }
}

fn non_blank(value: Option<&String>) -> Option<&String> {
    value.filter(|value| !value.trim().is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum VapidKeyError {
    #[error("invalid VAPID private key: {0}")]
    InvalidPrivateKey(web_push::WebPushError),
    #[error("VAPID public key does not belong to the private key")]
    PublicKeyMismatch,
}

/// Derives the public key from the private one and compares it with the configured one.
pub fn check_key_pair(vapid: &VapidConfig) -> Result<(), VapidKeyError> {
    let derived =
        web_push::VapidSignatureBuilder::from_base64_no_sub(vapid.private_key.trim(), URL_SAFE_NO_PAD)
            .map_err(VapidKeyError::InvalidPrivateKey)?
            .get_public_key();
    if encode_config(derived, URL_SAFE_NO_PAD) != vapid.public_key.trim() {
        return Err(VapidKeyError::PublicKeyMismatch);
    }
    Ok(())
}

pub fn generate_vapid_credentials() -> Result<VapidCredentials, web_push::WebPushError> {
    let mut rng = OsRng;
    generate_vapid_credentials_with_rng(&mut rng)
}

pub(crate) fn generate_vapid_credentials_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<VapidCredentials, web_push::WebPushError> {
    let key_pair = generate_es256_keypair_with_rng(rng);
    let private_key = encode_config(key_pair.to_bytes(), URL_SAFE_NO_PAD);
    let public_key =
        web_push::VapidSignatureBuilder::from_base64_no_sub(&private_key, URL_SAFE_NO_PAD)?
            .get_public_key();
    let public_key = encode_config(public_key, URL_SAFE_NO_PAD);

    Ok(VapidCredentials {
        private_key,
        public_key,
    })
}

fn generate_es256_keypair_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> ES256KeyPair {
    let mut key_bytes = [0u8; 32];
    loop {
        rng.fill_bytes(&mut key_bytes);
        if let Ok(key_pair) = ES256KeyPair::from_bytes(&key_bytes) {
            return key_pair;
        }
    }
}
