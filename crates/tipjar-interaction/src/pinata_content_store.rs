//! Pinata `pinFileToIPFS` upload client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tipjar_core::config::{ContentStoreConfig, PinataConfig};
use tipjar_core::content::ContentStore;
use tipjar_core::image::ImageFile;
use tipjar_core::secret::SecretService;
use tipjar_core::{Result, TipjarError};

use crate::network_error;

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Uploads files to Pinata and serves them through an IPFS gateway.
#[derive(Clone)]
pub struct PinataContentStore {
    client: Client,
    endpoint: String,
    gateway_url: String,
    timeout: Duration,
    credentials: PinataConfig,
}

impl PinataContentStore {
    pub fn new(config: &ContentStoreConfig, credentials: PinataConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            credentials,
        }
    }

    /// Builds the store from the configured secrets.
    pub async fn from_secrets(
        config: &ContentStoreConfig,
        secrets: &dyn SecretService,
    ) -> Result<Self> {
        let credentials = secrets
            .load_secrets()
            .await?
            .pinata
            .ok_or_else(|| TipjarError::config("No pinata credentials configured"))?;
        Ok(Self::new(config, credentials))
    }

    fn file_part(file: &ImageFile) -> Result<Part> {
        let mime = if file.mime_type.is_empty() {
            mime_guess::from_path(&file.file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        } else {
            file.mime_type.clone()
        };
        Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&mime)
            .map_err(|e| TipjarError::upload(format!("invalid mime type '{}': {}", mime, e)))
    }
}

#[async_trait]
impl ContentStore for PinataContentStore {
    async fn upload(&self, file: &ImageFile) -> Result<String> {
        let form = Form::new().part("file", Self::file_part(file)?);
        let response = self
            .client
            .post(&self.endpoint)
            .header("pinata_api_key", &self.credentials.api_key)
            .header("pinata_secret_api_key", &self.credentials.secret_api_key)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error("upload request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TipjarError::upload(format!(
                "pinning {} failed with {}: {}",
                file.file_name, status, body
            )));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| TipjarError::upload(format!("invalid pin response: {}", e)))?;
        tracing::info!("Pinned {} as {}", file.file_name, pinned.ipfs_hash);
        Ok(pinned.ipfs_hash)
    }

    fn uri_for(&self, content_id: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_url, content_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tipjar_core::config::SecretConfig;

    struct StaticSecrets(SecretConfig);

    #[async_trait]
    impl SecretService for StaticSecrets {
        async fn load_secrets(&self) -> Result<SecretConfig> {
            Ok(self.0.clone())
        }

        async fn secret_file_exists(&self) -> bool {
            true
        }
    }

    fn credentials() -> PinataConfig {
        PinataConfig {
            api_key: "key".into(),
            secret_api_key: "secret".into(),
        }
    }

    #[test]
    fn test_uri_for_uses_gateway() {
        let config = ContentStoreConfig {
            endpoint: "https://api.pinata.cloud/pinning/pinFileToIPFS".into(),
            gateway_url: "https://tipjar.mypinata.cloud/".into(),
            ..ContentStoreConfig::default()
        };
        let store = PinataContentStore::new(&config, credentials());
        assert_eq!(
            store.uri_for("QmHash"),
            "https://tipjar.mypinata.cloud/ipfs/QmHash"
        );
    }

    #[test]
    fn test_upload_timeout_comes_from_config() {
        let mut config = ContentStoreConfig::default();
        assert_eq!(
            PinataContentStore::new(&config, credentials()).timeout,
            Duration::from_secs(60)
        );

        config.timeout_secs = 5;
        let store = PinataContentStore::new(&config, credentials());
        assert_eq!(store.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_file_part_accepts_guessed_mime() {
        let file = ImageFile {
            file_name: "avatar.png".into(),
            mime_type: String::new(),
            bytes: vec![0x89, 0x50, 0x4E, 0x47],
        };
        assert!(PinataContentStore::file_part(&file).is_ok());
    }

    #[tokio::test]
    async fn test_from_secrets_requires_pinata_section() {
        let config = ContentStoreConfig::default();
        let missing = StaticSecrets(SecretConfig::default());
        let err = PinataContentStore::from_secrets(&config, &missing)
            .await
            .err()
            .unwrap();
        assert!(err.is_config());

        let present = StaticSecrets(SecretConfig {
            pinata: Some(credentials()),
        });
        assert!(PinataContentStore::from_secrets(&config, &present).await.is_ok());
    }
}
