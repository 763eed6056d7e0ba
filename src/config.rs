//! Configuração do jobflow carregada a partir de `jobflow.toml`.
//!
//! A struct [`JobflowConfig`] contém o endereço do armazenamento remoto, as
//! credenciais e a identidade padrão. Valores ausentes usam defaults.
//! A variável de ambiente `JOBFLOW_API_KEY` tem precedência sobre o arquivo.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::JobflowError;
use crate::identity::Identity;

/// Nome do arquivo procurado no diretório atual.
pub const CONFIG_FILE: &str = "jobflow.toml";

/// Configuração de nível superior carregada de `jobflow.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobflowConfig {
    /// URL base do armazenamento (REST + storage).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chave pública do projeto, enviada no cabeçalho `apikey`.
    #[serde(default)]
    pub api_key: String,

    /// Token do usuário autenticado, quando houver.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Tempo máximo de cada requisição, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Identidade usada quando a CLI não informa outra.
    #[serde(default)]
    pub identity: Identity,
}

// Valor padrão da URL base: instância local.
fn default_base_url() -> String {
    "http://localhost:54321".to_string()
}

// Valor padrão do timeout: 30s.
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for JobflowConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            access_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            identity: Identity::default(),
        }
    }
}

impl JobflowConfig {
    /// Carrega `jobflow.toml` do diretório atual, ou os defaults.
    pub fn load() -> Result<Self, JobflowError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Carrega a configuração de `path`. Arquivo ausente não é erro.
    pub fn load_from(path: &Path) -> Result<Self, JobflowError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<JobflowConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo para a chave.
        if let Ok(key) = std::env::var("JOBFLOW_API_KEY") {
            if !key.is_empty() {
                config.api_key = key;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), JobflowError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(JobflowError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(JobflowError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = JobflowConfig::default();
        assert_eq!(config.base_url, "http://localhost:54321");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.api_key.is_empty());
        assert!(config.identity.role.is_none());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            base_url = "https://board.example.com"

            [identity]
            user_id = "user_recruiter"
            role = "recruiter"
        "#;
        let config: JobflowConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.base_url, "https://board.example.com");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.identity.is_recruiter());
        assert!(config.access_token.is_none());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "base_url = \"https://board.example.com\"\nrequest_timeout_secs = 5\n",
        )
        .unwrap();

        let config = JobflowConfig::load_from(&path).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = JobflowConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "base_url = \"ftp://nope\"\n").unwrap();
        assert!(matches!(
            JobflowConfig::load_from(&path),
            Err(JobflowError::Config(_))
        ));

        std::fs::write(&path, "request_timeout_secs = \"soon\"\n").unwrap();
        assert!(matches!(
            JobflowConfig::load_from(&path),
            Err(JobflowError::Toml(_))
        ));
    }
}
