//! Tipos de erro para as chamadas ao armazenamento remoto do quadro de vagas.
//!
//! Define [`RemoteError`] com variantes para rate limiting, erros da API,
//! recusas sem status HTTP e erros de rede. Usa `thiserror` para derivar
//! `Display` e `Error` a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao chamar a API remota.
///
/// - [`RateLimited`](RemoteError::RateLimited): o servidor retornou HTTP 429
/// - [`Api`](RemoteError::Api): qualquer outro erro HTTP (4xx/5xx)
/// - [`Rejected`](RemoteError::Rejected): recusa sem status HTTP (ex.: quadro em memória)
/// - [`Network`](RemoteError::Network): falha na camada de rede
#[derive(Debug, Error)]
pub enum RemoteError {
    /// O servidor retornou HTTP 429.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Erro retornado pela API, com o código HTTP e a mensagem do corpo.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// O lado remoto recusou a chamada sem um status HTTP.
    #[error("{message}")]
    Rejected { message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout, corpo inválido).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl RemoteError {
    /// Mensagem legível exibida ao usuário junto do controle afetado.
    pub fn message(&self) -> String {
        match self {
            RemoteError::Api { message, .. } | RemoteError::Rejected { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Código HTTP associado à falha, quando existir.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::RateLimited { .. } => Some(429),
            RemoteError::Api { status, .. } => Some(*status),
            RemoteError::Network(e) => e.status().map(|s| s.as_u16()),
            RemoteError::Rejected { .. } => None,
        }
    }
}
