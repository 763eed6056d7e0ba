//! Registros e payloads trocados com a API remota do quadro de vagas.
//!
//! Os nomes de campo seguem as colunas das tabelas (`jobs`, `companies`,
//! `saved_jobs`, `applications`); os payloads de mutação são tipos fechados,
//! validados antes de qualquer chamada.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub type UserId = String;
pub type JobId = i64;
pub type CompanyId = i64;
pub type ApplicationId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Relação "vaga salva" entre um usuário e uma vaga.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedJob {
    pub id: i64,
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub job_id: JobId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub company_id: CompanyId,
    pub recruiter_id: UserId,
    #[serde(rename = "isOpen", default)]
    pub is_open: bool,
    #[serde(default)]
    pub requirements: String,
    /// Empresa embutida pela consulta de listagem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    /// Linhas de `saved_jobs` do usuário atual para esta vaga.
    #[serde(default)]
    pub saved: Vec<SavedJob>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Resumo exibido no cartão: a descrição até o primeiro ponto, inclusive.
    /// Sem ponto, o resumo é vazio.
    pub fn summary(&self) -> &str {
        match self.description.find('.') {
            Some(idx) => &self.description[..=idx],
            None => "",
        }
    }

    pub fn is_saved(&self) -> bool {
        !self.saved.is_empty()
    }
}

/// Status de revisão de uma candidatura. Conjunto fechado; qualquer outro
/// valor é rejeitado no cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Reviewing,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    #[serde(default)]
    pub candidate_id: UserId,
    #[serde(default)]
    pub name: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub resume: Option<String>,
}

/// Filtros da listagem de vagas. `None` significa "sem filtro".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilter {
    pub location: Option<String>,
    pub company_id: Option<CompanyId>,
    pub search_query: Option<String>,
}

impl JobFilter {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.company_id.is_none() && self.search_query.is_none()
    }

    pub fn matches(&self, job: &Job) -> bool {
        let location = self.location.as_ref().is_none_or(|l| &job.location == l);
        let company = self.company_id.is_none_or(|c| job.company_id == c);
        let query = self
            .search_query
            .as_ref()
            .is_none_or(|q| job.title.to_lowercase().contains(&q.to_lowercase()));
        location && company && query
    }
}

/// Payload do toggle de vaga salva. O lado remoto decide entre criar e
/// remover a partir de `already_saved`, o estado anterior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveJobRequest {
    pub user_id: UserId,
    pub job_id: JobId,
    pub already_saved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
}

/// Vaga nova já validada, pronta para inserção.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub company_id: CompanyId,
    pub requirements: String,
    pub recruiter_id: UserId,
    #[serde(rename = "isOpen")]
    pub is_open: bool,
}

/// Arquivo de logotipo enviado junto com uma empresa nova.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Empresa nova já validada; o logotipo é enviado ao storage antes da inserção.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub logo: LogoFile,
}
