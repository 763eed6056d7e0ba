//! Quadro de vagas em memória que cumpre o mesmo contrato da API remota.
//!
//! Usado pelo modo `--offline`, pela demonstração embutida e pelos testes.
//! Latências e falhas podem ser roteirizadas por chamada, o que permite
//! reproduzir liquidações fora de ordem de forma determinística.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use super::api::JobBoardApi;
use super::error::RemoteError;
use super::types::{
    Application, ApplicationStatus, Company, CompanyId, Job, JobFilter, JobId, NewCompany, NewJob,
    SaveJobRequest, SavedJob, StatusUpdate,
};

/// Resposta forçada para a próxima chamada, em ordem de invocação.
#[derive(Debug, Clone)]
enum Override {
    Fail(String),
    Empty,
}

#[derive(Debug, Default)]
struct Script {
    delays: VecDeque<Duration>,
    overrides: VecDeque<Override>,
    calls: HashMap<&'static str, usize>,
}

#[derive(Debug, Default)]
struct Tables {
    companies: Vec<Company>,
    jobs: Vec<Job>,
    saved: Vec<SavedJob>,
    applications: Vec<Application>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Quadro de vagas em memória.
#[derive(Debug, Default)]
pub struct InMemoryBoard {
    tables: Mutex<Tables>,
    script: Mutex<Script>,
}

impl InMemoryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quadro com algumas empresas, vagas e candidaturas de exemplo.
    pub fn seeded() -> Self {
        let board = Self::new();
        let acme = board.insert_company("Acme");
        let globex = board.insert_company("Globex");
        let backend = board.insert_job(
            "Backend Engineer",
            "Own the job-board API. Rust and Postgres.",
            "Karnataka",
            acme,
            "user_recruiter",
        );
        board.insert_job(
            "Frontend Engineer",
            "Build the candidate dashboard. React experience helps.",
            "Goa",
            globex,
            "user_recruiter",
        );
        board.insert_job(
            "Rust Platform Engineer",
            "Run the async services. Tokio everywhere.",
            "Karnataka",
            globex,
            "user_other",
        );
        board.insert_application(backend, "user_candidate", "Asha Rao");
        board.insert_application(backend, "user_candidate_2", "Vikram Iyer");
        board
    }

    /// Atraso da próxima chamada invocada (consumido na ordem de invocação).
    pub fn push_delay(&self, delay: Duration) {
        self.script().delays.push_back(delay);
    }

    /// A próxima chamada invocada falha com `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.script().overrides.push_back(Override::Fail(message.into()));
    }

    /// A próxima chamada invocada responde sem linhas e sem efeito.
    pub fn answer_empty_next(&self) {
        self.script().overrides.push_back(Override::Empty);
    }

    /// Quantas vezes a operação `op` foi chamada.
    pub fn calls(&self, op: &str) -> usize {
        self.script().calls.get(op).copied().unwrap_or(0)
    }

    pub fn insert_company(&self, name: &str) -> CompanyId {
        let mut tables = self.tables();
        let id = tables.next_id();
        tables.companies.push(Company {
            id,
            name: name.to_string(),
            logo_url: Some(format!("memory://company-logo/{name}.png")),
        });
        id
    }

    pub fn insert_job(
        &self,
        title: &str,
        description: &str,
        location: &str,
        company_id: CompanyId,
        recruiter_id: &str,
    ) -> JobId {
        let mut tables = self.tables();
        let id = tables.next_id();
        tables.jobs.push(Job {
            id,
            title: title.to_string(),
            description: description.to_string(),
            location: location.to_string(),
            company_id,
            recruiter_id: recruiter_id.to_string(),
            is_open: true,
            requirements: String::new(),
            company: None,
            saved: Vec::new(),
            created_at: Some(chrono::Utc::now()),
        });
        id
    }

    pub fn insert_application(&self, job_id: JobId, candidate_id: &str, name: &str) -> i64 {
        let mut tables = self.tables();
        let id = tables.next_id();
        tables.applications.push(Application {
            id,
            job_id,
            candidate_id: candidate_id.to_string(),
            name: name.to_string(),
            status: ApplicationStatus::Applied,
            experience: 3,
            skills: "Rust, SQL".to_string(),
            education: "Graduate".to_string(),
            resume: None,
        });
        id
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registra a chamada, aguarda a latência e aplica o roteiro.
    /// Retorna `Ok(false)` quando a chamada deve responder vazio.
    async fn settle(&self, op: &'static str) -> Result<bool, RemoteError> {
        let (delay, forced) = {
            let mut script = self.script();
            *script.calls.entry(op).or_insert(0) += 1;
            let delay = script.delays.pop_front().unwrap_or_default();
            (delay, script.overrides.pop_front())
        };
        if !delay.is_zero() {
            sleep(delay).await;
        }
        debug!(op, delay_ms = delay.as_millis() as u64, "in-memory call settled");
        match forced {
            Some(Override::Fail(message)) => Err(RemoteError::Rejected { message }),
            Some(Override::Empty) => Ok(false),
            None => Ok(true),
        }
    }
}

impl JobBoardApi for InMemoryBoard {
    async fn get_jobs(&self, viewer: Option<&str>, filter: &JobFilter) -> Result<Vec<Job>, RemoteError> {
        if !self.settle("get_jobs").await? {
            return Ok(Vec::new());
        }
        let tables = self.tables();
        let jobs = tables
            .jobs
            .iter()
            .filter(|job| filter.matches(job))
            .map(|job| {
                let mut job = job.clone();
                job.company = tables.companies.iter().find(|c| c.id == job.company_id).cloned();
                job.saved = tables
                    .saved
                    .iter()
                    .filter(|s| s.job_id == job.id && Some(s.user_id.as_str()) == viewer)
                    .cloned()
                    .collect();
                job
            })
            .collect();
        Ok(jobs)
    }

    async fn get_companies(&self) -> Result<Vec<Company>, RemoteError> {
        if !self.settle("get_companies").await? {
            return Ok(Vec::new());
        }
        Ok(self.tables().companies.clone())
    }

    async fn add_new_company(&self, company: &NewCompany) -> Result<Vec<Company>, RemoteError> {
        if !self.settle("add_new_company").await? {
            return Ok(Vec::new());
        }
        let mut tables = self.tables();
        let row = Company {
            id: tables.next_id(),
            name: company.name.clone(),
            logo_url: Some(format!("memory://company-logo/{}", company.logo.file_name)),
        };
        tables.companies.push(row.clone());
        Ok(vec![row])
    }

    async fn add_new_job(&self, job: &NewJob) -> Result<Vec<Job>, RemoteError> {
        if !self.settle("add_new_job").await? {
            return Ok(Vec::new());
        }
        let mut tables = self.tables();
        let row = Job {
            id: tables.next_id(),
            title: job.title.clone(),
            description: job.description.clone(),
            location: job.location.clone(),
            company_id: job.company_id,
            recruiter_id: job.recruiter_id.clone(),
            is_open: job.is_open,
            requirements: job.requirements.clone(),
            company: None,
            saved: Vec::new(),
            created_at: Some(chrono::Utc::now()),
        };
        tables.jobs.push(row.clone());
        Ok(vec![row])
    }

    async fn delete_job(&self, job_id: JobId) -> Result<Vec<Job>, RemoteError> {
        if !self.settle("delete_job").await? {
            return Ok(Vec::new());
        }
        let mut tables = self.tables();
        let (removed, kept): (Vec<Job>, Vec<Job>) =
            tables.jobs.drain(..).partition(|job| job.id == job_id);
        tables.jobs = kept;
        tables.saved.retain(|s| s.job_id != job_id);
        Ok(removed)
    }

    async fn save_job(&self, request: &SaveJobRequest) -> Result<Vec<SavedJob>, RemoteError> {
        if !self.settle("save_job").await? {
            return Ok(Vec::new());
        }
        let mut tables = self.tables();
        let same = |s: &SavedJob| s.user_id == request.user_id && s.job_id == request.job_id;

        if request.already_saved {
            tables.saved.retain(|s| !same(s));
            return Ok(Vec::new());
        }
        if let Some(existing) = tables.saved.iter().find(|&s| same(s)) {
            return Ok(vec![existing.clone()]);
        }
        let row = SavedJob {
            id: tables.next_id(),
            user_id: request.user_id.clone(),
            job_id: request.job_id,
        };
        tables.saved.push(row.clone());
        Ok(vec![row])
    }

    async fn update_application_status(
        &self,
        update: &StatusUpdate,
    ) -> Result<Vec<Application>, RemoteError> {
        if !self.settle("update_application_status").await? {
            return Ok(Vec::new());
        }
        let mut tables = self.tables();
        Ok(tables
            .applications
            .iter_mut()
            .filter(|a| a.id == update.application_id)
            .map(|a| {
                a.status = update.status;
                a.clone()
            })
            .collect())
    }

    async fn get_applications(&self, job_id: JobId) -> Result<Vec<Application>, RemoteError> {
        if !self.settle("get_applications").await? {
            return Ok(Vec::new());
        }
        Ok(self
            .tables()
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect())
    }
}
