//! Interface de terminal do jobflow: spinners e saída colorida.
//!
//! Usa `indicatif` para o spinner enquanto uma operação está em voo e
//! `console` para cores. Erros de operação aparecem em linha, em vermelho,
//! ao lado do que falhou.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::ValidationError;
use crate::operation::ErrorInfo;
use crate::remote::{Application, ApplicationStatus, Company, Job};

/// Spinner exibido enquanto uma operação está com `loading = true`.
pub struct OperationProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
}

impl OperationProgress {
    /// Inicia o spinner com o rótulo da operação.
    pub fn start(label: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    /// Remove o spinner sem imprimir nada.
    pub fn clear(&self) {
        self.pb.finish_and_clear();
    }

    pub fn succeed(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("  {} {message}", self.green.apply_to("✓"));
    }

    pub fn fail(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("  {} {}", self.red.apply_to("✗"), self.red.apply_to(message));
    }
}

/// Linha de uma vaga: título, empresa, local e resumo.
pub fn job_line(job: &Job) -> String {
    let company = job.company.as_ref().map_or("?", |c| c.name.as_str());
    let saved = if job.is_saved() { " ★" } else { "" };
    let summary = job.summary();
    if summary.is_empty() {
        format!("#{} {} · {} · {}{saved}", job.id, job.title, company, job.location)
    } else {
        format!(
            "#{} {} · {} · {}{saved}\n    {summary}",
            job.id, job.title, company, job.location
        )
    }
}

pub fn print_jobs(jobs: &[Job]) {
    if jobs.is_empty() {
        println!("{}", Style::new().dim().apply_to("No Jobs Found"));
        return;
    }
    for job in jobs {
        println!("{}", job_line(job));
    }
}

pub fn print_companies(companies: &[Company]) {
    let bold = Style::new().bold();
    for company in companies {
        println!("#{} {}", company.id, bold.apply_to(&company.name));
    }
}

/// Linha de uma candidatura, como o recrutador a vê: nome do candidato.
pub fn application_line(application: &Application) -> String {
    details_line(&application.name, application)
}

/// Linha de uma candidatura do próprio candidato: "<vaga> at <empresa>".
pub fn own_application_line(application: &Application, job: Option<&Job>) -> String {
    let heading = match job {
        Some(job) => {
            let company = job.company.as_ref().map_or("?", |c| c.name.as_str());
            format!("{} at {company}", job.title)
        }
        None => format!("job #{}", application.job_id),
    };
    details_line(&heading, application)
}

/// Experiência, formação, habilidades, status colorido e, se houver, o currículo.
fn details_line(heading: &str, application: &Application) -> String {
    let style = match application.status {
        ApplicationStatus::Applied => Style::new().cyan(),
        ApplicationStatus::Reviewing => Style::new().yellow(),
        ApplicationStatus::Rejected => Style::new().red(),
        ApplicationStatus::Accepted => Style::new().green(),
    };
    let line = format!(
        "#{} {heading} · {} yrs · {} · {} · {}",
        application.id,
        application.experience,
        application.education,
        application.skills,
        style.apply_to(application.status)
    );
    match &application.resume {
        Some(resume) => format!("{line}\n    resume: {resume}"),
        None => line,
    }
}

pub fn print_applications(applications: &[Application]) {
    if applications.is_empty() {
        println!("{}", Style::new().dim().apply_to("No Applications"));
        return;
    }
    for application in applications {
        println!("{}", application_line(application));
    }
}

/// Candidaturas do candidato para uma vaga, identificadas pela vaga.
pub fn print_own_applications(applications: &[Application], job: Option<&Job>) {
    if applications.is_empty() {
        println!("{}", Style::new().dim().apply_to("No Applications"));
        return;
    }
    for application in applications {
        println!("{}", own_application_line(application, job));
    }
}

/// Erro em linha de uma operação remota.
pub fn print_inline_error(operation: &str, info: &ErrorInfo) {
    let red = Style::new().red();
    let status = info.status.map(|s| format!(" ({s})")).unwrap_or_default();
    println!(
        "  {} {operation}: {}{status}",
        red.apply_to("✗"),
        red.apply_to(&info.message)
    );
}

/// Uma mensagem por campo inválido, como abaixo de cada input.
pub fn print_field_errors(errors: &[ValidationError]) {
    let red = Style::new().red();
    for error in errors {
        let field = match error {
            ValidationError::Field { field, .. } => *field,
            ValidationError::UnknownStatus(_) => "status",
        };
        println!("  {field}: {}", red.apply_to(error.message()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job {
            id: 3,
            title: "Backend Engineer".into(),
            description: "Own the API. Rust and Postgres.".into(),
            location: "Goa".into(),
            company_id: 1,
            recruiter_id: "user_r".into(),
            is_open: true,
            requirements: String::new(),
            company: Some(Company {
                id: 1,
                name: "Acme".into(),
                logo_url: None,
            }),
            saved: Vec::new(),
            created_at: None,
        }
    }

    #[test]
    fn job_line_shows_company_and_summary() {
        let line = console::strip_ansi_codes(&job_line(&job())).to_string();
        assert!(line.starts_with("#3 Backend Engineer · Acme · Goa"));
        assert!(line.ends_with("Own the API."));
        assert!(!line.contains('★'));
    }

    fn application() -> Application {
        Application {
            id: 6,
            job_id: 3,
            candidate_id: "user_c".into(),
            name: "Asha Rao".into(),
            status: ApplicationStatus::Reviewing,
            experience: 4,
            skills: "Rust".into(),
            education: "Graduate".into(),
            resume: None,
        }
    }

    #[test]
    fn application_line_shows_education_and_status() {
        let line = console::strip_ansi_codes(&application_line(&application())).to_string();
        assert_eq!(line, "#6 Asha Rao · 4 yrs · Graduate · Rust · reviewing");
    }

    #[test]
    fn application_line_links_the_resume() {
        let mut application = application();
        application.resume = Some("https://cdn/resumes/asha.pdf".into());
        let line = console::strip_ansi_codes(&application_line(&application)).to_string();
        assert!(line.ends_with("\n    resume: https://cdn/resumes/asha.pdf"));
    }

    #[test]
    fn own_application_is_titled_by_job_and_company() {
        let job = job();
        let line = own_application_line(&application(), Some(&job));
        let line = console::strip_ansi_codes(&line).to_string();
        assert_eq!(line, "#6 Backend Engineer at Acme · 4 yrs · Graduate · Rust · reviewing");

        let line = own_application_line(&application(), None);
        let line = console::strip_ansi_codes(&line).to_string();
        assert!(line.starts_with("#6 job #3 · "));
    }
}
