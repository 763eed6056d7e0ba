//! Interface de linha de comando do jobflow baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (jobs, save, status,
//! post-job, demo, ...) e flags globais (--config, --user, --role,
//! --offline, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::remote::{ApplicationId, CompanyId, JobId};

/// jobflow: cliente do quadro de vagas.
#[derive(Debug, Parser)]
#[command(name = "jobflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./jobflow.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Usuário a usar nesta sessão, no lugar do configurado.
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Papel do usuário (`recruiter` ou `candidate`).
    #[arg(long, global = true)]
    pub role: Option<String>,

    /// Usa o quadro em memória em vez do armazenamento remoto.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lista vagas, com filtros opcionais.
    Jobs {
        #[arg(long)]
        location: Option<String>,

        /// Id da empresa.
        #[arg(long)]
        company: Option<CompanyId>,

        /// Busca por título.
        #[arg(long)]
        search: Option<String>,
    },

    /// Lista as empresas cadastradas.
    Companies,

    /// Alterna o estado "salva" de uma vaga.
    Save { job_id: JobId },

    /// Remove uma vaga publicada pelo usuário.
    DeleteJob { job_id: JobId },

    /// Lista as candidaturas de uma vaga.
    Applications { job_id: JobId },

    /// Altera o status de uma candidatura.
    Status {
        /// Vaga da candidatura (usada para o refresh da lista).
        #[arg(long)]
        job: JobId,

        application_id: ApplicationId,

        /// applied, reviewing, rejected ou accepted.
        status: String,
    },

    /// Publica uma vaga nova.
    PostJob {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        location: String,

        #[arg(long)]
        company: Option<CompanyId>,

        /// Requisitos em markdown.
        #[arg(long, default_value = "")]
        requirements: String,
    },

    /// Cadastra uma empresa com logotipo.
    AddCompany {
        name: String,

        /// Arquivo PNG ou JPEG.
        #[arg(long)]
        logo: Option<PathBuf>,
    },

    /// Executa a demonstração embutida com latências roteirizadas.
    Demo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_jobs_filters() {
        let cli = Cli::parse_from(["jobflow", "jobs", "--location", "Goa", "--company", "2"]);
        match cli.command {
            Command::Jobs {
                location,
                company,
                search,
            } => {
                assert_eq!(location.as_deref(), Some("Goa"));
                assert_eq!(company, Some(2));
                assert!(search.is_none());
            }
            _ => panic!("expected Jobs command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "jobflow",
            "--user",
            "user_r",
            "--role",
            "recruiter",
            "--offline",
            "--verbose",
            "demo",
        ]);
        assert!(cli.offline);
        assert!(cli.verbose);
        assert_eq!(cli.user.as_deref(), Some("user_r"));
        assert_eq!(cli.role.as_deref(), Some("recruiter"));
        assert!(matches!(cli.command, Command::Demo));
    }

    #[test]
    fn cli_parses_status_subcommand() {
        let cli = Cli::parse_from(["jobflow", "status", "--job", "3", "6", "accepted"]);
        match cli.command {
            Command::Status {
                job,
                application_id,
                status,
            } => {
                assert_eq!(job, 3);
                assert_eq!(application_id, 6);
                assert_eq!(status, "accepted");
            }
            _ => panic!("expected Status command"),
        }
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
