//! Drafts collected from input surfaces and their validation into closed
//! payload types. Nothing here talks to the remote store.

use std::path::Path;

use crate::error::ValidationError;
use crate::remote::{Company, CompanyId, LogoFile, NewCompany, NewJob, UserId};

const LOGO_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub company_id: Option<CompanyId>,
    pub requirements: String,
}

impl JobDraft {
    /// Every failing field is reported, not just the first one.
    pub fn validate(&self, recruiter_id: &UserId) -> Result<NewJob, Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(ValidationError::field("title", "Title is required"));
        }
        if self.description.trim().is_empty() {
            errors.push(ValidationError::field("description", "Description is required"));
        }
        if self.location.trim().is_empty() {
            errors.push(ValidationError::field("location", "Select a location"));
        }
        if self.company_id.is_none() {
            errors.push(ValidationError::field("company_id", "Select or Add a new Company"));
        }
        if self.requirements.trim().is_empty() {
            errors.push(ValidationError::field("requirements", "Requirements are required"));
        }

        match self.company_id {
            Some(company_id) if errors.is_empty() => Ok(NewJob {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                location: self.location.trim().to_string(),
                company_id,
                requirements: self.requirements.clone(),
                recruiter_id: recruiter_id.clone(),
                is_open: true,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDraft {
    pub name: String,
    pub logo: Option<LogoFile>,
}

impl CompanyDraft {
    /// Checks shape, logo type and case-insensitive uniqueness against the
    /// companies the surface currently knows about.
    pub fn validate(&self, known: &[Company]) -> Result<NewCompany, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let name = self.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::field("name", "Company name is required"));
        } else if known
            .iter()
            .any(|c| c.name.to_lowercase() == name.to_lowercase())
        {
            errors.push(ValidationError::field("name", "Company already exists"));
        }

        match &self.logo {
            Some(logo) if LOGO_TYPES.contains(&logo.content_type.as_str()) => {
                if errors.is_empty() {
                    return Ok(NewCompany {
                        name: name.to_string(),
                        logo: logo.clone(),
                    });
                }
            }
            _ => errors.push(ValidationError::field("logo", "Only Images are allowed")),
        }
        Err(errors)
    }
}

/// Content type guessed from the file extension; anything else is left to
/// validation to reject.
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Reads a logo from disk into an upload.
pub fn load_logo(path: &Path) -> std::io::Result<LogoFile> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("logo")
        .to_string();
    Ok(LogoFile {
        file_name,
        content_type: content_type_for(path).to_string(),
        bytes,
    })
}
