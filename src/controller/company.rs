use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use super::refresh::{Chained, Refresh, RefreshStatus, mutate_then_refresh};
use crate::error::{JobflowError, ValidationError};
use crate::identity::Identity;
use crate::operation::{AsyncOperation, OperationState};
use crate::remote::api::AddCompanyCall;
use crate::remote::{Company, JobBoardApi, LogoFile};
use crate::validate::CompanyDraft;

/// Inputs and inline errors of the "add company" drawer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawerView {
    pub open: bool,
    pub draft: CompanyDraft,
    pub field_errors: Vec<ValidationError>,
}

/// Drawer that creates a company from the job-posting form.
///
/// After a creation that returned a row, the companies list is refreshed
/// exactly once and the drawer closes with a fresh draft. An empty result
/// leaves the drawer open and does not refresh.
pub struct CompanyDrawer<R: JobBoardApi> {
    viewer: Identity,
    op: AsyncOperation<AddCompanyCall<R>>,
    view: watch::Sender<DrawerView>,
}

impl<R: JobBoardApi> CompanyDrawer<R> {
    pub fn new(api: Arc<R>, viewer: Identity) -> Self {
        let (view, _) = watch::channel(DrawerView::default());
        Self {
            viewer,
            op: AsyncOperation::new("add_new_company", AddCompanyCall { api }, ()),
            view,
        }
    }

    pub fn view(&self) -> DrawerView {
        self.view.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        self.view.borrow().open
    }

    pub fn subscribe(&self) -> watch::Receiver<DrawerView> {
        self.view.subscribe()
    }

    pub fn state(&self) -> OperationState<Vec<Company>> {
        self.op.state()
    }

    pub fn open(&self) {
        self.view.send_modify(|v| v.open = true);
    }

    /// Closing keeps the draft so reopening shows what was typed.
    pub fn close(&self) {
        self.view.send_modify(|v| v.open = false);
    }

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.view.send_modify(|v| v.draft.name = name);
    }

    pub fn set_logo(&self, logo: LogoFile) {
        self.view.send_modify(|v| v.draft.logo = Some(logo));
    }

    /// Validate against `known`, create the company, then refresh `companies`.
    ///
    /// Field errors are kept in the view and returned as the first
    /// [`ValidationError`]; no remote call is made in that case. The submit
    /// button is disabled while a creation is in flight, so a second submit
    /// returns [`JobflowError::Busy`].
    pub async fn submit<T: Refresh>(
        &self,
        known: &[Company],
        companies: &T,
    ) -> Result<Chained<Vec<Company>>, JobflowError> {
        self.viewer.require_recruiter("add a company")?;
        if self.op.is_loading() {
            return Err(JobflowError::Busy {
                operation: self.op.name(),
            });
        }
        let draft = self.view.borrow().draft.clone();
        let company = match draft.validate(known) {
            Ok(company) => company,
            Err(errors) => {
                let first = errors.first().cloned();
                self.view.send_modify(|v| v.field_errors = errors);
                return Err(first
                    .unwrap_or(ValidationError::field("name", "Company name is required"))
                    .into());
            }
        };
        self.view.send_modify(|v| v.field_errors.clear());

        let creation = async { self.op.trigger(company).await.map_err(JobflowError::from) };
        let chained = mutate_then_refresh(creation, |rows: &Vec<Company>| !rows.is_empty(), companies).await?;

        match &chained.refresh {
            RefreshStatus::NotRequested => {
                warn!(name = %draft.name, "company creation returned no row");
            }
            _ => {
                info!(name = %draft.name, "company created");
                self.view.send_replace(DrawerView::default());
            }
        }
        Ok(chained)
    }
}
