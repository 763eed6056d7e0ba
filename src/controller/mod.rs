//! Screen-level controllers built from [`AsyncOperation`](crate::operation::AsyncOperation)s.
//!
//! Each controller owns the operations of one surface and publishes what the
//! surface should render through watch channels. Mutations that change a
//! list owned elsewhere finish with [`mutate_then_refresh`].

mod company;
mod job_card;
mod listing;
mod posting;
mod refresh;
mod status;
mod toggle;

pub use company::{CompanyDrawer, DrawerView};
pub use job_card::JobCard;
pub use listing::JobListing;
pub use posting::{JobPoster, PostError, PostOutcome};
pub use refresh::{Chained, Refresh, RefreshStatus, mutate_then_refresh};
pub use status::ApplicationCard;
pub use toggle::{SavedJobToggle, ToggleView};
