//! Entity services: repository orchestration, upload-shortfall warnings,
//! and best-effort notifications.
//!
//! Every method returns `Result<_, AppError>`; writes return
//! [`WithWarnings`](crate::outcome::WithWarnings) so a saved entity with a
//! failed attachment still reads as a success. A direct by-id lookup that
//! finds nothing is promoted to `NotFound` here — at the repository level
//! that is a plain `None`.

mod auth;
mod comments;
mod events;
mod match_results;
mod notify;
mod tournaments;

pub use auth::{AuthService, AuthSession};
pub use comments::CommentService;
pub use events::EventService;
pub use match_results::MatchResultService;
pub use notify::{LogNotifier, Notification, Notifier, WriteAction};
pub use tournaments::TournamentService;

use std::sync::Arc;

use itertools::Itertools;

use crate::repository::UploadReport;
use crate::store::ContentStore;

/// Flatten per-field upload outcomes into user-facing warnings.
///
/// One sentence per failed field; successful fields contribute nothing.
pub(crate) fn upload_warnings(report: &UploadReport) -> Vec<String> {
    report
        .failures()
        .map(|failure| {
            let reason = failure
                .outcome
                .as_ref()
                .err()
                .map(crate::AppError::user_message)
                .unwrap_or_default();
            format!(
                "The entry was saved, but the {} upload failed: {reason}",
                failure.field
            )
        })
        .collect_vec()
}

/// Composition root: build every service once, at process start, from an
/// explicit store handle and notifier. There are no lazily-initialized
/// globals anywhere in this crate.
pub struct Services {
    pub match_results: MatchResultService,
    pub events: EventService,
    pub tournaments: TournamentService,
    pub comments: CommentService,
    pub auth: AuthService,
}

impl Services {
    pub fn new(store: Arc<dyn ContentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            match_results: MatchResultService::new(Arc::clone(&store), Arc::clone(&notifier)),
            events: EventService::new(Arc::clone(&store), Arc::clone(&notifier)),
            tournaments: TournamentService::new(Arc::clone(&store), Arc::clone(&notifier)),
            comments: CommentService::new(Arc::clone(&store), Arc::clone(&notifier)),
            auth: AuthService::new(store),
        }
    }
}
