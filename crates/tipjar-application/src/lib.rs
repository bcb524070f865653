pub mod debounce;
pub mod donation_feed_service;
pub mod handle_claim_service;
pub mod price_poller;
pub mod profile_editor_session;
pub mod profile_page_service;
pub mod tip_service;
pub mod transaction;
pub mod withdraw_service;

pub use debounce::Debouncer;
pub use donation_feed_service::{DonationFeedService, FeedSettings};
pub use handle_claim_service::{HandleAvailability, HandleCheck, HandleClaimService};
pub use price_poller::PricePoller;
pub use profile_editor_session::{EditorDeps, ProfileEditorSession};
pub use profile_page_service::ProfilePageService;
pub use tip_service::TipService;
pub use transaction::TransactionTracker;
pub use withdraw_service::{WithdrawService, WithdrawSummary};
