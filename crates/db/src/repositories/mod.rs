//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. `_in_tx` variants take an open
//! `PgConnection` so the settlement and gift-box paths can compose several
//! writes into one transaction.

pub mod card_link_repo;
pub mod challenge_repo;
pub mod delivery_repo;
pub mod discount_code_repo;
pub mod enrollment_repo;
pub mod gift_box_repo;
pub mod gift_video_repo;
pub mod payment_history_repo;
pub mod point_repo;
pub mod run_history_repo;
pub mod settlement_repo;
pub mod user_repo;

pub use card_link_repo::CardLinkRepo;
pub use challenge_repo::ChallengeRepo;
pub use delivery_repo::DeliveryRepo;
pub use discount_code_repo::DiscountCodeRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use gift_box_repo::{GiftBoxRepo, GiftOutcome};
pub use gift_video_repo::GiftVideoRepo;
pub use payment_history_repo::{PaymentHistoryRepo, RecordPayment};
pub use point_repo::PointRepo;
pub use run_history_repo::RunHistoryRepo;
pub use settlement_repo::{SettleChallenge, SettleDelivery, SettlementOutcome, SettlementRepo};
pub use user_repo::UserRepo;
