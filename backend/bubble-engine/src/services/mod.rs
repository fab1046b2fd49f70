pub mod analytics;
pub mod catalog;
pub mod feed;
pub mod ledger;
pub mod preference;
pub mod session;

pub use feed::{generate_feed, FeedPartition, FeedRequest};
pub use ledger::ExposureLedger;
pub use preference::{apply_interaction, PreferenceModel};
pub use session::{RoundReport, Session, SessionMode};
