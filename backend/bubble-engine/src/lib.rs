pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::{
    apply_interaction, generate_feed, ExposureLedger, FeedRequest, PreferenceModel, RoundReport,
    Session, SessionMode,
};
