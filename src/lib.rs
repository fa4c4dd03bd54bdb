pub mod artifact;
pub mod config;
pub mod dates;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod notifier;
pub mod record;
pub mod sources;
pub mod viewer;
