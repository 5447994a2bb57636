pub mod config;
pub mod directory;
pub mod document;
pub mod error;
pub mod fixtures;
pub mod model;
pub mod normalize;
pub mod persist;
pub mod standings;

pub use directory::{Directory, resolve};
pub use error::StandingsError;
pub use fixtures::{LiveClock, Tab, classify};
pub use model::{
    Competition, DirectoryEntity, GroupedList, MatchResult, MatchStatus, PositionChange, Team,
    TeamStats,
};
pub use normalize::normalize;
pub use standings::{StandingsOptions, compute_standings, compute_standings_with};
