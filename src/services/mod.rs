//! Services module

mod base_service;
mod gifticon_service;
mod stats_service;
mod team_service;
mod user_service;

pub use base_service::BaseService;
pub use gifticon_service::{GifticonApi, GifticonForm, GifticonService};
pub use stats_service::StatsService;
pub use team_service::{filter_teams, TeamService};
pub use user_service::{filter_users, UserService};
