//! Teaming Admin
//!
//! Client library for the Teaming admin backend: durable token storage, JWT
//! expiry checks, a session manager with silent refresh, an HTTP client that
//! retries once after an authorization failure, and the gifticon list
//! pipeline used by the admin console.

pub mod app;
pub mod client;
pub mod client_response_error;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod stores;
pub mod tools;
pub mod transport;

pub use app::{guard, AdminSettings, GifticonPage, Guard, Route};
pub use client::Client;
pub use client_response_error::ClientResponseError;
pub use config::{Config, Endpoints};
pub use error::{Error, Result};
pub use services::{
    GifticonApi, GifticonForm, GifticonService, StatsService, TeamService, UserService,
};
pub use session::{AuthAction, Session, SessionManager};
pub use stores::{FileStorage, MemoryStorage, Storage, TokenStore};
pub use tools::dtos::{
    AuthTokens, DashboardStats, Gifticon, GifticonRequest, Grade, LoginRequest, MemberModel,
    TeamModel, User,
};
pub use tools::gifticon::{GifticonFilters, SortField, SortOptions, SortOrder};
pub use transport::Transport;
