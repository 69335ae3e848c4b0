//! Application shell building blocks

pub mod gifticon_page;
pub mod route;
pub mod settings;

pub use gifticon_page::GifticonPage;
pub use route::{guard, Guard, Route};
pub use settings::AdminSettings;
