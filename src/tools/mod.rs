//! Tools module

pub mod dtos;
pub mod gifticon;
pub mod jwt;
pub mod options;

pub use dtos::*;
pub use options::*;
