mod client;
mod panchang_url;

pub mod domain;

pub use client::*;
pub use panchang_url::PanchangUrl;
