#![warn(clippy::all, rust_2018_idioms)]

pub mod api;
pub mod app;
pub mod pages;
pub mod widgets;

pub use app::LiaisonApp;
