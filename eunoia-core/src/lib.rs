// src/lib.rs

pub mod codec;
pub mod db;
pub mod repositories;
pub mod services;
pub mod tasks;
pub mod utils;

pub use db::Database;
pub use eunoia_common::error::Error;
