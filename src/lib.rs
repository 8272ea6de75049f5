#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod error;
pub mod logs;
pub mod main_db;
pub mod polyline;
pub mod report;
pub mod report_store;
pub mod route_data;
pub mod route_segmenter;
pub mod route_step;
pub mod route_view;
pub mod step_condenser;
pub mod storage;
pub mod utils;

pub use error::Error;
