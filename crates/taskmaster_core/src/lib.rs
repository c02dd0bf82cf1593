pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod session;
pub mod storage;
pub mod task_list;
