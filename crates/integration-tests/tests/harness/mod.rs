#![allow(dead_code)]

pub mod config;
pub mod mock_vendors;
pub mod server;
pub mod token;
