#![allow(dead_code)]

pub mod fake_dialect;
pub mod recording_driver;
