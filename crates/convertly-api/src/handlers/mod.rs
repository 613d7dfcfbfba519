pub mod clear;
pub mod convert;
pub mod download;
