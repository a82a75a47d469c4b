//! Timetable and academic-calendar parsing with attendance budgeting and
//! strategic leave suggestions.
//!
//! The core ([`parse`], [`planner`], [`model`]) is pure and synchronous. The
//! [`server`] wraps it in an HTTP API backed by a SQLite store and an
//! external OCR service.

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod ocr;
pub mod parse;
pub mod planner;
pub mod server;
pub mod types;
