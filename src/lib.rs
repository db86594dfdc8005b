//! # Blog Query Library
//!
//! A small blog (users and posts) stored in SQLite, plus a pipeline that
//! turns plain-language questions into read-only SQL.
//!
//! The pipeline asks an LLM for a statement, repairs common formatting
//! mistakes with [`sanitize`], validates the result with [`guard`] and runs
//! it through [`db`]. See [`pipeline`] for the stages and failure model.

pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod sanitize;
pub mod schema;
