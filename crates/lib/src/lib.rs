//! Civic core library: domain model, configuration, the generation client, the AI gateway,
//! and the synchronous screen state shared by the CLI and desktop applications.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod gateway;
pub mod init;
pub mod llm;
pub mod model;
pub mod selection;
pub mod session;
pub mod view;
