pub mod alias;
pub mod application;
pub mod commands;
pub mod config;
pub mod declaration;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod runtime;
pub mod toolchain;
