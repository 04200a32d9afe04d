//! Core of the money-choices game: catalogs, turn engine, outcome analysis,
//! leaderboard and persistence. No rendering lives here.

pub mod asset_catalog;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod event_catalog;
pub mod event_resolution;
pub mod outcome;
pub mod persistence;
pub mod presenter;
pub mod ranking;
pub mod return_engine;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod types;
