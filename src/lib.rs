//! Builds an RFC 5545 earnings calendar from Finnhub announcement data.

pub mod config;
pub mod models;
pub mod service;
