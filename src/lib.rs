pub mod aggregate;
pub mod boxscore;
pub mod collect;
pub mod config;
pub mod export;
pub mod http_client;
pub mod payload;
pub mod schedule;
pub mod scoreboard;
