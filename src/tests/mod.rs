pub mod common;
mod config_validation;
mod http_fetcher_flow;
mod token_server;
