mod client;
mod config;

pub use client::SupabaseMatchRepository;
pub use config::SupabaseConfig;
