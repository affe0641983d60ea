//! Database model modules - extends Database with domain-specific methods
//!
//! Each module adds `impl Database` blocks with methods for one table group.

mod action_events; // action_events (append-only audit log / activity feed)
mod agent_profiles; // agent_profiles
mod end_users; // end_users
mod saved_tweets; // saved_tweets (ingested timeline material)
mod tweets; // tweets
mod wallets; // wallets (custodial wallet records)
