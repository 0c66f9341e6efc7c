//! Event log schema, compiled in with include_str!
//!
//! Applied in list order. `000_migrations.sql` creates the bookkeeping
//! table and is safe to run every time; the rest run once each.

pub const BOOKKEEPING: &str = include_str!("000_migrations.sql");

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[("001_initial_schema.sql", include_str!("001_initial_schema.sql"))];
