//! CLI subcommands.

pub mod migrate;
pub mod user;

use secrecy::SecretString;

/// Read the database URL the same way the server does.
fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var("WATERLINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
