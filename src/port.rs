//! Launch-time port selection for ASP.NET Core apps
//!
//! Platforms that inject `PORT` expect the app to bind it; Kestrel only reads
//! `ASPNETCORE_URLS`. When the app has not set its own URLs, bind all interfaces on
//! `PORT`, or 8080 when `PORT` is missing or not a number.

use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::debug;

pub const ASPNETCORE_URLS: &str = "ASPNETCORE_URLS";
pub const PORT: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variables to export, empty when `ASPNETCORE_URLS` is already set
pub fn choose_port<F>(lookup: F) -> BTreeMap<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env = BTreeMap::new();

    if lookup(ASPNETCORE_URLS).is_some() {
        debug!("{} already set, leaving it alone", ASPNETCORE_URLS);
        return env;
    }

    let port = match lookup(PORT) {
        Some(value) => value.trim().parse::<u16>().unwrap_or_else(|_| {
            debug!("Ignoring invalid {}={}", PORT, value);
            DEFAULT_PORT
        }),
        None => DEFAULT_PORT,
    };

    env.insert(
        ASPNETCORE_URLS.to_string(),
        format!("http://0.0.0.0:{port}"),
    );
    env
}

/// Writes `KEY="value"` lines in the exec.d format
pub fn write_exports<W: Write>(writer: &mut W, env: &BTreeMap<String, String>) -> io::Result<()> {
    for (key, value) in env {
        writeln!(writer, "{}={:?}", key, value)?;
    }
    Ok(())
}
