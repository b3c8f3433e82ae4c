use anyhow::Result;
use syncplane_core::PersistenceConfig;
use syncplane_db::{ConverterContext, PgPool};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Output format shared by the binaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Load configuration from the environment and open the pool.
pub async fn connect_from_env() -> Result<(PgPool, ConverterContext)> {
    let config = PersistenceConfig::from_env()?;
    let pool = syncplane_db::connect(&config).await?;
    Ok((pool, ConverterContext::from(&config)))
}
