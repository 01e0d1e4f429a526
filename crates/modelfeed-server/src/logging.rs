use anyhow::Result;
use std::sync::Once;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

// Used to ensure we only set up tracing once
static INIT: Once = Once::new();

/// Console logging with an env-filter override (`RUST_LOG`).
pub fn setup_logging() -> Result<()> {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("")
                .add_directive("modelfeed=info".parse().expect("static directive"))
                .add_directive("modelfeed_server=info".parse().expect("static directive"))
                .add_directive(LevelFilter::WARN.into())
        });

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    });
    Ok(())
}
