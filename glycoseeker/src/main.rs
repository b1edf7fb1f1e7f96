use std::io;

use clap::{CommandFactory, FromArgMatches};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use glycoseeker::{explicit_arguments, GlycoSeeker, GlycoSeekerError};

#[cfg(feature = "mimalloc")]
use mimalloc::MiMalloc;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn configure_log(args: &GlycoSeeker) -> io::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .compact()
        .with_timer(fmt::time::ChronoLocal::rfc_3339())
        .with_writer(io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        );

    if let Some(log_file) = args.log_file.as_ref() {
        let handle = std::fs::File::create(log_file)?;
        let (writer, guard) = tracing_appender::non_blocking(handle);
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_timer(fmt::time::ChronoLocal::rfc_3339())
            .with_writer(writer)
            .with_filter(
                EnvFilter::builder()
                    .with_default_directive(tracing::Level::DEBUG.into())
                    .from_env_lossy(),
            );
        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(file_layer)
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry().with(stderr_layer).init();
        Ok(None)
    }
}

fn main() -> Result<(), GlycoSeekerError> {
    let matches = GlycoSeeker::command().get_matches();
    let args = GlycoSeeker::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let mut config = Figment::new()
        .merge(Serialized::defaults(&args))
        .merge(Toml::file("glycoseeker.toml"));
    if let Some(path) = args.config_file.as_ref() {
        config = config.merge(Toml::file_exact(path));
    }
    config = config
        .merge(Env::prefixed("GLYCOSEEKER_"))
        .merge(Serialized::defaults(explicit_arguments(&matches, &args)));

    let driver: GlycoSeeker = config.extract()?;

    let _guard = configure_log(&driver)?;
    if let Ok(text) = toml::to_string_pretty(&driver) {
        debug!("Configuration:\n{text}");
    }
    driver.main()?;
    Ok(())
}
