//! Инициализация логирования
//!
//! Код приложения пишет через фасад `log`; записи пробрасываются в реестр
//! `tracing-subscriber`, поэтому спаны `tower-http` и teloxide попадают в тот же вывод.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::core::config::LogConfig;

/// Собирает фильтр: `RUST_LOG` важнее директивы из конфига.
fn build_filter(default_directive: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directive)
            .with_context(|| format!("invalid log filter directive {:?}", default_directive)),
    }
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    let file = fs_err::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to create log file")?;
    Ok(file.into_parts().0)
}

/// Инициализирует логгер для вывода в консоль и, опционально, в файл
///
/// # Returns
/// * `Ok(())` - Логгер успешно инициализирован
/// * `Err(anyhow::Error)` - Некорректный фильтр, файл недоступен для записи или логгер уже установлен
pub fn init_logger(config: &LogConfig) -> Result<()> {
    let filter = build_filter(&config.filter)?;

    let file_layer = match config.file.as_deref() {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer);

    tracing_log::LogTracer::init().context("Failed to install log bridge")?;
    tracing::subscriber::set_global_default(subscriber).context("Failed to initialize logger")?;

    Ok(())
}
