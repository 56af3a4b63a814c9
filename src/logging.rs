//! tracing 초기화
//!
//! 터미널은 UI가 차지하므로 로그는 일 단위로 나뉘는 파일에만 쓴다.
//! `RUST_LOG`가 있으면 설정의 `log_level`보다 우선한다.

use crate::config::Settings;
use anyhow::Context;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `main` 시작 부분에서 한 번 호출. 반환된 guard는 종료 시까지 들고 있어야 한다.
pub fn init(settings: &Settings) -> anyhow::Result<WorkerGuard> {
    fs::create_dir_all(&settings.log_dir)
        .with_context(|| format!("cannot create log dir {}", settings.log_dir.display()))?;

    // <log_dir>/bokslsh.log.YYYY-MM-DD
    let appender = rolling::daily(&settings.log_dir, "bokslsh.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .context("invalid log level")?;

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("tracing already initialised")?;

    Ok(guard)
}
