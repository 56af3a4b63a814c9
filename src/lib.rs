//! boksl-shell: 단일 패널 파일 셸의 탐색/백그라운드 작업 코어
//!
//! `models`는 상태, `system`은 저장소 서비스, `app`은 세션과 작업 조정을 담당한다.
//! 터미널 UI(`ui`, `core`)는 `bokslsh` 바이너리가 사용한다.

pub mod app;
pub mod config;
pub mod core;
pub mod logging;
pub mod models;
pub mod system;
pub mod ui;
pub mod utils;
