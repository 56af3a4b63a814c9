// Formatters - 목록 행과 작업 요약 메시지에 쓰는 문자열 포맷팅

use chrono::{DateTime, Local};
use std::time::SystemTime;

/// 파일 크기를 읽기 쉬운 형식으로 포맷팅
///
/// # Examples
/// ```
/// use boksl_shell::utils::formatter::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 B");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// "YYYY-MM-DD HH:MM" (16자 고정)
pub fn format_date(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M").to_string()
}

/// 개수에 따라 단수/복수형 반환
///
/// # Examples
/// ```
/// use boksl_shell::utils::formatter::pluralize;
///
/// assert_eq!(pluralize(1, "item", "items"), "1 item");
/// assert_eq!(pluralize(3, "item", "items"), "3 items");
/// ```
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// 클립보드에 담긴 항목 안내 문구
///
/// 한 항목이면 이름을, 여러 항목이면 개수를 보여준다.
pub fn clipboard_message(verb: &str, names: &[&str], single_is_folder: bool) -> String {
    match names {
        [] => "Nothing selected".to_string(),
        [name] => {
            let kind = if single_is_folder { "folder" } else { "file" };
            format!("{} {} '{}'", verb, kind, name)
        }
        _ => format!("{} {}", verb, pluralize(names.len(), "item", "items")),
    }
}
