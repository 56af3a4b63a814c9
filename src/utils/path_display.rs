use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// 이름을 최대 너비에 맞춰 가운데를 생략한다. (확장자가 보이도록)
pub fn truncate_middle(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= ELLIPSIS.len() + 1 {
        return take_by_width(text.chars(), max_width);
    }

    let budget = max_width - ELLIPSIS.len();
    let tail_width = budget / 2;
    let head = take_by_width(text.chars(), budget - tail_width);
    let mut tail: Vec<char> = take_by_width(text.chars().rev(), tail_width)
        .chars()
        .collect();
    tail.reverse();
    format!("{}{}{}", head, ELLIPSIS, tail.into_iter().collect::<String>())
}

/// 경로 표시: HOME은 `~`로 줄이고, 넘치면 뒤쪽 구성요소를 남긴다.
pub fn fit_path(path: &str, max_width: usize) -> String {
    let path = shorten_home(path);
    if path.width() <= max_width {
        return path;
    }
    if max_width <= ELLIPSIS.len() {
        return take_by_width(path.chars(), max_width);
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut width = ELLIPSIS.len();
    for part in path.rsplit('/').filter(|p| !p.is_empty()) {
        let part_width = part.width() + 1;
        if width + part_width > max_width {
            break;
        }
        kept.push(part);
        width += part_width;
    }

    if kept.is_empty() {
        let mut tail: Vec<char> = take_by_width(path.chars().rev(), max_width - ELLIPSIS.len())
            .chars()
            .collect();
        tail.reverse();
        return format!("{}{}", ELLIPSIS, tail.into_iter().collect::<String>());
    }
    kept.reverse();
    format!("{}/{}", ELLIPSIS, kept.join("/"))
}

fn shorten_home(path: &str) -> String {
    let Some(home) = dirs::home_dir() else {
        return path.to_string();
    };
    let home = home.to_string_lossy();
    if home.is_empty() {
        return path.to_string();
    }
    if path == home {
        return "~".to_string();
    }
    match path.strip_prefix(home.as_ref()) {
        Some(rest) if rest.starts_with('/') => format!("~{}", rest),
        _ => path.to_string(),
    }
}

fn take_by_width(chars: impl Iterator<Item = char>, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0;
    for ch in chars {
        let w = UnicodeWidthChar::width(ch).unwrap_or(1);
        if width + w > max_width {
            break;
        }
        out.push(ch);
        width += w;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_middle_keeps_both_ends() {
        assert_eq!(truncate_middle("short.txt", 20), "short.txt");
        let out = truncate_middle("a_really_long_file_name.tar.gz", 14);
        assert!(out.starts_with("a_rea"));
        assert!(out.ends_with(".gz"));
        assert!(out.width() <= 14);
    }

    #[test]
    fn test_truncate_middle_wide_chars() {
        let out = truncate_middle("가나다라마바사아자차카타파하", 12);
        assert!(out.width() <= 12);
    }

    #[test]
    fn test_fit_path_keeps_tail() {
        let out = fit_path("/srv/data/projects/boksl/shell/src", 20);
        assert!(out.starts_with(".../"));
        assert!(out.ends_with("/src"));
        assert!(out.width() <= 20);
    }

    #[test]
    fn test_fit_path_short_unchanged() {
        assert_eq!(fit_path("/tmp", 10), "/tmp");
    }
}
