use ratatui::style::Color;

/// 색상 정의
///
/// Hex 문자열("#1e1e1e") 또는 색상 이름("Red")
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorDef {
    Hex(String),
    Named(String),
}

impl ColorDef {
    pub fn to_color(&self) -> Color {
        match self {
            ColorDef::Hex(hex) => parse_hex_color(hex),
            ColorDef::Named(name) => parse_named_color(name),
        }
    }
}

impl From<&str> for ColorDef {
    fn from(s: &str) -> Self {
        if s.starts_with('#') {
            ColorDef::Hex(s.to_string())
        } else {
            ColorDef::Named(s.to_string())
        }
    }
}

fn parse_hex_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Color::Reset;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
    Color::Rgb(channel(0..2), channel(2..4), channel(4..6))
}

fn parse_named_color(name: &str) -> Color {
    match name.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "white" => Color::White,
        _ => Color::Reset,
    }
}

/// 화면 색상표
#[derive(Debug, Clone)]
pub struct Theme {
    pub fg_primary: ColorDef,
    pub muted: ColorDef,

    // 목록
    pub panel_border: ColorDef,
    pub panel_bg: ColorDef,
    pub file_normal: ColorDef,
    pub file_selected: ColorDef,
    pub file_selected_bg: ColorDef,
    pub directory: ColorDef,
    /// 아카이브/패키지 파일
    pub archive: ColorDef,
    /// 선택 표시
    pub file_marked: ColorDef,
    /// 붙여넣기 대기 표시
    pub file_pending: ColorDef,

    // 상태바/커맨드바
    pub status_bar_bg: ColorDef,
    pub status_bar_fg: ColorDef,
    pub command_bar_bg: ColorDef,
    pub command_bar_fg: ColorDef,

    // 대화상자
    pub dialog_bg: ColorDef,
    pub button_bg: ColorDef,
    pub accent: ColorDef,
    pub warning: ColorDef,
    pub error: ColorDef,
    pub success: ColorDef,
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            fg_primary: "#d4d4d4".into(),
            muted: "#808080".into(),

            panel_border: "#0078d4".into(),
            panel_bg: "#1e1e1e".into(),
            file_normal: "#d4d4d4".into(),
            file_selected: "#ffffff".into(),
            file_selected_bg: "#0078d4".into(),
            directory: "#569cd6".into(),
            archive: "#ce9178".into(),
            file_marked: "#ffd700".into(),
            file_pending: "#4ec9b0".into(),

            status_bar_bg: "#007acc".into(),
            status_bar_fg: "#ffffff".into(),
            command_bar_bg: "#2d2d30".into(),
            command_bar_fg: "#cccccc".into(),

            dialog_bg: "#2d2d30".into(),
            button_bg: "#3c3c3c".into(),
            accent: "#0078d4".into(),
            warning: "#ffa500".into(),
            error: "#f44747".into(),
            success: "#64b464".into(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        assert_eq!(ColorDef::from("#ff8000").to_color(), Color::Rgb(255, 128, 0));
        assert_eq!(ColorDef::from("#fff").to_color(), Color::Reset);
        assert_eq!(ColorDef::from("Yellow").to_color(), Color::Yellow);
        assert_eq!(ColorDef::from("nonsense").to_color(), Color::Reset);
    }
}
