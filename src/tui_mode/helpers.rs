use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec!["".to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if word_width > width {
            let mut remaining = word;
            while !remaining.is_empty() {
                let mut chunk = String::new();
                let mut chunk_width = 0;
                let mut chunk_byte_len = 0;

                for c in remaining.chars() {
                    let char_width = UnicodeWidthChar::width(c).unwrap_or(1);
                    if chunk_width + char_width > width {
                        break;
                    }
                    chunk.push(c);
                    chunk_width += char_width;
                    chunk_byte_len += c.len_utf8();
                }

                if !current_line.is_empty() {
                    lines.push(current_line.trim().to_string());
                    current_line.clear();
                    current_width = 0;
                }

                lines.push(chunk);
                remaining = &remaining[chunk_byte_len..];
            }
            continue;
        }

        if current_width + word_width + 1 > width && !current_line.is_empty() {
            lines.push(current_line.trim().to_string());
            current_line.clear();
            current_width = 0;
        }

        if !current_line.is_empty() {
            current_line.push(' ');
            current_width += 1;
        }

        current_line.push_str(word);
        current_width += word_width;
    }

    if !current_line.is_empty() {
        lines.push(current_line.trim().to_string());
    }

    lines
}

pub fn is_math_function(word: &str) -> bool {
    matches!(
        word,
        "sin" | "cos" | "tan" | "asin" | "acos" | "atan" | "ln" | "log" | "√" | "π" | "e"
    )
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c == '√' || c == 'π'
}

/// Colours names, numbers and operators of a history line.
pub fn highlight_functions(expr: &str, base_style: Style) -> Vec<Span<'static>> {
    let function_style = Style::default()
        .fg(Color::LightBlue)
        .add_modifier(Modifier::BOLD);

    let operator_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let number_style = Style::default()
        .fg(Color::LightGreen);

    let name_style = |name: &str| {
        if is_math_function(name) {
            function_style
        } else {
            base_style
        }
    };

    let mut spans = Vec::new();
    let mut current = String::new();
    let mut in_name = false;
    let mut in_number = false;

    for c in expr.chars() {
        if is_name_char(c) {
            if in_number {
                spans.push(Span::styled(current.clone(), number_style));
                current.clear();
                in_number = false;
            }
            current.push(c);
            in_name = true;
        } else if c.is_ascii_digit() || c == '.' || (in_number && c == ',') {
            if in_name {
                spans.push(Span::styled(current.clone(), name_style(&current)));
                current.clear();
                in_name = false;
            }
            current.push(c);
            in_number = true;
        } else {
            if in_name {
                spans.push(Span::styled(current.clone(), name_style(&current)));
                current.clear();
                in_name = false;
            } else if in_number {
                spans.push(Span::styled(current.clone(), number_style));
                current.clear();
                in_number = false;
            }

            match c {
                '+' | '-' | '*' | '/' | '^' | '%' | '!' => {
                    spans.push(Span::styled(c.to_string(), operator_style));
                }
                ' ' => spans.push(Span::raw(" ")),
                _ => spans.push(Span::styled(c.to_string(), base_style)),
            }
        }
    }

    if in_name {
        let style = name_style(&current);
        spans.push(Span::styled(current, style));
    } else if in_number {
        spans.push(Span::styled(current, number_style));
    }

    spans
}
