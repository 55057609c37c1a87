use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui_mode::app::App;

pub fn render_help(frame: &mut Frame, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Calculator Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));

    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);

    let help_text = vec![
        Line::from(Span::styled("Scientific Calculator", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Basic Operations:", heading)),
        Line::from("  + : Addition        (e.g., 5+3 = 8)"),
        Line::from("  - : Subtraction     (e.g., 10-4 = 6)"),
        Line::from("  * : Multiplication  (e.g., 6*7 = 42)"),
        Line::from("  / : Division        (e.g., 15/3 = 5)"),
        Line::from("  ^ : Power           (e.g., 2^3 = 8)"),
        Line::from("  ! : Factorial       (e.g., 5! = 120)"),
        Line::from("  % : Percent         (e.g., 50% = 0.5)"),
        Line::from("  %% : Modulo after a factor (e.g., 10%%3 = 0.1)"),
        Line::from(""),
        Line::from(Span::styled("Functions:", heading)),
        Line::from("  sin cos tan    : argument in the current angle mode"),
        Line::from("  asin acos atan : result in the current angle mode"),
        Line::from("  log            : Base-10 logarithm"),
        Line::from("  ln             : Natural logarithm"),
        Line::from("  √ (key r)      : Square root"),
        Line::from(""),
        Line::from(Span::styled("Constants:", heading)),
        Line::from("  π (key p) : 3.14159..."),
        Line::from("  e         : Euler's number (2.71828...)"),
        Line::from(""),
        Line::from(Span::styled("Keys:", heading)),
        Line::from("  Enter or = : Calculate"),
        Line::from("  Tab        : Open or close a parenthesis"),
        Line::from("  Backspace  : Delete last symbol"),
        Line::from("  Ctrl+U     : Clear input"),
        Line::from("  Ctrl+L     : Clear history"),
        Line::from("  F2         : Switch degrees/radians"),
        Line::from("  F3         : Show evaluation steps"),
        Line::from("  PgUp/PgDn  : Scroll history"),
        Line::from("  Ctrl+C     : Quit"),
        Line::from(""),
        Line::from(Span::styled("Examples:", heading)),
        Line::from("  sin(30)+cos(60)"),
        Line::from("  √(2)^2"),
        Line::from("  (1+2)*3!"),
        Line::from("  log(1000)-ln(e)"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll as u16, 0));

    frame.render_widget(Clear, frame.size());
    frame.render_widget(paragraph, frame.size());
}
