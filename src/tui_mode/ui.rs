use super::app::{App, Screen, SettingsField};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::time::Duration;
use super::helpers::{highlight_functions, wrap_text};
use calcvault::display::{format_result, format_with_spaces};
use crate::render_help::render_help;

const MIN_TERMINAL_WIDTH: u16 = 40;
const MIN_TERMINAL_HEIGHT: u16 = 12;

pub fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| match app.screen {
            Screen::Help => render_help(f, app),
            Screen::Calculator => ui(f, app),
            Screen::Unlocked => render_unlocked(f),
            Screen::Settings => render_settings(f, app),
        })?;

        if app.should_quit {
            break;
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            match crossterm::event::read()? {
                Event::Key(KeyEvent { code, modifiers, kind, .. }) if kind == KeyEventKind::Press => {
                    handle_key_event(app, code, modifiers);
                }
                Event::Mouse(event) => {
                    handle_mouse_event(app, event);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if modifiers.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c') | KeyCode::Char('q')) {
        app.should_quit = true;
        return;
    }

    match app.screen {
        Screen::Help => match code {
            KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
            KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
            KeyCode::PageDown => app.help_scroll = app.help_scroll.saturating_add(10),
            KeyCode::PageUp => app.help_scroll = app.help_scroll.saturating_sub(10),
            KeyCode::Esc | KeyCode::F(1) => {
                app.screen = Screen::Calculator;
                app.help_scroll = 0;
            }
            _ => {}
        },
        Screen::Unlocked => {
            if code == KeyCode::Esc {
                app.lock();
            }
        }
        Screen::Settings => match code {
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                app.settings_form.focused_mut().push(c);
            }
            KeyCode::Backspace => {
                app.settings_form.focused_mut().pop();
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => app.settings_form.switch_focus(),
            KeyCode::Enter => app.submit_settings(),
            KeyCode::Esc => app.screen = Screen::Calculator,
            _ => {}
        },
        Screen::Calculator => match code {
            KeyCode::Char('u') | KeyCode::Char('U') if modifiers.contains(KeyModifiers::CONTROL) => {
                app.clear_input();
            }
            KeyCode::Char('l') | KeyCode::Char('L') if modifiers.contains(KeyModifiers::CONTROL) => {
                app.session.clear_history();
                app.history_scroll = 0;
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => app.press_char(c),
            KeyCode::Tab => app.paren(),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Delete => app.clear_input(),
            KeyCode::Enter => app.submit(),
            KeyCode::PageUp | KeyCode::Up => app.scroll_history(-1),
            KeyCode::PageDown | KeyCode::Down => app.scroll_history(1),
            KeyCode::F(1) => {
                app.screen = Screen::Help;
                app.help_scroll = 0;
            }
            KeyCode::F(2) => app.session.toggle_angle_mode(),
            KeyCode::F(3) => app.session.detailed_mode = !app.session.detailed_mode,
            _ => {}
        },
    }
}

fn handle_mouse_event(app: &mut App, event: crossterm::event::MouseEvent) {
    match (app.screen, event.kind) {
        (Screen::Help, MouseEventKind::ScrollDown) => app.help_scroll = app.help_scroll.saturating_add(3),
        (Screen::Help, MouseEventKind::ScrollUp) => app.help_scroll = app.help_scroll.saturating_sub(3),
        (Screen::Calculator, MouseEventKind::ScrollDown) => app.scroll_history(1),
        (Screen::Calculator, MouseEventKind::ScrollUp) => app.scroll_history(-1),
        _ => {}
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let terminal_size = frame.size();

    app.terminal_too_small = terminal_size.width < MIN_TERMINAL_WIDTH ||
                             terminal_size.height < MIN_TERMINAL_HEIGHT;

    if app.terminal_too_small {
        render_resize_message(frame, terminal_size);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(terminal_size);

    render_display(frame, app, layout[0]);
    render_status(frame, app, layout[1]);
    render_history(frame, app, layout[2]);
    app.list_height = layout[2].height as usize;
}

fn render_resize_message(frame: &mut Frame, area: Rect) {
    let message = format!(
        "Terminal too small! Min size: {}x{}. Current: {}x{}",
        MIN_TERMINAL_WIDTH,
        MIN_TERMINAL_HEIGHT,
        area.width,
        area.height
    );

    let text = vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please resize your terminal window",
            Style::default().fg(Color::Yellow)
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Resize Required ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_display(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", app.session.angle_mode()))
        .title_alignment(Alignment::Left);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let text = app.display_text();
    let style = if app.last_error.is_some() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    // keep the tail of long input visible, like a calculator display
    let visible_width = inner_area.width.saturating_sub(1) as usize;
    let chars: Vec<char> = text.chars().collect();
    let visible: String = chars[chars.len().saturating_sub(visible_width)..].iter().collect();

    let mut lines = vec![Line::from(Span::styled(visible, style))];
    if let Some(e) = &app.last_error {
        lines.push(Line::from(Span::styled(
            e.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Right);
    frame.render_widget(paragraph, inner_area);
}

fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" History ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let history = app.session.history();
    let steps = &app.session.last_steps;

    if history.is_empty() && steps.is_empty() {
        let empty_msg = Paragraph::new("No History")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty_msg, inner_area);
        return;
    }

    let mut items = Vec::new();
    let wrap_width = inner_area.width.saturating_sub(4) as usize;

    if app.session.detailed_mode && !steps.is_empty() {
        for (j, step) in steps.iter().enumerate() {
            let step_text = format!("Step {}: {} = {}", j + 1, step.operation, format_result(step.result));
            for (step_idx, line) in wrap_text(&step_text, wrap_width).into_iter().enumerate() {
                let prefix = if step_idx == 0 { "  - " } else { "    " };
                let span = Span::styled(
                    format!("{}{}", prefix, line),
                    Style::default().fg(Color::DarkGray)
                );
                items.push(ListItem::new(Line::from(span)));
            }
        }
        items.push(ListItem::new(Line::from(Span::styled(
            "-".repeat(inner_area.width as usize),
            Style::default().fg(Color::DarkGray),
        ))));
    }

    for (i, entry) in history.iter().enumerate() {
        let base_style = Style::default()
            .fg(if i == 0 { Color::Yellow } else { Color::Cyan });

        let (expr, result) = entry.rsplit_once(" = ").unwrap_or((entry, ""));
        let input = format_with_spaces(expr);
        let input_lines = wrap_text(&input, wrap_width);
        let last = input_lines.len().saturating_sub(1);

        for (line_idx, line) in input_lines.into_iter().enumerate() {
            let mut spans = vec![];

            if line_idx == 0 {
                spans.push(Span::styled("> ", Style::default().fg(Color::Green)));
            } else {
                spans.push(Span::styled("  ", Style::default()));
            }

            spans.extend(highlight_functions(&line, base_style));

            if line_idx == last {
                spans.push(Span::styled(" = ", Style::default().fg(Color::Gray)));
                spans.push(Span::styled(
                    result.to_string(),
                    Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD)
                ));
            }

            items.push(ListItem::new(Line::from(spans)));
        }
    }

    let list = List::new(items).block(Block::default());
    let mut state = ListState::default().with_offset(app.history_scroll);

    frame.render_stateful_widget(list, inner_area, &mut state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let details = if app.session.detailed_mode { "Details on" } else { "Details off" };
    let keys = [
        ("Enter/=", "Calculate"),
        ("Tab", "( )"),
        ("F1", "Help"),
        ("F2", "Deg/Rad"),
        ("F3", details),
        ("Ctrl+U", "Clear"),
    ];

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(
                    *key,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {} ", desc),
                    Style::default().fg(Color::DarkGray),
                ),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_unlocked(frame: &mut Frame) {
    let area = frame.size();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Vault ")
        .title_alignment(Alignment::Center);

    let text = vec![
        Line::from(Span::styled(
            "Unlocked",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Esc locks and returns to the calculator", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, centered_rect(50, 7, area));
}

fn render_settings(frame: &mut Frame, app: &App) {
    let area = frame.size();
    let form = &app.settings_form;

    let field = |label: &str, value: &str, focused: bool| {
        let marker = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Line::from(vec![
            Span::styled(format!("{}{:<12}", marker, label), style),
            Span::raw("*".repeat(value.chars().count())),
        ])
    };

    let mut text = vec![
        field("Old secret", &form.old_secret, form.focus == SettingsField::OldSecret),
        field("New secret", &form.new_secret, form.focus == SettingsField::NewSecret),
        Line::from(""),
    ];
    if let Some(message) = &form.message {
        text.push(Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red))));
    }
    text.push(Line::from(Span::styled(
        "Tab switch field  Enter confirm  Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Settings ")
        .title_alignment(Alignment::Center);

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(text).block(block), centered_rect(50, 8, area));
}
