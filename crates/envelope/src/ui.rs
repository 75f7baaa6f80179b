//! UI rendering

use envelope_core::format;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Loading, Screen};
use crate::input::TextInput;

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_title(f, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled(" Envelope ", Style::default().fg(Color::Magenta).bold()),
        Span::raw(" - "),
        Span::styled("1Password to .env", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );

    f.render_widget(title, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = selection_header(app);
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }

    match app.screen {
        Screen::VaultInput => {
            lines.push(question("Which 1Password vault should I search?"));
            lines.push(Line::from(""));
            lines.push(input_line(&app.vault_input));
        }
        Screen::Loading(step) => {
            let frame = SPINNER[app.spinner_frame % SPINNER.len()];
            let text = match step {
                Loading::Items | Loading::Detail => "Fetching from 1Password...",
                Loading::Write => "Writing file...",
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{frame} "), Style::default().fg(Color::Magenta)),
                Span::styled(text, Style::default().fg(Color::Gray)),
            ]));
        }
        Screen::ItemList => {
            lines.push(question("Select an item from the vault:"));
            lines.push(Line::from(""));
            lines.extend(item_lines(app, area));
        }
        Screen::FileInput => {
            lines.push(question(
                "Enter a filename for the .env file (default: .env):",
            ));
            lines.push(Line::from(""));
            lines.push(input_line(&app.file_input));
        }
        Screen::Finished | Screen::Failed => {}
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn selection_header(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(vault) = &app.selected_vault {
        lines.push(info_line("Vault: ", vault));
    }
    if let Some(item) = &app.selected_item {
        lines.push(info_line("Item: ", &item.title));
    }
    lines
}

fn info_line(title: &'static str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(title, Style::default().fg(Color::Gray)),
        Span::styled(value.to_string(), Style::default().fg(Color::Cyan).bold()),
    ])
}

fn question(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(Color::White).bold()))
}

fn input_line(input: &TextInput) -> Line<'_> {
    let prompt = Span::styled("❯ ", Style::default().fg(Color::Magenta));
    if input.value().is_empty() {
        Line::from(vec![
            prompt,
            Span::styled(input.placeholder(), Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(vec![
            prompt,
            Span::raw(input.value()),
            Span::styled("█", Style::default().fg(Color::Magenta)),
        ])
    }
}

/// Visible slice of the item list, keeping the cursor on screen
fn item_lines<'a>(app: &'a App, area: Rect) -> Vec<Line<'a>> {
    // borders, header, question and spacing
    let visible = area.height.saturating_sub(8).max(1) as usize;
    let start = app.cursor.saturating_sub(visible - 1);
    let width = area.width.saturating_sub(4) as usize;

    app.items
        .iter()
        .enumerate()
        .skip(start)
        .take(visible)
        .map(|(i, item)| {
            let row = format::truncate(&format::numbered(i, &item.title), width);
            if i == app.cursor {
                Line::from(Span::styled(
                    format!("▸ {row}"),
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::raw(format!("  {row}")))
            }
        })
        .collect()
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let keys: &[(&str, &str)] = match app.screen {
        Screen::ItemList => &[("↑/↓", " navigate  "), ("enter", " select  "), ("ctrl+c", " quit")],
        Screen::VaultInput | Screen::FileInput => &[("enter", " submit  "), ("ctrl+c", " quit")],
        _ => &[("ctrl+c", " quit")],
    };

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(format!(" {key}"), Style::default().fg(Color::Cyan).bold()),
                Span::raw(*action),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}
