use ratatui::{prelude::*, widgets::*};
use zombie_world_core::{
    Position,
    entity::{self, Pickup},
    game::{Game, GameStatus},
    inventory::Inventory,
};

use crate::{
    app::{App, Overlay},
    scores::{ScoreEntry, format_seconds},
};

const HELP: &str =
    "wasd: move  arrows: fire  1-9: use item  r: restart  h: scores  F2/F3: save/load  q: quit";

/// Renders the user interface.
pub fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Area for the map
            Constraint::Length(6), // Area for inventory
            Constraint::Length(4), // Area for status/help
        ])
        .split(frame.area());

    render_map(frame, main_layout[0], &app.game);
    render_inventory(frame, main_layout[1], app.game.inventory());
    render_status(frame, main_layout[2], app);

    match &app.overlay {
        Overlay::None => {}
        Overlay::NameEntry { name } => render_name_entry(frame, &app.game, name),
        Overlay::HighScores(entries) => {
            render_high_scores(frame, entries, app.config().max_high_scores)
        }
    }
}

fn symbol_style(symbol: char) -> Style {
    match symbol {
        entity::PLAYER => Style::default().fg(Color::Red).bold(),
        entity::HOSPITAL => Style::default().fg(Color::Green).bold(),
        entity::ZOMBIE => Style::default().fg(Color::Magenta),
        entity::TRACKING_ZOMBIE => Style::default().fg(Color::LightMagenta).bold(),
        entity::CROSSBOW => Style::default().fg(Color::Yellow),
        entity::GARLIC => Style::default().fg(Color::White),
        entity::TIME_MACHINE => Style::default().fg(Color::Cyan),
        _ => Style::default().fg(Color::DarkGray),
    }
}

/// Renders the grid onto the frame.
fn render_map(frame: &mut Frame, area: Rect, game: &Game) {
    let symbols = game.grid().serialize();
    let size = game.grid().size() as i32;

    let lines: Vec<Line> = (0..size)
        .map(|y| {
            let spans: Vec<Span> = (0..size)
                .map(|x| {
                    let symbol = symbols.get(&Position::new(x, y)).copied().unwrap_or('.');
                    Span::styled(format!("{symbol} "), symbol_style(symbol))
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let title = match game.status() {
        GameStatus::InProgress => " Zombie World ".to_string(),
        GameStatus::Won => " Zombie World - You win! ".to_string(),
        GameStatus::Lost => " Zombie World - You lose! ".to_string(),
    };
    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}

fn inventory_line(index: usize, item: &Pickup) -> ListItem<'static> {
    let text = format!(
        "{}. {} ({} left)",
        index + 1,
        item.kind().name(),
        item.lifetime()
    );
    let style = if item.is_active() {
        Style::default()
            .fg(Color::Black)
            .bg(symbol_style(item.display()).fg.unwrap_or(Color::White))
    } else {
        symbol_style(item.display())
    };
    let mut spans = vec![Span::styled(text, style)];
    if item.is_active() {
        spans.push(Span::raw("  active"));
    }
    ListItem::from(Line::from(spans))
}

/// Renders the player's inventory onto the frame.
fn render_inventory(frame: &mut Frame, area: Rect, inventory: Option<&Inventory>) {
    let items: Vec<ListItem> = match inventory {
        Some(inventory) if !inventory.is_empty() => inventory
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| inventory_line(index, item))
            .collect(),
        Some(_) => vec![ListItem::new("Empty")],
        None => Vec::new(),
    };

    let inventory_widget =
        List::new(items).block(Block::default().borders(Borders::ALL).title("Inventory"));
    frame.render_widget(inventory_widget, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let counters = format!(
        "Moves: {}  Time: {}",
        app.game.moves(),
        format_seconds(app.game.steps())
    );
    let lines = vec![
        Line::from(vec![
            Span::styled(counters, Style::default().bold()),
            Span::raw("  "),
            Span::raw(app.message.as_str()),
        ]),
        Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
    ];
    let status = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, area);
}

fn render_name_entry(frame: &mut Frame, game: &Game, name: &str) {
    let area = centered_rect(50, 30, frame.area());
    let lines = vec![
        Line::from(format!(
            "You won in {} ({} moves)",
            format_seconds(game.steps()),
            game.moves()
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Name: "),
            Span::styled(format!("{name}_"), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: save  Tab: save and play again  Esc: skip",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let popup = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().title(" High score ").borders(Borders::ALL));
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn render_high_scores(frame: &mut Frame, entries: &[ScoreEntry], max_entries: usize) {
    let area = centered_rect(40, 40, frame.area());
    let mut items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            ListItem::new(format!(
                "{}. {}  {}",
                rank + 1,
                entry.name,
                format_seconds(entry.seconds)
            ))
        })
        .collect();
    if items.is_empty() {
        items.push(ListItem::new("No high scores yet"));
    }

    let list = List::new(items).block(
        Block::default()
            .title(format!(" Top {max_entries} "))
            .borders(Borders::ALL),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(list, area);
}

/// A rectangle of the given percentages, centered in `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
