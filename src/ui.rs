use std::time::Instant;

use crate::app::{App, Screen};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use tui_geoquiz::braille::BrailleCanvas;
use tui_geoquiz::map::MapLayers;
use tui_geoquiz::quiz::{Phase, QuestionKind};

/// Rows taken by the question / menu / results panel, borders included
const PANEL_HEIGHT: u16 = 8;

/// Map block, panel, status bar
fn layout(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),               // Map
            Constraint::Length(PANEL_HEIGHT), // Panel
            Constraint::Length(1),            // Status bar
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Inner map area for a terminal of this size
pub fn map_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(layout(area)[0])
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let [map, panel, status] = layout(frame.area());

    render_map(frame, app, map);
    match app.screen {
        Screen::Home => render_home(frame, app, panel),
        Screen::Game => render_question(frame, app, panel),
        Screen::Results => render_results(frame, app, panel),
    }
    render_status_bar(frame, app, status);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " World Map ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(buffer) = app.buffer.as_ref() else {
        return;
    };

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;
    let layers = app.map_renderer.render(buffer, &app.layers, &viewport);

    let cursor_pos = app.mouse_pos.filter(|&(col, row)| {
        col >= inner.x && row >= inner.y && col < inner.x + inner.width && row < inner.y + inner.height
    });

    frame.render_widget(MapWidget { layers, cursor_pos }, inner);
}

/// Braille map layers composited bottom to top
struct MapWidget {
    layers: MapLayers,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate().take(area.height as usize) {
            let y = area.y + row_idx as u16;
            for (col_idx, ch) in row_str.chars().enumerate().take(area.width as usize) {
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_layer(&self.layers.borders, Color::Cyan, area, buf);
        Self::render_layer(&self.layers.hover, Color::Yellow, area, buf);
        Self::render_layer(&self.layers.correct, Color::Green, area, buf);
        Self::render_layer(&self.layers.incorrect, Color::Red, area, buf);

        if let Some((x, y)) = self.cursor_pos {
            buf[(x, y)].set_char('╋').set_fg(Color::Magenta);
        }
    }
}

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let mut lines = vec![Line::from(vec![
        Span::styled("[l]", key),
        Span::raw(" Location  "),
        Span::styled("[c]", key),
        Span::raw(" Capitals  "),
        Span::styled("[f]", key),
        Span::raw(" Flags  "),
        Span::styled("[p]", key),
        Span::raw(" Population"),
    ])];
    lines.push(Line::from(Span::styled(
        format!("{} questions per game", app.config.question_count()),
        dim,
    )));

    let stats = &app.stored_stats;
    if stats.total_games > 0 {
        lines.push(Line::from(Span::styled(
            format!(
                "Games: {}  Best: {}  Average: {}  Best streak: {}",
                stats.total_games,
                stats.best_score,
                stats.average_score(),
                stats.best_streak
            ),
            Style::default().fg(Color::White),
        )));
    }
    if let Some(message) = &app.message {
        lines.push(Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red))));
    }

    let paragraph = Paragraph::new(lines)
        .block(panel_block("Geography Quiz"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_question(frame: &mut Frame, app: &App, area: Rect) {
    let session = app.engine.session();
    let Some(question) = session.current_question() else {
        frame.render_widget(panel_block("Quiz"), area);
        return;
    };
    let (position, total) = session.position();
    let title = format!("{} {}/{}", question.kind, position, total);

    let timer_color = if session.time_left() <= 3 { Color::Red } else { Color::Yellow };
    let mut lines = vec![
        Line::from(vec![
            Span::styled(question.prompt.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(format!("⏱ {}", session.time_left()), Style::default().fg(timer_color)),
        ]),
    ];
    if question.kind == QuestionKind::Flag {
        lines.push(Line::from(Span::raw(question.country.flag.clone())));
    }

    if let Some(feedback) = session.feedback() {
        let line = if feedback.is_correct {
            Span::styled("Correct!", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            let answer = match question.kind {
                QuestionKind::Location => question.country.name.clone(),
                _ => feedback.correct_answer.clone(),
            };
            Span::styled(
                format!("Wrong. The answer was {answer}"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        };
        lines.push(Line::from(line));
    } else if question.options.is_empty() {
        lines.push(Line::from(Span::styled(
            question.kind.instructions(),
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        // Options in two columns
        let half = question.options.len().div_ceil(2);
        for row in 0..half {
            let mut spans = Vec::new();
            for i in [row, row + half] {
                if let Some(option) = question.options.get(i) {
                    spans.push(Span::styled(
                        format!("[{}] ", i + 1),
                        Style::default().fg(Color::Yellow),
                    ));
                    spans.push(Span::raw(format!("{option:<28}")));
                }
            }
            lines.push(Line::from(spans));
        }
    }

    frame.render_widget(Paragraph::new(lines).block(panel_block(&title)), area);
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let session = app.engine.session();
    let Some(summary) = session.summary(Instant::now()) else {
        frame.render_widget(panel_block("Results"), area);
        return;
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("Score {}", summary.score),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "   {}/{} correct ({:.0}%)   best streak {}   {:.1}s per question",
            summary.correct,
            summary.total,
            summary.accuracy,
            summary.best_streak,
            summary.average_time.as_secs_f64()
        )),
    ])];

    let mut answers = Vec::new();
    for q in session.questions() {
        let (mark, color) = if q.correct { ("✓", Color::Green) } else { ("✗", Color::Red) };
        answers.push(Span::styled(format!("{mark} "), Style::default().fg(color)));
        answers.push(Span::raw(format!("{} ({})  ", q.country.name, q.score_earned)));
    }
    lines.push(Line::from(answers));
    lines.push(Line::from(Span::styled(
        format!(
            "Best ever: {}   r: play again   Esc: menu   q: quit",
            app.stored_stats.best_score
        ),
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(panel_block("Results"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let session = app.engine.session();
    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
    ];
    if session.phase().in_progress() {
        spans.push(Span::styled(" | Score: ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(session.score().to_string(), Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(" Streak: ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(session.streak().to_string(), Style::default().fg(Color::Green)));
        spans.push(Span::styled(
            format!(" {:.0}%", session.progress()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(hovered) = app.layers.hovered().filter(|_| session.phase() != Phase::FeedbackPending) {
        let name = app
            .dataset()
            .and_then(|d| d.country_by_id(hovered))
            .map(|c| c.name.as_str())
            .unwrap_or(hovered);
        // Hidden while a location question is up
        if session.kind() != Some(QuestionKind::Location) || !session.phase().in_progress() {
            spans.push(Span::styled(format!(" | {name}"), Style::default().fg(Color::White)));
        }
    }
    spans.push(Span::styled(
        " | hjkl:pan +/-:zoom 1-8:answer Esc:menu q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
