pub mod screen;

use neon_click::arena::Position;
use neon_click::celebration::Celebration;
use neon_click::{DifficultyLevel, Phase};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::App;

/// Arena pixels covered by one terminal column
pub const CELL_WIDTH_PX: u32 = 10;
/// Arena pixels covered by one terminal row
pub const CELL_HEIGHT_PX: u32 = 20;

const HORIZONTAL_MARGIN: u16 = 2;
const GRID_SPACING_COLS: u16 = 5;
const GRID_SPACING_ROWS: u16 = 2;

const NEON_CYAN: Color = Color::Rgb(0, 255, 255);
const NEON_PINK: Color = Color::Rgb(255, 0, 170);
const NEON_PURPLE: Color = Color::Rgb(170, 85, 255);
const NEON_YELLOW: Color = Color::Rgb(255, 230, 0);

/// Screen regions, recomputed from the frame area on every draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub title: Rect,
    pub hud: Rect,
    pub arena: Rect,
    /// Play surface inside the arena border
    pub arena_inner: Rect,
    pub footer: Rect,
}

pub fn regions(area: Rect) -> Regions {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(3), // score / time / best
            Constraint::Min(4),    // arena
            Constraint::Length(2), // instructions
        ])
        .split(area);

    let arena_inner = arena_block(Phase::Idle).inner(chunks[2]);
    Regions {
        title: chunks[0],
        hud: chunks[1],
        arena: chunks[2],
        arena_inner,
        footer: chunks[3],
    }
}

/// Play-surface size in arena pixels
pub fn arena_px(inner: Rect) -> (u32, u32) {
    (
        inner.width as u32 * CELL_WIDTH_PX,
        inner.height as u32 * CELL_HEIGHT_PX,
    )
}

/// Terminal cells covered by a target at `position`, clipped to the play surface
pub fn target_cells(inner: Rect, position: Position, size_px: u32) -> Rect {
    let col = (position.x / CELL_WIDTH_PX as f64).floor() as u16;
    let row = (position.y / CELL_HEIGHT_PX as f64).floor() as u16;
    let width = size_px.div_ceil(CELL_WIDTH_PX) as u16;
    let height = size_px.div_ceil(CELL_HEIGHT_PX) as u16;

    Rect::new(inner.x + col, inner.y + row, width, height).intersection(inner)
}

/// Whether the terminal cell at (`column`, `row`) lies on `target`
pub fn hit_test(target: Rect, column: u16, row: u16) -> bool {
    column >= target.x
        && column < target.x.saturating_add(target.width)
        && row >= target.y
        && row < target.y.saturating_add(target.height)
}

fn arena_block(phase: Phase) -> Block<'static> {
    let border = if phase == Phase::Playing {
        NEON_CYAN
    } else {
        Color::DarkGray
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.controller.state();
        let regions = regions(area);

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        Paragraph::new(Span::styled(
            "N E O N   C L I C K",
            Style::default().patch(bold_style).fg(NEON_CYAN),
        ))
        .alignment(Alignment::Center)
        .render(regions.title, buf);

        let hud = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(regions.hud);

        let cards = [
            ("SCORE", state.score, NEON_CYAN),
            ("TIME", state.time_left_secs, NEON_PURPLE),
            ("BEST", self.controller.best_score(), NEON_PINK),
        ];
        for ((label, value, color), rect) in cards.into_iter().zip(hud.iter()) {
            Paragraph::new(Span::styled(
                value.to_string(),
                Style::default().patch(bold_style).fg(color),
            ))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color).add_modifier(Modifier::DIM))
                    .title(Line::from(label).centered()),
            )
            .render(*rect, buf);
        }

        arena_block(state.phase).render(regions.arena, buf);
        render_grid(regions.arena_inner, buf);

        let target = self.controller.target();
        if state.phase == Phase::Playing && target.visible {
            let cells = target_cells(
                regions.arena_inner,
                target.position,
                self.controller.profile().target_size_px,
            );
            render_target(cells, buf);
        }

        Paragraph::new(vec![
            Line::from(Span::styled(
                "Click the glowing targets before they move • faster clicks, higher score",
                dim_style,
            )),
            Line::from(Span::styled(
                "Easy: 45s, large targets • Medium: 30s, medium targets • Hard: 20s, small targets • (esc) quit",
                dim_style,
            )),
        ])
        .alignment(Alignment::Center)
        .render(regions.footer, buf);
    }
}

fn render_grid(inner: Rect, buf: &mut Buffer) {
    let style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM);
    for y in (inner.top()..inner.bottom()).step_by(GRID_SPACING_ROWS as usize) {
        for x in (inner.left()..inner.right()).step_by(GRID_SPACING_COLS as usize) {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_symbol("·");
                cell.set_style(style);
            }
        }
    }
}

fn render_target(cells: Rect, buf: &mut Buffer) {
    if cells.is_empty() {
        return;
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(NEON_PINK).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Rgb(70, 0, 50)));
    let inner = block.inner(cells);
    block.render(cells, buf);

    if !inner.is_empty() {
        Paragraph::new(Span::styled(
            "◉",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(
            Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1),
            buf,
        );
    }
}

/// Centered box just big enough for `lines`, clamped to `area`
fn overlay_rect(area: Rect, lines: &[Line]) -> Rect {
    let content_width = lines
        .iter()
        .map(|l| l.spans.iter().map(|s| s.content.width()).sum::<usize>())
        .max()
        .unwrap_or(0) as u16;
    let width = (content_width + 6).min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_overlay(area: Rect, lines: Vec<Line>, accent: Color, buf: &mut Buffer) {
    let rect = overlay_rect(area, &lines);
    Clear.render(rect, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(accent)),
        )
        .render(rect, buf);
}

fn difficulty_label(level: DifficultyLevel) -> String {
    let profile = level.profile();
    let size = match level {
        DifficultyLevel::Easy => "large",
        DifficultyLevel::Medium => "medium",
        DifficultyLevel::Hard => "small",
    };
    format!(
        "{}s, {} targets, moves every {:.1}s",
        profile.session_duration_secs,
        size,
        profile.relocation_interval_ms as f64 / 1000.0
    )
}

/// "READY" panel with the difficulty selector; only drawn while Idle
pub fn render_menu_overlay(app: &App, area: Rect, buf: &mut Buffer) {
    let selected = app.controller.state().difficulty;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut selector = Vec::new();
    for (i, level) in DifficultyLevel::ALL.iter().enumerate() {
        let text = format!(" ({}) {} ", i + 1, level.to_string().to_uppercase());
        let style = if *level == selected {
            Style::default().patch(bold).fg(Color::Black).bg(NEON_CYAN)
        } else {
            Style::default().fg(NEON_CYAN)
        };
        if i > 0 {
            selector.push(Span::raw("  "));
        }
        selector.push(Span::styled(text, style));
    }

    let lines = vec![
        Line::from(Span::styled(
            "READY TO JACK IN?",
            Style::default().patch(bold).fg(NEON_CYAN),
        )),
        Line::from(Span::styled(
            "Click the glowing targets as fast as you can!",
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(""),
        Line::from(selector),
        Line::from(Span::styled(
            difficulty_label(selected),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "(enter) start game",
            Style::default().patch(bold).fg(NEON_PINK),
        )),
    ];

    render_overlay(area, lines, NEON_CYAN, buf);
}

/// "GAME OVER" panel with the final score
pub fn render_game_over_overlay(app: &App, area: Rect, buf: &mut Buffer) {
    let state = app.controller.state();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(Span::styled(
            "GAME OVER",
            Style::default().patch(bold).fg(NEON_PINK),
        )),
        Line::from(Span::styled(
            format!("Final Score: {}", state.score),
            Style::default().fg(NEON_CYAN),
        )),
    ];
    if state.new_best {
        lines.push(Line::from(Span::styled(
            "★ NEW HIGH SCORE! ★",
            Style::default().patch(bold).fg(NEON_YELLOW),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "(enter) play again / (m)enu / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    )));

    render_overlay(area, lines, NEON_PINK, buf);
}

/// Draw the new-best burst on top of the play surface
pub fn render_celebration(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let colors = [
        NEON_YELLOW,
        NEON_PINK,
        NEON_CYAN,
        NEON_PURPLE,
        Color::Green,
        Color::LightYellow,
    ];

    for spark in &celebration.sparks {
        if spark.x < 0.0 || spark.y < 0.0 {
            continue;
        }
        let (x, y) = (spark.x as u16, spark.y as u16);
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = colors[spark.color_index % colors.len()];
        let life = 1.0 - spark.age / spark.max_age;
        let style = if spark.is_letter() || life > 0.7 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if life > 0.3 {
            Style::default().fg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            let mut symbol = [0u8; 4];
            cell.set_symbol(spark.symbol.encode_utf8(&mut symbol));
            cell.set_style(style);
        }
    }
}
