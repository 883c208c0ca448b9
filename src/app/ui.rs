use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tile_grid::core::{Coord, viewport_centered};

use crate::app::state::{AppMode, AppState};
use crate::luminosity::TileVisual;
use crate::policy::TileKind;
use crate::scene::Scene;

const BG: Color = Color::Rgb(16, 18, 24);
const FG: Color = Color::Rgb(230, 228, 218);
const MUTED: Color = Color::Rgb(146, 148, 154);
const ACCENT: Color = Color::Rgb(233, 199, 104);
const PAUSED: Color = Color::Rgb(222, 158, 78);
const PLAYER: Color = Color::Rgb(255, 252, 244);
const LAMP: Color = Color::Rgb(255, 214, 120);
const CRATE: Color = Color::Rgb(150, 112, 78);

// Each map tile is drawn as CELL_COLS x 1 terminal cells to offset the
// terminal's tall character aspect.
const CELL_COLS: u16 = 2;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(4)])
        .split(area);

    let title = if state.name.is_empty() {
        "tilelight".to_string()
    } else {
        format!("tilelight  {}", state.name)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().bg(BG).fg(FG));
    let map_inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);
    if let Some(scene) = state.scene.as_ref() {
        render_map(frame.buffer_mut(), map_inner, scene, state);
    }

    frame.render_widget(footer(state), chunks[1]);
}

fn footer(state: &AppState) -> Paragraph<'static> {
    let (lights, pending, running) = state.scene.as_ref().map_or((0, 0, true), |scene| {
        (
            scene.controller().len(),
            scene.controller().pending_len(),
            scene.is_running(),
        )
    });
    let gate = if running {
        Span::styled("Lighting ON  ", Style::default().fg(ACCENT))
    } else {
        Span::styled(
            "Lighting PAUSED  ",
            Style::default().fg(PAUSED).add_modifier(Modifier::BOLD),
        )
    };
    let pos = state
        .player_pos()
        .map_or_else(|| "-".to_string(), |coord| coord.to_string());
    let tick = &state.last_tick;

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("Lantern {:.0}  ", state.lantern),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            gate,
            Span::styled(
                format!(
                    "Lights {lights}  Pending {pending}  Last tick: {} rebuilt, {} removed, {} redrawn  ",
                    tick.rebuilt, tick.removed, tick.redrawn
                ),
                Style::default().fg(MUTED),
            ),
            Span::styled(format!("Pos {pos}"), Style::default().fg(MUTED)),
        ]),
        Line::from(Span::styled(
            state.last_status.clone().unwrap_or_default(),
            Style::default().fg(FG),
        )),
        Line::from(Span::styled(
            controls_line(state.mode),
            Style::default().fg(MUTED),
        )),
    ];
    Paragraph::new(lines).alignment(Alignment::Left)
}

fn controls_line(mode: AppMode) -> &'static str {
    match mode {
        AppMode::Exploring => {
            "Move: WASD/arrows  Wall: E  Lamp: F  Lantern: +/-  Cave-in: C  Lighting: P  Quit: Q"
        }
        AppMode::Loading => "Loading scene...",
        AppMode::Failed => "Scene failed to load  Quit: Q",
    }
}

fn render_map(buf: &mut Buffer, area: Rect, scene: &Scene, state: &AppState) {
    let view_cols = area.width / CELL_COLS;
    let view_rows = area.height;
    if view_cols == 0 || view_rows == 0 {
        return;
    }
    let focus = state.player_pos().unwrap_or_default();
    let (start_x, start_y) = viewport_centered(focus.x, focus.y, scene.size(), view_cols, view_rows);

    for row in 0..view_rows {
        for col in 0..view_cols {
            let coord = Coord::new(start_x + col, start_y + row);
            let Some(kind) = scene.tile_kind(coord) else {
                continue;
            };
            let (glyph, fg, bg) = marker(scene, state, coord).unwrap_or_else(|| tile_style(kind));
            let visual = scene
                .visual(coord)
                .unwrap_or(TileVisual::dark(scene.config().overlay_color));

            for dx in 0..CELL_COLS {
                let px = area.x + col * CELL_COLS + dx;
                let py = area.y + row;
                if let Some(cell) = buf.cell_mut((px, py)) {
                    let ch = if dx == 0 { glyph } else { ' ' };
                    cell.set_char(ch).set_fg(fg).set_bg(bg);
                    shade_cell(cell, visual);
                }
            }
        }
    }
}

/// Darken a cell by the tile's overlay alpha. Too-dark tiles go blank.
fn shade_cell(cell: &mut ratatui::buffer::Cell, visual: TileVisual) {
    if visual.too_dark {
        let [r, g, b] = visual.color;
        let black = Color::Rgb(r, g, b);
        cell.set_char(' ').set_fg(black).set_bg(black);
        return;
    }
    let scale = 1.0 - visual.alpha as f32 / 255.0;
    cell.set_fg(scale_and_floor_color(cell.fg, scale, visual.color));
    cell.set_bg(scale_and_floor_color(cell.bg, scale, visual.color));
}

fn marker(scene: &Scene, state: &AppState, coord: Coord) -> Option<(char, Color, Color)> {
    let base_bg = tile_style(scene.tile_kind(coord)?).2;
    let occupants = scene.world().occupants(coord);
    if state.player.is_some_and(|id| occupants.contains(&id)) {
        return Some(('@', PLAYER, base_bg));
    }
    let entity = occupants.iter().find_map(|id| scene.entity(*id))?;
    if entity.opaque {
        Some(('B', CRATE, base_bg))
    } else if entity.luminosity > 0.0 {
        Some(('*', LAMP, base_bg))
    } else {
        None
    }
}

fn tile_style(kind: TileKind) -> (char, Color, Color) {
    match kind {
        TileKind::Floor => ('.', Color::Rgb(138, 144, 164), Color::Rgb(62, 66, 80)),
        TileKind::Wall => ('#', Color::Rgb(148, 150, 156), Color::Rgb(34, 36, 42)),
        TileKind::Window => ('+', Color::Rgb(160, 208, 232), Color::Rgb(52, 70, 92)),
        TileKind::Space => (' ', Color::Rgb(12, 12, 28), Color::Rgb(4, 4, 16)),
        TileKind::Lava => ('~', Color::Rgb(255, 168, 64), Color::Rgb(150, 42, 18)),
    }
}

fn scale_and_floor_color(color: Color, scale: f32, floor: [u8; 3]) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let s = scale.clamp(0.0, 1.0);
            let mix = |channel: u8, floor: u8| {
                (floor as f32 + (channel as f32 - floor as f32) * s).round() as u8
            };
            Color::Rgb(mix(r, floor[0]), mix(g, floor[1]), mix(b, floor[2]))
        }
        other => other,
    }
}
