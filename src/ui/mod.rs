use std::{
    io,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode,
        KeyEventKind, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tracing::info;

use crate::{
    clock::Clock,
    config::WorldParams,
    core::World,
    render::{FrameBuffer, Viewport},
    types::{Rgb, Vec2, WorldStats},
};

type Backend = CrosstermBackend<io::Stdout>;

/// Runs the interactive front-end until the user quits.
pub fn run(params: WorldParams) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, params);
    shutdown_terminal(&mut terminal)?;
    result
}

fn event_loop(terminal: &mut Terminal<Backend>, params: WorldParams) -> Result<()> {
    let fps = params.fps;
    let mut ui_state = UiState::new(terminal.size()?);
    let mut world = World::new(params, ui_state.viewport().world_bounds())?;
    world.init_first_elements();
    info!(
        cols = ui_state.framebuf.width(),
        rows = ui_state.framebuf.height(),
        "terminal front-end started"
    );

    let mut clock = Clock::new();
    loop {
        clock.start();
        if !ui_state.paused {
            world.update();
        }

        ui_state.framebuf.clear();
        world.draw(&mut ui_state.framebuf);
        let stats = world.stats();
        terminal.draw(|frame| ui_state.render(frame, &stats))?;

        // Wait out the rest of the tick, handling input as it arrives.
        let deadline = Instant::now() + clock.remaining(fps);
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if !event::poll(deadline - now)? {
                break;
            }
            match ui_state.handle(event::read()?) {
                Action::Quit => {
                    info!(tick = world.tick(), "terminal front-end stopped");
                    return Ok(());
                }
                Action::Spawn(pos) => world.spawn_at(pos),
                Action::Resize => world.resize(ui_state.viewport().world_bounds()),
                Action::None => {}
            }
        }
    }
}

fn shutdown_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Action {
    None,
    Quit,
    Spawn(Vec2),
    Resize,
}

/// Header, world pane and footer for a terminal of `size`.
fn panes(size: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(size);
    (chunks[0], chunks[1], chunks[2])
}

fn pane_block(title: &str) -> Block<'_> {
    Block::default().borders(Borders::ALL).title(title)
}

/// Cells inside the world pane's border.
fn world_area(size: Rect) -> Rect {
    let (_, world, _) = panes(size);
    pane_block("").inner(world)
}

struct UiState {
    area: Rect,
    framebuf: FrameBuffer,
    paused: bool,
}

impl UiState {
    fn new(size: Rect) -> Self {
        let area = world_area(size);
        Self {
            area,
            framebuf: FrameBuffer::new(area.width, area.height),
            paused: false,
        }
    }

    fn viewport(&self) -> Viewport {
        self.framebuf.viewport()
    }

    fn handle(&mut self, event: CrosstermEvent) -> Action {
        match event {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                KeyCode::Char(' ') => {
                    self.paused = !self.paused;
                    Action::None
                }
                _ => Action::None,
            },
            CrosstermEvent::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                self.world_position(mouse.column, mouse.row)
                    .map_or(Action::None, Action::Spawn)
            }
            CrosstermEvent::Resize(width, height) => {
                self.area = world_area(Rect::new(0, 0, width, height));
                self.framebuf.resize(self.area.width, self.area.height);
                Action::Resize
            }
            _ => Action::None,
        }
    }

    /// World position under a terminal cell, if the cell is in the world pane.
    fn world_position(&self, column: u16, row: u16) -> Option<Vec2> {
        let area = self.area;
        if column < area.x || row < area.y {
            return None;
        }
        let (col, row) = (column - area.x, row - area.y);
        if col >= area.width || row >= area.height {
            return None;
        }
        Some(self.viewport().cell_center(col, row))
    }

    fn render(&self, frame: &mut ratatui::Frame<'_>, stats: &WorldStats) {
        let (header, world, footer) = panes(frame.size());

        let status = if self.paused { " | paused" } else { "" };
        let header_text = Paragraph::new(format!(
            "tick: {} | bodies: {} | explosions: {} | capacity: {} | mass: {:.0}{}",
            stats.tick, stats.bodies, stats.explosions, stats.capacity, stats.total_mass, status
        ))
        .block(pane_block("planetarium"));
        frame.render_widget(header_text, header);

        let framebuf = &self.framebuf;
        let lines: Vec<Line> = (0..framebuf.height())
            .map(|y| {
                let spans: Vec<Span> = (0..framebuf.width())
                    .map(|x| {
                        let cell = framebuf.get(x, y);
                        Span::styled(cell.ch.to_string(), Style::default().fg(color_for(cell.color)))
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(pane_block("Space")), world);

        let controls = Paragraph::new("click: spawn body | space: pause | q: quit")
            .block(pane_block("Controls"));
        frame.render_widget(controls, footer);
    }
}

fn color_for(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}
