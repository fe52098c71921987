use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use log::info;
use maze_chase::collision::tile_coordinates;
use maze_chase::level::{ColorClass, TileCoord};
use maze_chase::{Direction, Game, GameMode, GameOptions, GameState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_RENDER_FPS: u64 = 120;
const INPUT_HOLD_MS: u64 = 160;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Ghost,
    Wall,
    Boundary,
    Walkable,
    Walked,
    GhostStart,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![
                Cell {
                    glyph: Glyph::Walked,
                    color: Color::Reset,
                };
                width * height
            ],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

struct Settings {
    tick_ms: u64,
    render_fps: u64,
    seed: Option<u64>,
    config: Option<PathBuf>,
    static_layout: bool,
}

impl Settings {
    fn from_env() -> Self {
        let tick_ms = std::env::var("MAZE_TICK_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_TICK_MS);
        let render_fps = std::env::var("MAZE_FPS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_RENDER_FPS);
        let seed = std::env::var("MAZE_SEED")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());
        let config = std::env::var_os("MAZE_CONFIG").map(PathBuf::from);
        let static_layout = std::env::var("MAZE_LAYOUT").is_ok_and(|v| v == "static");
        Self {
            tick_ms,
            render_fps,
            seed,
            config,
            static_layout,
        }
    }
}

fn main() -> io::Result<()> {
    env_logger::init();
    let settings = Settings::from_env();
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let game = new_game(&settings, &mut rng)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, game, &mut rng, &settings);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn new_game(settings: &Settings, rng: &mut StdRng) -> io::Result<Game> {
    let invalid = |err| io::Error::new(io::ErrorKind::InvalidInput, err);
    let mut options = match &settings.config {
        Some(path) => GameOptions::load(path).map_err(invalid)?,
        None => GameOptions::default(),
    };
    if settings.static_layout {
        options.use_builtin_layout().map_err(invalid)?;
    }
    info!("[Maze] starting with {:?} seed", settings.seed);
    Game::new(options, GameMode::Single, rng).map_err(invalid)
}

fn run(stdout: &mut Stdout, mut game: Game, rng: &mut StdRng, settings: &Settings) -> io::Result<()> {
    let inbox = game.inbox();
    let mut last_tick = Instant::now();
    let mut last_seen: [Option<Instant>; 4] = [None, None, None, None];
    let mut last_pressed: Option<Direction> = None;
    let mut renderer = Renderer::new(game.grid().width(), game.grid().height());
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    continue;
                }
                let dir = match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('k') | KeyCode::Up => Direction::Up,
                    KeyCode::Char('j') | KeyCode::Down => Direction::Down,
                    KeyCode::Char('h') | KeyCode::Left => Direction::Left,
                    KeyCode::Char('l') | KeyCode::Right => Direction::Right,
                    _ => continue,
                };
                last_seen[dir.index()] = Some(Instant::now());
                last_pressed = Some(dir);
            }
        }

        if last_tick.elapsed() >= Duration::from_millis(settings.tick_ms) {
            last_tick = Instant::now();
            let desired_dir = active_dir_recent(&last_seen, last_pressed);
            let report = game
                .tick(desired_dir, &inbox, rng)
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            render(stdout, &game, &mut renderer)?;
            if report.state != GameState::Playing {
                render_game_over(stdout, &game)?;
                return Ok(());
            }
        } else {
            render(stdout, &game, &mut renderer)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn render(stdout: &mut Stdout, game: &Game, renderer: &mut Renderer) -> io::Result<()> {
    let (width, height) = (game.grid().width(), game.grid().height());
    let needed_h = (height + 2) as u16;
    let needed_w = (width * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let hud = format!(
        "Tiles left: {}  Ghosts: {}  (q to quit)",
        game.grid().walkable_remaining(),
        game.ghosts().len()
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    let player = tile_coordinates(game.grid(), game.player().actor.body.corner());
    let ghosts: Vec<(Option<TileCoord>, &str)> = game
        .ghosts()
        .iter()
        .map(|g| {
            (
                tile_coordinates(game.grid(), g.actor.body.corner()),
                g.actor.color.as_str(),
            )
        })
        .collect();

    for row in 0..height {
        for col in 0..width {
            let at = TileCoord::new(col, row);
            let cell = cell_for(game, at, player, &ghosts);
            let idx = row * width + col;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, col, row, cell)?;
            }
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn cell_for(
    game: &Game,
    at: TileCoord,
    player: Option<TileCoord>,
    ghosts: &[(Option<TileCoord>, &str)],
) -> Cell {
    if player == Some(at) {
        return Cell {
            glyph: Glyph::Player,
            color: terminal_color(&game.player().actor.color),
        };
    }
    if let Some((_, color)) = ghosts.iter().find(|(tile, _)| *tile == Some(at)) {
        return Cell {
            glyph: Glyph::Ghost,
            color: terminal_color(color),
        };
    }
    let palette = &game.options().board.colors;
    let Some(class) = game.grid().color_at(at) else {
        return Cell {
            glyph: Glyph::Walked,
            color: Color::Reset,
        };
    };
    let glyph = match class {
        ColorClass::Wall(_) => Glyph::Wall,
        ColorClass::Boundary => Glyph::Boundary,
        ColorClass::Walkable => Glyph::Walkable,
        ColorClass::Walked => Glyph::Walked,
        ColorClass::GhostStart => Glyph::GhostStart,
    };
    Cell {
        glyph,
        color: terminal_color(class.color_name(palette)),
    }
}

/// Maps configured color names onto the terminal palette. `#rrggbb` values
/// are passed through as true color.
fn terminal_color(name: &str) -> Color {
    if let Some(hex) = name.strip_prefix('#') {
        let channel = |i: usize| hex.get(i..i + 2).and_then(|c| u8::from_str_radix(c, 16).ok());
        if let (Some(r), Some(g), Some(b)) = (channel(0), channel(2), channel(4)) {
            return Color::Rgb { r, g, b };
        }
    }
    match name.to_ascii_lowercase().as_str() {
        "black" => Color::Reset,
        "white" => Color::White,
        "red" => Color::Red,
        "darksalmon" => Color::DarkRed,
        "yellow" => Color::Yellow,
        "orange" => Color::DarkYellow,
        "blue" => Color::Blue,
        "cyan" => Color::Cyan,
        "pink" => Color::Magenta,
        "green" => Color::DarkGreen,
        "lawngreen" => Color::Green,
        "slategray" | "gray" | "grey" => Color::DarkGrey,
        _ => Color::Grey,
    }
}

fn draw_cell(stdout: &mut Stdout, renderer: &Renderer, x: usize, y: usize, cell: Cell) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Player => "😃",
        Glyph::Ghost => "👻",
        Glyph::Wall => "██",
        Glyph::Boundary => "▓▓",
        Glyph::Walkable => "· ",
        Glyph::Walked => "  ",
        Glyph::GhostStart => "░░",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

fn render_game_over(stdout: &mut Stdout, game: &Game) -> io::Result<()> {
    let (width, height) = (game.grid().width(), game.grid().height());
    let (term_w, term_h) = terminal::size()?;
    let needed_h = (height + 2) as u16;
    let needed_w = (width * CELL_W) as u16;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(MoveTo(0, needed_h))?;
    } else {
        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        stdout.queue(MoveTo(origin_x, origin_y + height as u16))?;
    }
    let banner = match game.state() {
        GameState::Win => "YOU WIN - every tile walked (press q to quit)".to_string(),
        _ => format!(
            "CAUGHT - {} tiles left (press q to quit)",
            game.grid().walkable_remaining()
        ),
    };
    stdout.queue(Print(banner))?;
    stdout.flush()?;
    loop {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q') {
                    return Ok(());
                }
            }
        }
    }
}

/// The most recently pressed direction that is still held. The last key
/// pressed wins while it is fresh.
fn active_dir_recent(last_seen: &[Option<Instant>; 4], last_pressed: Option<Direction>) -> Option<Direction> {
    let hold = Duration::from_millis(INPUT_HOLD_MS);
    let fresh = |dir: Direction| last_seen[dir.index()].filter(|t| t.elapsed() <= hold);
    if let Some(dir) = last_pressed.filter(|dir| fresh(*dir).is_some()) {
        return Some(dir);
    }
    Direction::ALL
        .iter()
        .filter_map(|dir| fresh(*dir).map(|t| (*dir, t)))
        .max_by_key(|(_, t)| *t)
        .map(|(dir, _)| dir)
}
