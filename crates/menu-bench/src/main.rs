use std::io;
use std::time::{Duration, Instant};

use aria_menu::ui::UiFrame;
use aria_menu::view::MenuView;
use aria_menu::{Document, MenuConfig, MenuId, MenuSystem, NodeId};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

#[derive(Parser, Debug)]
#[command(
    name = "menu-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Build a synthetic menubar and time construction and scripted sessions"
)]
struct BenchCli {
    /// Top-level menus in the menubar.
    #[arg(short = 'm', long = "menus", default_value_t = 8)]
    menus: usize,

    /// Items per list.
    #[arg(short = 'i', long = "items", default_value_t = 12)]
    items: usize,

    /// Submenu nesting depth below each top-level menu.
    #[arg(short = 'd', long = "depth", default_value_t = 2)]
    depth: usize,

    /// How many times the scripted session runs over the whole menubar.
    #[arg(short = 'r', long = "rounds", default_value_t = 20)]
    rounds: usize,

    /// Lay out and draw every step into an offscreen buffer.
    #[arg(long)]
    render: bool,
}

struct BenchConfig {
    menus: usize,
    items: usize,
    depth: usize,
    rounds: usize,
    render: bool,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(1..=256).contains(&cli.menus) {
            return Err("menus must be between 1 and 256".to_string());
        }
        if !(1..=512).contains(&cli.items) {
            return Err("items must be between 1 and 512".to_string());
        }
        if cli.depth > 16 {
            return Err("depth must be at most 16".to_string());
        }
        if cli.rounds == 0 {
            return Err("rounds must be at least 1".to_string());
        }
        Ok(Self {
            menus: cli.menus,
            items: cli.items,
            depth: cli.depth,
            rounds: cli.rounds,
            render: cli.render,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let markup = menubar_markup(&config);
    let started = Instant::now();
    let document = Document::parse(&markup).map_err(io::Error::other)?;
    let parsed = started.elapsed();

    let menu_config = MenuConfig {
        delay: 50,
        ..MenuConfig::default()
    };
    let mut system = MenuSystem::with_config(document, menu_config).map_err(io::Error::other)?;
    let started = Instant::now();
    let top_level = system.discover();
    let constructed = started.elapsed();

    let mut stats = SessionStats::new(&config);
    let started = Instant::now();
    for _ in 0..config.rounds {
        for &menu in &top_level {
            run_session(&mut system, menu, &mut stats);
        }
    }
    stats.elapsed = started.elapsed();

    println!(
        "{}",
        stats.final_report(&config, system.registry().len(), parsed, constructed)
    );
    Ok(())
}

fn menubar_markup(config: &BenchConfig) -> String {
    let mut out = String::from("<nav>");
    for menu in 0..config.menus {
        out.push_str(&format!(
            "<div data-menu data-menu-name=\"bar\"><button data-menu-trigger>Menu {menu}</button>"
        ));
        list_markup(&mut out, config.items, config.depth, &menu.to_string());
        out.push_str("</div>");
    }
    out.push_str("</nav>");
    out
}

/// The first item of every list opens the next nesting level.
fn list_markup(out: &mut String, items: usize, depth: usize, path: &str) {
    out.push_str("<ul data-menu-list>");
    for index in 0..items {
        let label = format!("{path}.{index}");
        if index == 0 && depth > 0 {
            out.push_str(&format!("<li role=\"none\"><span role=\"menuitem\">{label}</span>"));
            list_markup(out, items, depth - 1, &label);
            out.push_str("</li>");
        } else {
            out.push_str(&format!("<li role=\"menuitem\">Item {label}</li>"));
        }
    }
    out.push_str("</ul>");
}

struct SessionStats {
    keys: u64,
    hovers: u64,
    events: u64,
    frames: u64,
    render_time: Duration,
    elapsed: Duration,
    view: Option<(MenuView, Buffer)>,
}

impl SessionStats {
    fn new(config: &BenchConfig) -> Self {
        let view = config
            .render
            .then(|| (MenuView::new(), Buffer::empty(Rect::new(0, 0, 160, 48))));
        Self {
            keys: 0,
            hovers: 0,
            events: 0,
            frames: 0,
            render_time: Duration::ZERO,
            elapsed: Duration::ZERO,
            view,
        }
    }

    fn draw(&mut self, system: &mut MenuSystem) {
        let Some((view, buffer)) = self.view.as_mut() else {
            return;
        };
        let started = Instant::now();
        let area = buffer.area;
        buffer.reset();
        view.layout(system, area);
        let mut frame = UiFrame::from_parts(area, buffer);
        view.render(system, &mut frame);
        self.render_time += started.elapsed();
        self.frames += 1;
    }

    fn final_report(
        &self,
        config: &BenchConfig,
        instances: usize,
        parsed: Duration,
        constructed: Duration,
    ) -> String {
        let secs = self.elapsed.as_secs_f64();
        let per_key = if self.keys > 0 {
            secs * 1_000_000.0 / self.keys as f64
        } else {
            0.0
        };
        let per_frame = if self.frames > 0 {
            self.render_time.as_secs_f64() * 1000.0 / self.frames as f64
        } else {
            0.0
        };
        indoc::formatdoc!(
            r#"
            Menu bench: {menus} menus x {items} items, depth {depth}, {rounds} rounds.
            Instances: {instances} | Parse: {parse:.2} ms | Construct: {construct:.2} ms
            Session: {elapsed:.2} ms | Keys: {keys} (~{per_key:.1} us/key) | Hovers: {hovers}
            Menu events: {events}
            Frames drawn: {frames} (avg {per_frame:.3} ms)
            "#,
            menus = config.menus,
            items = config.items,
            depth = config.depth,
            rounds = config.rounds,
            instances = instances,
            parse = parsed.as_secs_f64() * 1000.0,
            construct = constructed.as_secs_f64() * 1000.0,
            elapsed = secs * 1000.0,
            keys = self.keys,
            per_key = per_key,
            hovers = self.hovers,
            events = self.events,
            frames = self.frames,
            per_frame = per_frame,
        )
    }
}

fn press(system: &mut MenuSystem, stats: &mut SessionStats, code: KeyCode) {
    let doc = system.document();
    let target = doc.focused().unwrap_or(doc.root());
    system.key_down(target, KeyEvent::new(code, KeyModifiers::NONE));
    stats.keys += 1;
    stats.draw(system);
}

fn settle(system: &mut MenuSystem, stats: &mut SessionStats) {
    let frame = Duration::from_millis(16);
    let mut guard = 0;
    while system.has_pending_work() && guard < 256 {
        system.advance(frame);
        guard += 1;
    }
    stats.draw(system);
}

/// Open the menu from its trigger, walk every item, dive into and back out
/// of the first submenu, hover it open, then dismiss.
fn run_session(system: &mut MenuSystem, menu: MenuId, stats: &mut SessionStats) {
    let Some((trigger, items, first)) = system.menu(menu).map(|m| {
        (
            m.trigger(),
            m.items().len(),
            m.items().first().copied(),
        )
    }) else {
        return;
    };
    let Some(trigger) = trigger else {
        return;
    };
    system.focus(trigger);
    press(system, stats, KeyCode::Down);
    for _ in 0..items {
        press(system, stats, KeyCode::Down);
    }
    press(system, stats, KeyCode::Home);
    press(system, stats, KeyCode::Right);
    press(system, stats, KeyCode::Left);

    if let Some(item) = first {
        hover(system, stats, item);
    }
    press(system, stats, KeyCode::Esc);
    press(system, stats, KeyCode::Esc);
    settle(system, stats);
    stats.events += system.take_events().len() as u64;
}

fn hover(system: &mut MenuSystem, stats: &mut SessionStats, item: NodeId) {
    system.pointer_over(item);
    stats.hovers += 1;
    settle(system, stats);
    system.pointer_out(item, None);
}
