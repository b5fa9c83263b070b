use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tracing::Level;

use aria_menu::drivers::OutputDriver;
use aria_menu::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use aria_menu::event_loop::{ControlFlow, EventLoop, LoopEvent};
use aria_menu::view::MenuView;
use aria_menu::{Document, KeyBindings, MenuConfig, MenuEvent, MenuSystem, NodeId, tracing_sub};

const DEMO_PAGE: &str = include_str!("../assets/demo.html");

#[derive(Parser, Debug)]
#[command(
    name = "aria-menu",
    version = env!("CARGO_PKG_VERSION"),
    about = "Drive accessible menus from the keyboard and mouse in a terminal"
)]
struct Cli {
    /// Page markup to load instead of the built-in demo.
    #[arg(long, value_name = "FILE")]
    markup: Option<PathBuf>,

    /// TOML menu configuration.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip open/close fades.
    #[arg(long)]
    reduced_motion: bool,

    /// Write debug logs here. Logging is discarded otherwise.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Event poll interval; also the animation frame length.
    #[arg(long, value_name = "MS", default_value_t = 16)]
    tick_ms: u64,

    /// Print the menu key bindings and exit.
    #[arg(long)]
    keys: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    if cli.keys {
        for (action, combos) in KeyBindings::default().help_entries() {
            println!("{action:?}: {}", combos.join(", "));
        }
        return Ok(());
    }
    tracing_sub::init(cli.log_file.as_deref(), Level::DEBUG)?;

    let markup = match &cli.markup {
        Some(path) => fs::read_to_string(path)?,
        None => DEMO_PAGE.to_string(),
    };
    let document = Document::parse(&markup).map_err(io::Error::other)?;
    let config = match &cli.config {
        Some(path) => MenuConfig::load(path).map_err(io::Error::other)?,
        None => MenuConfig::default(),
    };
    let mut system = MenuSystem::with_config(document, config).map_err(io::Error::other)?;
    system.set_reduced_motion(cli.reduced_motion);
    let menus = system.discover();
    tracing::info!(menus = menus.len(), "page loaded");

    let mut app = App::new(system);
    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut event_loop = EventLoop::new(
        ConsoleInputDriver::new(),
        Duration::from_millis(cli.tick_ms.max(1)),
    );
    let result = event_loop.run(|_, event| app.handle(event, &mut output));
    output.exit()?;
    result
}

struct App {
    system: MenuSystem,
    view: MenuView,
    hovered: Option<NodeId>,
}

impl App {
    fn new(system: MenuSystem) -> Self {
        let mut view = MenuView::new();
        view.set_status("Tab to a menu, arrows to move, Enter to open, Ctrl+Q to quit");
        Self {
            system,
            view,
            hovered: None,
        }
    }

    fn handle<O: OutputDriver>(
        &mut self,
        event: LoopEvent,
        output: &mut O,
    ) -> io::Result<ControlFlow> {
        match event {
            LoopEvent::Tick(dt) => self.system.advance(dt),
            LoopEvent::Input(Event::Key(key)) => {
                if is_quit(&key) {
                    return Ok(ControlFlow::Quit);
                }
                self.key(key);
            }
            LoopEvent::Input(Event::Mouse(mouse)) => self.mouse(mouse),
            LoopEvent::Input(_) => {}
        }
        self.report_events();

        let Self { system, view, .. } = self;
        output.draw(|mut frame| {
            view.layout(system, frame.area());
            view.render(system, &mut frame);
        })?;
        Ok(ControlFlow::Continue)
    }

    fn key(&mut self, key: KeyEvent) {
        let doc = self.system.document();
        let target = doc.focused().unwrap_or(doc.root());
        if self.system.key_down(target, key) {
            return;
        }
        match key.code {
            KeyCode::Tab => self.cycle_focus(true),
            KeyCode::BackTab => self.cycle_focus(false),
            _ => {}
        }
    }

    /// Sequential focus navigation the way a browser does it for keys the
    /// menus left alone.
    fn cycle_focus(&mut self, forward: bool) {
        let doc = self.system.document();
        let order = doc.sequential_focus_order();
        if order.is_empty() {
            return;
        }
        let len = order.len();
        let current = doc
            .focused()
            .and_then(|focused| order.iter().position(|&n| n == focused));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        self.system.focus(order[next]);
    }

    fn mouse(&mut self, mouse: MouseEvent) {
        let target = self.view.hit_test(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if target == self.hovered {
                    return;
                }
                if let Some(previous) = self.hovered {
                    self.system.pointer_out(previous, target);
                }
                if let Some(next) = target {
                    self.system.pointer_over(next);
                }
                self.hovered = target;
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let doc = self.system.document();
                let node = target.unwrap_or(doc.root());
                self.system.pointer_down(node);
                match target {
                    Some(node) if is_focusable(self.system.document(), node) => {
                        self.system.focus(node);
                    }
                    _ => self.system.blur(),
                }
                if let Some(node) = target {
                    self.system.click(node);
                }
            }
            _ => {}
        }
    }

    fn report_events(&mut self) {
        for event in self.system.take_events() {
            let doc = self.system.document();
            let label = |node: NodeId| doc.text_content(node).trim().to_string();
            let status = match event {
                MenuEvent::Opened(menu) => format!("{menu} opened"),
                MenuEvent::Closed(menu) => format!("{menu} closed"),
                MenuEvent::Activated { item, .. } => format!("activated \"{}\"", label(item)),
                MenuEvent::CheckedChanged { item, checked, .. } => {
                    let state = if checked { "on" } else { "off" };
                    format!("\"{}\" {state}", label(item))
                }
            };
            tracing::debug!(?event, "menu event");
            self.view.set_status(status);
        }
    }
}

fn is_focusable(doc: &Document, node: NodeId) -> bool {
    !doc.is_disabled(node) && (doc.tab_index(node).is_some() || doc.tag_name(node) == Some("button"))
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL)
}
