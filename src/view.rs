//! Terminal view of a menu page: one terminal cell is one CSS pixel.
//!
//! `layout` writes cell bounds back into the document (triggers along a
//! menubar row, always-visible lists stacked below it, list sizes from their
//! labels) and lets the menu system re-position open lists. `render` paints
//! the result and records hit regions so mouse events can be mapped back to
//! the element under the pointer.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear};

use crate::dom::{Bounds, Document, NodeId};
use crate::menu::{MenuInstance, MenuSystem};
use crate::theme;
use crate::ui::UiFrame;

const MARKER_WIDTH: usize = 4;
const ARROW: &str = " ›";

#[derive(Debug, Default)]
pub struct MenuView {
    hits: Vec<(Rect, NodeId)>,
    status: String,
}

impl MenuView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn layout(&mut self, system: &mut MenuSystem, area: Rect) {
        let page_height = area.height.saturating_sub(1);
        system.document_mut().set_viewport(Bounds::new(
            0.0,
            0.0,
            f32::from(area.width),
            f32::from(page_height),
        ));

        let mut bar_x = 0.0;
        let mut block_y = 2.0;
        for id in system.top_level() {
            let Some(menu) = system.menu(id) else {
                continue;
            };
            if menu.is_inert() {
                continue;
            }
            let (trigger, list) = (menu.trigger(), menu.list());
            let (width, height) = list_size(system.document(), menu);
            let doc = system.document_mut();
            match (trigger, list) {
                (Some(trigger), _) => {
                    let label_width = label(doc, trigger).chars().count() as f32 + 2.0;
                    doc.set_bounds(trigger, Bounds::new(bar_x, 0.0, label_width, 1.0));
                    bar_x += label_width + 1.0;
                }
                (None, Some(list)) => {
                    doc.set_bounds(list, Bounds::new(1.0, block_y, width, height));
                    block_y += height + 1.0;
                }
                (None, None) => {}
            }
        }

        let sized: Vec<(NodeId, f32, f32)> = system
            .registry()
            .iter()
            .filter(|(_, m)| !m.is_inert())
            .filter_map(|(_, m)| {
                let (w, h) = list_size(system.document(), m);
                m.list().map(|list| (list, w, h))
            })
            .collect();
        for (list, width, height) in sized {
            let doc = system.document_mut();
            let current = doc.bounds(list).unwrap_or_default();
            doc.set_bounds(list, Bounds::new(current.x, current.y, width, height));
        }

        // Submenus anchor on items of lists that may just have moved.
        for _ in 0..2 {
            place_items(system);
            system.relayout();
        }
        place_items(system);
    }

    pub fn render(&mut self, system: &MenuSystem, frame: &mut UiFrame<'_>) {
        self.hits.clear();
        let area = frame.area();
        let doc = system.document();
        let focused = doc.focused();

        let bar = Style::default().bg(theme::menubar_bg()).fg(theme::menubar_fg());
        frame.render_widget(Block::default().style(bar), Rect::new(area.x, area.y, area.width, 1));
        for id in system.top_level() {
            let Some(menu) = system.menu(id) else {
                continue;
            };
            let Some(trigger) = menu.trigger() else {
                continue;
            };
            let Some(rect) = doc.bounds(trigger).map(to_rect) else {
                continue;
            };
            let style = if system.is_open(id) || focused == Some(trigger) {
                Style::default()
                    .bg(theme::trigger_open_bg())
                    .fg(theme::trigger_open_fg())
            } else if doc.is_disabled(trigger) {
                bar.fg(theme::menu_disabled_fg())
            } else {
                bar
            };
            frame.set_string(rect.x, rect.y, &format!(" {} ", label(doc, trigger)), style);
            self.hits.push((rect, trigger));
        }

        for (_, menu) in system.registry().iter() {
            let Some(list) = menu.list() else {
                continue;
            };
            if menu.is_inert() || doc.is_hidden(list) {
                continue;
            }
            let Some(rect) = doc.bounds(list).map(to_rect) else {
                continue;
            };
            let mut base = Style::default().bg(theme::menu_bg()).fg(theme::menu_fg());
            if doc.style_number(list, "opacity").unwrap_or(1.0) < 0.5 {
                base = theme::fading(base);
            }
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(base.fg(theme::menu_border()))
                    .style(base),
                rect,
            );
            self.hits.push((rect, list));

            let inner_width = rect.width.saturating_sub(2) as usize;
            for &item in menu.items() {
                let Some(item_rect) = doc.bounds(item).map(to_rect) else {
                    continue;
                };
                if doc.is_hidden(item) {
                    continue;
                }
                let arrow = if opens_submenu(system, menu, item) { ARROW } else { "" };
                let text = format!("{}{}", marker(doc, menu, item), label(doc, item));
                let pad = inner_width.saturating_sub(text.chars().count() + arrow.chars().count());
                let line = format!("{text}{}{arrow}", " ".repeat(pad));

                let style = if focused == Some(item) {
                    Style::default()
                        .bg(theme::menu_selected_bg())
                        .fg(theme::menu_selected_fg())
                } else if doc.is_disabled(item) {
                    base.fg(theme::menu_disabled_fg())
                } else {
                    base
                };
                frame.set_string(item_rect.x, item_rect.y, &line, style);
                if doc.attr_is(item, "aria-checked", "true") && focused != Some(item) {
                    frame.set_string(
                        item_rect.x + 1,
                        item_rect.y,
                        &marker(doc, menu, item)[1..2],
                        theme::checked_marker().bg(theme::menu_bg()),
                    );
                }
                self.hits.push((item_rect, item));
            }
        }

        if area.height > 1 {
            let status_row = area.y + area.height - 1;
            let style = Style::default().bg(theme::status_bg()).fg(theme::status_fg());
            frame.render_widget(
                Block::default().style(style),
                Rect::new(area.x, status_row, area.width, 1),
            );
            frame.set_string(area.x + 1, status_row, &self.status, style);
        }
    }

    /// Topmost element drawn at the given cell.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<NodeId> {
        self.hits
            .iter()
            .rev()
            .find(|(rect, _)| {
                column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
            })
            .map(|(_, node)| *node)
    }
}

fn place_items(system: &mut MenuSystem) {
    let lists: Vec<(NodeId, Vec<NodeId>)> = system
        .registry()
        .iter()
        .filter_map(|(_, m)| m.list().map(|l| (l, m.items().to_vec())))
        .collect();
    let doc = system.document_mut();
    for (list, items) in lists {
        let Some(bounds) = doc.bounds(list) else {
            continue;
        };
        for (row, item) in items.into_iter().enumerate() {
            doc.set_bounds(
                item,
                Bounds::new(
                    bounds.x + 1.0,
                    bounds.y + 1.0 + row as f32,
                    (bounds.width - 2.0).max(0.0),
                    1.0,
                ),
            );
        }
    }
}

fn list_size(doc: &Document, menu: &MenuInstance) -> (f32, f32) {
    let widest = menu
        .items()
        .iter()
        .map(|&item| label(doc, item).chars().count())
        .max()
        .unwrap_or(0);
    let width = MARKER_WIDTH + widest + ARROW.chars().count() + 2;
    (width as f32, menu.items().len() as f32 + 2.0)
}

fn label(doc: &Document, node: NodeId) -> String {
    doc.text_content(node)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn marker(doc: &Document, menu: &MenuInstance, item: NodeId) -> &'static str {
    let checked = doc.attr_is(item, "aria-checked", "true");
    match (menu.is_checkbox(item), menu.is_radio(item), checked) {
        (true, _, true) => "[x] ",
        (true, _, false) => "[ ] ",
        (_, true, true) => "(*) ",
        (_, true, false) => "( ) ",
        _ => "    ",
    }
}

fn opens_submenu(system: &MenuSystem, menu: &MenuInstance, item: NodeId) -> bool {
    menu.submenus()
        .iter()
        .filter_map(|&sub| system.menu(sub))
        .any(|sub| sub.trigger() == Some(item))
}

fn to_rect(bounds: Bounds) -> Rect {
    let clamp = |v: f32| v.round().clamp(0.0, f32::from(u16::MAX)) as u16;
    Rect::new(
        clamp(bounds.x),
        clamp(bounds.y),
        clamp(bounds.width),
        clamp(bounds.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use ratatui::buffer::Buffer;

    const PAGE: &str = indoc! {r#"
        <div data-menu>
          <button data-menu-trigger>File</button>
          <ul data-menu-list>
            <li role="menuitem">New</li>
            <li role="menuitemcheckbox" aria-checked="true">Autosave</li>
          </ul>
        </div>
        <div data-menu>
          <button data-menu-trigger>Help</button>
          <ul data-menu-list><li role="menuitem">About</li></ul>
        </div>
    "#};

    fn row_text(buf: &Buffer, row: u16, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, row)).map(|c| c.symbol().to_string()).unwrap_or_default())
            .collect()
    }

    fn draw(view: &mut MenuView, system: &MenuSystem, area: Rect) -> Buffer {
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        view.render(system, &mut frame);
        buf
    }

    #[test]
    fn menubar_triggers_are_laid_out_in_a_row() {
        let mut system = MenuSystem::new(Document::parse(PAGE).unwrap());
        let ids = system.discover();
        let area = Rect::new(0, 0, 40, 12);
        let mut view = MenuView::new();
        view.layout(&mut system, area);
        let buf = draw(&mut view, &system, area);
        assert!(row_text(&buf, 0, 40).starts_with(" File   Help "));

        let help = system.menu(ids[1]).unwrap().trigger().unwrap();
        assert_eq!(view.hit_test(8, 0), Some(help));
        assert_eq!(view.hit_test(39, 5), None);
    }

    #[test]
    fn open_list_renders_below_trigger_with_markers() {
        let mut system = MenuSystem::new(Document::parse(PAGE).unwrap());
        system.set_reduced_motion(true);
        let id = system.discover()[0];
        let area = Rect::new(0, 0, 40, 12);
        let mut view = MenuView::new();
        view.layout(&mut system, area);
        system.open(id);
        view.layout(&mut system, area);
        view.set_status("opened");
        let buf = draw(&mut view, &system, area);

        assert!(row_text(&buf, 2, 40).contains("New"));
        assert!(row_text(&buf, 3, 40).contains("[x] Autosave"));
        assert!(row_text(&buf, 11, 40).contains("opened"));
        let autosave = system.menu(id).unwrap().items()[1];
        assert_eq!(view.hit_test(3, 3), Some(autosave));
    }
}
