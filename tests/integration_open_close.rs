use std::time::Duration;

use aria_menu::{Bounds, Document, MenuConfig, MenuEvent, MenuId, MenuSystem, NodeId, Phase};
use indoc::indoc;

const PAGE: &str = indoc! {r#"
    <div data-menu id="file">
      <button data-menu-trigger>File</button>
      <ul data-menu-list>
        <li role="menuitem">New</li>
        <li role="none">
          <span role="menuitem">Export</span>
          <ul data-menu-list>
            <li role="menuitem">PDF</li>
            <li role="menuitem">PNG</li>
          </ul>
        </li>
      </ul>
    </div>
    <div data-menu id="view">
      <button data-menu-trigger>View</button>
      <ul data-menu-list>
        <li role="menuitem">Zoom</li>
      </ul>
    </div>
    <aside data-menu id="sidebar">
      <ul data-menu-list><li role="menuitem">Inbox</li></ul>
    </aside>
    <button id="outside">Elsewhere</button>
"#};

struct Page {
    system: MenuSystem,
    file: MenuId,
    export: MenuId,
    view: MenuId,
    sidebar: MenuId,
}

fn page(config: MenuConfig) -> Page {
    let mut system = MenuSystem::with_config(Document::parse(PAGE).unwrap(), config).unwrap();
    let ids = system.discover();
    let file = ids[0];
    let export = system.menu(file).unwrap().submenus()[0];
    Page {
        file,
        export,
        view: ids[1],
        sidebar: ids[2],
        system,
    }
}

fn parts(system: &MenuSystem, id: MenuId) -> (NodeId, NodeId) {
    let menu = system.menu(id).unwrap();
    (menu.trigger().unwrap(), menu.list().unwrap())
}

fn settle(system: &mut MenuSystem) {
    for _ in 0..64 {
        if !system.has_pending_work() {
            break;
        }
        system.advance(Duration::from_millis(50));
    }
}

fn snapshot(system: &MenuSystem) -> String {
    format!("{:?}", system.document())
}

#[test]
fn open_and_close_are_idempotent() {
    let Page {
        mut system, file, ..
    } = page(MenuConfig::default());

    system.open(file);
    settle(&mut system);
    system.take_events();
    let opened = snapshot(&system);
    system.open(file);
    assert_eq!(snapshot(&system), opened);
    assert!(system.take_events().is_empty());
    assert!(!system.has_pending_work());

    system.close(file);
    settle(&mut system);
    system.take_events();
    let closed = snapshot(&system);
    system.close(file);
    assert_eq!(snapshot(&system), closed);
    assert!(system.take_events().is_empty());
    assert!(!system.has_pending_work());
}

#[test]
fn opening_closes_unrelated_menus_only() {
    let Page {
        mut system,
        file,
        export,
        view,
        sidebar,
    } = page(MenuConfig::default());

    system.open(file);
    system.open(export);
    assert!(system.is_open(file));
    assert!(system.is_open(export));

    system.open(view);
    assert!(system.is_open(view));
    assert!(!system.is_open(file));
    assert!(!system.is_open(export));
    // always-visible lists never close
    assert!(system.is_open(sidebar));

    let events = system.take_events();
    assert!(events.contains(&MenuEvent::Closed(file)));
    assert!(events.contains(&MenuEvent::Closed(export)));
}

#[test]
fn expanded_state_follows_one_frame_later() {
    let Page {
        mut system, view, ..
    } = page(MenuConfig::default());
    system.set_reduced_motion(true);
    let (trigger, _) = parts(&system, view);
    let root = system.menu(view).unwrap().root();

    system.open(view);
    assert_eq!(system.document().attr(root, "data-menu-open"), Some("true"));
    assert_eq!(system.phase(view), Some(Phase::Open));
    assert_eq!(system.document().attr(trigger, "aria-expanded"), Some("false"));
    system.advance(Duration::ZERO);
    assert_eq!(system.document().attr(trigger, "aria-expanded"), Some("true"));

    system.close(view);
    assert_eq!(system.document().attr(trigger, "aria-expanded"), Some("true"));
    system.advance(Duration::ZERO);
    assert_eq!(system.document().attr(trigger, "aria-expanded"), Some("false"));
}

#[test]
fn close_hides_list_only_after_the_fade() {
    let Page {
        mut system, view, ..
    } = page(MenuConfig::default());
    let (_, list) = parts(&system, view);
    system.open(view);
    settle(&mut system);
    assert_eq!(system.document().attr(list, "data-placement"), Some("bottom-start"));

    system.close(view);
    assert_eq!(system.phase(view), Some(Phase::Closing));
    system.advance(Duration::from_millis(150));
    assert_eq!(system.document().style(list, "opacity"), Some("0.5"));
    assert_eq!(system.document().style(list, "display"), None);

    system.advance(Duration::from_millis(150));
    assert_eq!(system.phase(view), Some(Phase::Closed));
    assert_eq!(system.document().style(list, "display"), Some("none"));
    assert_eq!(system.document().attr(list, "data-placement"), None);
}

#[test]
fn reopening_mid_fade_starts_from_current_opacity() {
    let Page {
        mut system, view, ..
    } = page(MenuConfig::default());
    let (_, list) = parts(&system, view);
    system.open(view);
    settle(&mut system);

    system.close(view);
    system.advance(Duration::from_millis(150));
    system.open(view);
    assert_eq!(system.document().style(list, "opacity"), Some("0.5"));
    assert_eq!(system.phase(view), Some(Phase::Opening));

    system.advance(Duration::from_millis(150));
    assert_eq!(system.document().style(list, "opacity"), Some("0.75"));
    settle(&mut system);
    // the cancelled close never hides the list
    assert_eq!(system.phase(view), Some(Phase::Open));
    assert_eq!(system.document().style(list, "display"), None);
    assert_eq!(system.document().style(list, "opacity"), Some("1"));
}

#[test]
fn reduced_motion_still_runs_close_cleanup() {
    let config = MenuConfig::from_toml_str("[popover]\ntransformOrigin = true").unwrap();
    let Page {
        mut system, view, ..
    } = page(config);
    system.set_reduced_motion(true);
    let (_, list) = parts(&system, view);

    system.open(view);
    assert_eq!(system.document().style(list, "opacity"), Some("1"));
    assert_eq!(system.document().style(list, "transform-origin"), Some("top left"));

    system.close(view);
    assert_eq!(system.phase(view), Some(Phase::Closed));
    assert_eq!(system.document().style(list, "display"), Some("none"));
    assert_eq!(system.document().style(list, "transform-origin"), None);
    assert_eq!(system.document().attr(list, "data-placement"), None);
}

#[test]
fn zero_duration_config_behaves_like_reduced_motion() {
    let config = MenuConfig::from_toml_str("[animation]\nduration = 0").unwrap();
    let Page {
        mut system, view, ..
    } = page(config);
    let (_, list) = parts(&system, view);
    system.open(view);
    assert_eq!(system.phase(view), Some(Phase::Open));
    system.close(view);
    assert_eq!(system.document().style(list, "display"), Some("none"));
}

#[test]
fn list_flips_above_and_follows_its_trigger_while_open() {
    let Page {
        mut system, view, ..
    } = page(MenuConfig::default());
    let (trigger, list) = parts(&system, view);
    let doc = system.document_mut();
    doc.set_viewport(Bounds::new(0.0, 0.0, 200.0, 100.0));
    doc.set_bounds(trigger, Bounds::new(10.0, 90.0, 40.0, 10.0));
    doc.set_bounds(list, Bounds::new(0.0, 0.0, 80.0, 40.0));

    system.open(view);
    assert_eq!(system.document().attr(list, "data-placement"), Some("top-start"));
    assert_eq!(system.document().style(list, "top"), Some("50px"));

    system
        .document_mut()
        .set_bounds(trigger, Bounds::new(30.0, 10.0, 40.0, 10.0));
    system.advance(Duration::from_millis(16));
    assert_eq!(system.document().attr(list, "data-placement"), Some("bottom-start"));
    assert_eq!(system.document().style(list, "left"), Some("30px"));
    assert_eq!(system.document().style(list, "top"), Some("20px"));

    system.close(view);
    settle(&mut system);
    system
        .document_mut()
        .set_bounds(trigger, Bounds::new(60.0, 10.0, 40.0, 10.0));
    system.advance(Duration::from_millis(16));
    assert_eq!(system.document().style(list, "left"), Some("30px"));
}

#[test]
fn pointer_down_outside_closes_and_resets() {
    let Page {
        mut system,
        file,
        sidebar,
        ..
    } = page(MenuConfig::default());
    system.set_reduced_motion(true);
    let outside = system.document().get_element_by_id("outside").unwrap();
    let sidebar_items = system.menu(sidebar).unwrap().items().to_vec();

    system.open(file);
    let items = system.menu(file).unwrap().items().to_vec();
    assert_eq!(system.document().attr(items[0], "tabindex"), Some("0"));

    system.pointer_down(outside);
    assert!(!system.is_open(file));
    assert!(
        items
            .iter()
            .all(|&i| system.document().attr(i, "tabindex") == Some("-1"))
    );
    assert_eq!(
        system.document().attr(sidebar_items[0], "tabindex"),
        Some("0")
    );
}

#[test]
fn pointer_down_inside_keeps_menu_open() {
    let Page {
        mut system, file, ..
    } = page(MenuConfig::default());
    system.open(file);
    let (_, list) = parts(&system, file);
    system.pointer_down(list);
    assert!(system.is_open(file));
}

#[test]
fn disabled_trigger_ignores_clicks() {
    let markup = indoc! {r#"
        <div data-menu>
          <button data-menu-trigger aria-disabled="true">Locked</button>
          <ul data-menu-list><li role="menuitem">Secret</li></ul>
        </div>
    "#};
    let mut system = MenuSystem::new(Document::parse(markup).unwrap());
    let id = system.discover()[0];
    let (trigger, _) = parts(&system, id);
    assert_eq!(system.document().style(trigger, "pointer-events"), Some("none"));
    system.click(trigger);
    assert!(!system.is_open(id));
}
