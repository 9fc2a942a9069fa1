use super::*;

fn controller() -> NavigationController {
    NavigationController::new(
        ["#home", "#about", "#program", "#register"],
        vec![
            SectionBox::new("home", 0.0, 600.0),
            SectionBox::new("about", 600.0, 800.0),
            SectionBox::new("program", 1400.0, 1000.0),
            SectionBox::new("register", 2400.0, 700.0),
        ],
        MobileMenu::new(true),
    )
}

#[test]
fn link_click_scrolls_below_fixed_header() {
    let mut nav = controller();
    let request = nav.on_link_click("#program").expect("scroll request");
    assert_eq!(request.top, 1320.0);
    assert!(request.smooth);
}

#[test]
fn dangling_link_requests_no_scroll() {
    let mut nav = controller();
    assert_eq!(nav.scroll_target("#speakers"), None);
    assert_eq!(nav.on_link_click("#speakers"), None);
}

#[test]
fn scroll_target_subtracts_header_offset() {
    let nav = controller();
    assert_eq!(nav.scroll_target("#home"), Some(-HEADER_OFFSET));
    assert_eq!(nav.scroll_target("#about"), Some(520.0));
}

#[test]
fn highlight_switches_before_section_boundary() {
    let mut nav = controller();
    assert_eq!(nav.on_scroll(499.0), Some("home"));
    assert_eq!(nav.on_scroll(500.0), Some("about"));
    assert_eq!(nav.active_link(), Some("#about"));
    assert_eq!(nav.links().iter().filter(|l| l.active).count(), 1);
}

#[test]
fn no_link_active_when_no_section_matches() {
    let mut nav = NavigationController::new(
        ["#about"],
        vec![SectionBox::new("about", 900.0, 400.0)],
        MobileMenu::default(),
    );
    nav.on_scroll(850.0);
    assert_eq!(nav.active_link(), Some("#about"));

    assert_eq!(nav.on_scroll(10.0), None);
    assert_eq!(nav.active_link(), None);
}

#[test]
fn later_section_wins_when_spans_overlap() {
    let mut nav = NavigationController::new(
        ["#a", "#b"],
        vec![SectionBox::new("a", 0.0, 1000.0), SectionBox::new("b", 300.0, 500.0)],
        MobileMenu::default(),
    );
    assert_eq!(nav.on_scroll(400.0), Some("b"));
}

#[test]
fn mobile_menu_toggles_and_closes() {
    let mut nav = controller();
    nav.menu_mut().toggle();
    assert!(nav.menu().is_open());

    nav.menu_mut().on_document_click(ClickTarget::Menu);
    assert!(nav.menu().is_open());
    nav.menu_mut().on_document_click(ClickTarget::Elsewhere);
    assert!(!nav.menu().is_open());

    nav.menu_mut().toggle();
    nav.on_link_click("#about");
    assert!(!nav.menu().is_open());
}

#[test]
fn missing_menu_elements_leave_menu_inert() {
    let mut menu = MobileMenu::new(false);
    menu.toggle();
    assert!(!menu.is_open());
}

#[test]
fn relayout_moves_scroll_targets_and_highlight() {
    let mut nav = controller();
    nav.set_sections(vec![
        SectionBox::new("home", 0.0, 400.0),
        SectionBox::new("about", 400.0, 500.0),
    ]);

    assert_eq!(nav.scroll_target("#about"), Some(320.0));
    assert_eq!(nav.scroll_target("#program"), None);
    assert_eq!(nav.on_scroll(350.0), Some("about"));
    assert_eq!(nav.active_link(), Some("#about"));
}
