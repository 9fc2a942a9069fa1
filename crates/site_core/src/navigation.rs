//! Smooth-scroll navigation, active-section highlighting and the mobile menu.

use tracing::debug;

/// Space kept clear for the fixed header when scrolling to a section.
pub const HEADER_OFFSET: f64 = 80.0;
/// Highlight switches this far before a section's real top edge.
pub const ACTIVE_PRETRIGGER: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SectionBox {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionBox {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }

    fn contains_with_pretrigger(&self, offset: f64) -> bool {
        let start = self.top - ACTIVE_PRETRIGGER;
        offset >= start && offset < start + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub smooth: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Hamburger,
    Menu,
    Elsewhere,
}

/// Hamburger-driven menu for narrow viewports.
///
/// A page without the hamburger or the menu element gets an inert menu that
/// ignores every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MobileMenu {
    present: bool,
    open: bool,
}

impl MobileMenu {
    pub fn new(present: bool) -> Self {
        Self {
            present,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        if self.present {
            self.open = !self.open;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn on_document_click(&mut self, target: ClickTarget) {
        if self.present && target == ClickTarget::Elsewhere {
            self.close();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    links: Vec<NavLink>,
    sections: Vec<SectionBox>,
    menu: MobileMenu,
}

impl NavigationController {
    pub fn new(
        hrefs: impl IntoIterator<Item = impl Into<String>>,
        sections: Vec<SectionBox>,
        menu: MobileMenu,
    ) -> Self {
        Self {
            links: hrefs
                .into_iter()
                .map(|href| NavLink {
                    href: href.into(),
                    active: false,
                })
                .collect(),
            sections,
            menu,
        }
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn menu(&self) -> &MobileMenu {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut MobileMenu {
        &mut self.menu
    }

    /// Replaces section geometry after a relayout.
    pub fn set_sections(&mut self, sections: Vec<SectionBox>) {
        self.sections = sections;
    }

    /// Scroll offset for `href` (`#id`), clear of the fixed header.
    pub fn scroll_target(&self, href: &str) -> Option<f64> {
        let target = href.strip_prefix('#').unwrap_or(href);
        self.sections
            .iter()
            .find(|s| s.id == target)
            .map(|section| section.top - HEADER_OFFSET)
    }

    /// Handles a click on a nav link. The default jump is always suppressed;
    /// a scroll is requested only when the target section exists.
    pub fn on_link_click(&mut self, href: &str) -> Option<ScrollRequest> {
        self.menu.close();
        let Some(top) = self.scroll_target(href) else {
            debug!(href, "navigation: link target not found");
            return None;
        };
        Some(ScrollRequest { top, smooth: true })
    }

    /// Recomputes the highlighted link for the given scroll offset and
    /// returns the active section id, if any.
    pub fn on_scroll(&mut self, offset: f64) -> Option<&str> {
        let current = self
            .sections
            .iter()
            .rposition(|section| section.contains_with_pretrigger(offset));

        let active_href = current.map(|idx| format!("#{}", self.sections[idx].id));
        for link in &mut self.links {
            link.active = active_href.as_deref() == Some(link.href.as_str());
        }

        current.map(|idx| self.sections[idx].id.as_str())
    }

    pub fn active_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.active)
            .map(|link| link.href.as_str())
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
