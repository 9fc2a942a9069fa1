use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabButton {
    pub target: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabPanel {
    pub id: String,
    pub active: bool,
}

/// Mutually exclusive content panels selected by tab buttons.
#[derive(Debug, Clone, Default)]
pub struct TabController {
    buttons: Vec<TabButton>,
    panels: Vec<TabPanel>,
}

impl TabController {
    /// Builds the controller from markup state; whatever is flagged active
    /// there stays active until the first click.
    pub fn new(buttons: Vec<TabButton>, panels: Vec<TabPanel>) -> Self {
        Self { buttons, panels }
    }

    pub fn buttons(&self) -> &[TabButton] {
        &self.buttons
    }

    pub fn panels(&self) -> &[TabPanel] {
        &self.panels
    }

    /// Activates the button at `index` and its target panel. Returns the
    /// id of the panel now shown, which is `None` for a dangling target.
    pub fn activate(&mut self, index: usize) -> Option<&str> {
        let target = self.buttons.get(index)?.target.clone();

        for (i, button) in self.buttons.iter_mut().enumerate() {
            button.active = i == index;
        }
        let mut shown = None;
        for (i, panel) in self.panels.iter_mut().enumerate() {
            panel.active = panel.id == target && shown.is_none();
            if panel.active {
                shown = Some(i);
            }
        }

        if shown.is_none() {
            debug!(tab_target = %target, "tabs: no panel matches tab target");
        }
        shown.map(|i| self.panels[i].id.as_str())
    }

    pub fn active_panel(&self) -> Option<&str> {
        self.panels
            .iter()
            .find(|panel| panel.active)
            .map(|panel| panel.id.as_str())
    }
}
