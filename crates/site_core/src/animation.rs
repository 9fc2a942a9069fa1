//! Scroll-reveal of content cards and the one-shot statistics counter.

use std::time::Duration;

use tracing::debug;

/// Elements that start hidden and fade in once scrolled into view.
pub const REVEAL_SELECTORS: [&str; 5] = [
    ".stat-item",
    ".speaker-card",
    ".program-item",
    ".pricing-item",
    ".contact-item",
];
pub const REVEAL_THRESHOLD: f64 = 0.1;
/// The reveal viewport's bottom edge is pulled up by this much.
pub const REVEAL_BOTTOM_MARGIN: f64 = 50.0;
pub const STATS_THRESHOLD: f64 = 0.5;
pub const COUNTER_STEPS: f64 = 100.0;
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Element geometry relative to the top of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRect {
    pub top: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Fraction of the element inside `[root_top, root_bottom)`.
    pub fn visible_ratio(&self, root_top: f64, root_bottom: f64) -> f64 {
        if self.height <= 0.0 {
            return if self.top >= root_top && self.top <= root_bottom {
                1.0
            } else {
                0.0
            };
        }
        let visible = (self.top + self.height).min(root_bottom) - self.top.max(root_top);
        (visible.max(0.0) / self.height).min(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Pending,
    Revealed,
}

#[derive(Debug, Clone)]
pub struct RevealController {
    targets: Vec<(String, RevealState)>,
}

impl RevealController {
    /// Marks every target as pending.
    pub fn new(targets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            targets: targets
                .into_iter()
                .map(|id| (id.into(), RevealState::Pending))
                .collect(),
        }
    }

    pub fn state(&self, id: &str) -> Option<RevealState> {
        self.targets
            .iter()
            .find(|(target, _)| target == id)
            .map(|(_, state)| *state)
    }

    /// Feeds current geometry for observed elements and returns the ids that
    /// were revealed by this update. Revealed elements never go back.
    pub fn on_intersections<'a>(
        &mut self,
        entries: impl IntoIterator<Item = (&'a str, ElementRect)>,
        viewport_height: f64,
    ) -> Vec<String> {
        let root_bottom = viewport_height - REVEAL_BOTTOM_MARGIN;
        let mut revealed = Vec::new();
        for (id, rect) in entries {
            let Some((_, state)) = self.targets.iter_mut().find(|(target, _)| target == id) else {
                continue;
            };
            if *state == RevealState::Pending
                && rect.visible_ratio(0.0, root_bottom) >= REVEAL_THRESHOLD
            {
                *state = RevealState::Revealed;
                revealed.push(id.to_string());
            }
        }
        if !revealed.is_empty() {
            debug!(count = revealed.len(), "reveal: elements revealed");
        }
        revealed
    }
}

/// Parses the counter's target from its text by dropping non-digits.
pub fn parse_counter_target(text: &str) -> u64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Frame-by-frame tween of a counter from zero to its target. Each frame is
/// the text to display.
#[derive(Debug, Clone)]
pub struct CounterTween {
    target: u64,
    increment: f64,
    current: f64,
    finished: bool,
}

impl CounterTween {
    pub fn new(target: u64) -> Self {
        Self {
            target,
            increment: target as f64 / COUNTER_STEPS,
            current: 0.0,
            finished: false,
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(parse_counter_target(text))
    }

    pub fn target(&self) -> u64 {
        self.target
    }
}

impl Iterator for CounterTween {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }
        if self.current < self.target as f64 {
            self.current += self.increment;
            Some(format!("{}+", self.current.ceil() as u64))
        } else {
            self.finished = true;
            Some(format!("{}+", self.target))
        }
    }
}

/// Fires once, the first time the statistics block is at least half visible.
#[derive(Debug, Clone, Default)]
pub struct StatsCounterTrigger {
    fired: bool,
}

impl StatsCounterTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_observing(&self) -> bool {
        !self.fired
    }

    pub fn on_visibility(&mut self, ratio: f64) -> bool {
        if self.fired || ratio < STATS_THRESHOLD {
            return false;
        }
        self.fired = true;
        debug!(ratio, "stats: counter animation triggered");
        true
    }
}

/// Drives all counters one frame per tick until each has shown its final
/// value. `render` receives the counter index and the text for that frame.
pub async fn run_counters<F>(texts: &[String], frame_interval: Duration, mut render: F)
where
    F: FnMut(usize, &str),
{
    let mut tweens: Vec<Option<CounterTween>> = texts
        .iter()
        .map(|text| Some(CounterTween::from_text(text)))
        .collect();
    let mut ticker = tokio::time::interval(frame_interval);

    while tweens.iter().any(Option::is_some) {
        ticker.tick().await;
        for (index, slot) in tweens.iter_mut().enumerate() {
            let Some(tween) = slot else { continue };
            match tween.next() {
                Some(frame) => render(index, &frame),
                None => *slot = None,
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
