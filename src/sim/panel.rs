//! Hover-driven link panels for landed blocks
//!
//! Pure state machine: pointer events and clock advances go in, commands for
//! the presentation layer come out. Each block owns at most one panel and at
//! most one pending timer of each kind.

use serde::{Deserialize, Serialize};

use super::timers::TimerQueue;
use crate::settings::Settings;

/// Which element the pointer crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    Block,
    Panel,
}

/// Where the panel slides from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideDirection {
    /// Narrow viewport: the panel lives inside the block, clipped by it
    WithinBlock,
    /// Wide viewport: the panel sits in the container beside the block
    BesideBlock,
}

/// Placement for a newly created panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pub direction: SlideDirection,
    pub label: String,
    /// Relative to the block for `WithinBlock`, to the container otherwise
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    pub z_index: i32,
}

/// Instructions for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum PanelCommand {
    /// Create the panel element, offset by its own width
    Create { block: usize, layout: PanelLayout },
    /// Animate to the natural position
    SlideIn { block: usize },
    /// Animate back to the offset position
    SlideOut { block: usize },
    /// Detach the panel element
    Remove { block: usize },
}

/// Visible lifecycle of one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelPhase {
    #[default]
    Closed,
    Open,
    /// Sliding out; removed when the exit timer fires
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelTimer {
    SlideIn(usize),
    Close(usize),
    Remove(usize),
}

#[derive(Debug, Clone, Copy, Default)]
struct HoverState {
    over_block: bool,
    over_panel: bool,
    phase: PanelPhase,
}

/// Timing for panel transitions (ms)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelTiming {
    pub close_delay_ms: f64,
    pub exit_ms: f64,
    pub enter_delay_ms: f64,
}

impl From<&Settings> for PanelTiming {
    fn from(settings: &Settings) -> Self {
        Self {
            close_delay_ms: settings.close_delay_ms,
            exit_ms: settings.panel_exit_ms,
            enter_delay_ms: settings.panel_enter_delay_ms,
        }
    }
}

/// All panels of one scene
#[derive(Debug, Clone)]
pub struct PanelController {
    hovers: Vec<HoverState>,
    timers: TimerQueue<PanelTimer>,
    timing: PanelTiming,
}

impl PanelController {
    pub fn new(timing: PanelTiming) -> Self {
        Self {
            hovers: Vec::new(),
            timers: TimerQueue::new(),
            timing,
        }
    }

    fn slot(&mut self, block: usize) -> &mut HoverState {
        if self.hovers.len() <= block {
            self.hovers.resize(block + 1, HoverState::default());
        }
        &mut self.hovers[block]
    }

    pub fn phase(&self, block: usize) -> PanelPhase {
        self.hovers.get(block).map(|h| h.phase).unwrap_or_default()
    }

    /// A panel element exists for this block (open or sliding out)
    pub fn has_panel(&self, block: usize) -> bool {
        self.phase(block) != PanelPhase::Closed
    }

    /// Blocks with hover state recorded
    pub fn tracked_blocks(&self) -> usize {
        self.hovers.len()
    }

    pub fn panel_count(&self) -> usize {
        self.hovers
            .iter()
            .filter(|h| h.phase != PanelPhase::Closed)
            .count()
    }

    /// Pointer entered the block or its panel. `layout` is `Some` only when
    /// the block may open a panel (landed, with a link).
    pub fn pointer_enter(
        &mut self,
        block: usize,
        target: HoverTarget,
        now: f64,
        layout: Option<PanelLayout>,
    ) -> Vec<PanelCommand> {
        let mut commands = Vec::new();
        let enter_delay = self.timing.enter_delay_ms;

        let state = self.slot(block);
        match target {
            HoverTarget::Block => state.over_block = true,
            HoverTarget::Panel => state.over_panel = true,
        }
        let phase = state.phase;

        self.timers.cancel(PanelTimer::Close(block));

        match phase {
            PanelPhase::Closed => {
                if let (HoverTarget::Block, Some(layout)) = (target, layout) {
                    self.slot(block).phase = PanelPhase::Open;
                    commands.push(PanelCommand::Create { block, layout });
                    self.timers.schedule(PanelTimer::SlideIn(block), now + enter_delay);
                }
            }
            PanelPhase::Open => {}
            PanelPhase::Closing => {
                self.timers.cancel(PanelTimer::Remove(block));
                self.slot(block).phase = PanelPhase::Open;
                commands.push(PanelCommand::SlideIn { block });
            }
        }
        commands
    }

    /// Pointer left the block or its panel; closing is debounced
    pub fn pointer_leave(&mut self, block: usize, target: HoverTarget, now: f64) {
        let close_delay = self.timing.close_delay_ms;
        let state = self.slot(block);
        match target {
            HoverTarget::Block => state.over_block = false,
            HoverTarget::Panel => state.over_panel = false,
        }
        if state.phase == PanelPhase::Open {
            self.timers.schedule(PanelTimer::Close(block), now + close_delay);
        }
    }

    /// Fire every timer due at `now`
    pub fn advance(&mut self, now: f64) -> Vec<PanelCommand> {
        let mut commands = Vec::new();
        for timer in self.timers.pop_due(now) {
            match timer {
                PanelTimer::SlideIn(block) => {
                    if self.phase(block) == PanelPhase::Open {
                        commands.push(PanelCommand::SlideIn { block });
                    }
                }
                PanelTimer::Close(block) => {
                    let state = self.slot(block);
                    if state.phase == PanelPhase::Open && !state.over_block && !state.over_panel {
                        state.phase = PanelPhase::Closing;
                        self.timers.cancel(PanelTimer::SlideIn(block));
                        self.timers
                            .schedule(PanelTimer::Remove(block), now + self.timing.exit_ms);
                        commands.push(PanelCommand::SlideOut { block });
                    }
                }
                PanelTimer::Remove(block) => {
                    let state = self.slot(block);
                    if state.phase == PanelPhase::Closing {
                        *state = HoverState {
                            over_block: state.over_block,
                            ..HoverState::default()
                        };
                        commands.push(PanelCommand::Remove { block });
                    }
                }
            }
        }
        commands
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Forget every panel and cancel every timer
    pub fn reset(&mut self) {
        self.hovers.clear();
        self.timers.clear();
    }
}
