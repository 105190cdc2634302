//! Scene controller: release schedule and frame-loop lifecycle
//!
//! A scene is one release-and-settle cycle. The host drives it by calling
//! [`Scene::tick`] once per display frame with the [`FrameTicket`] it was
//! handed; tickets from a torn-down generation are rejected, so a frame
//! callback that outlives a reset can never touch the new blocks.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::block::Block;
use super::config::{BlockConfig, ContainerDimensions, is_external_link};
use super::footprint::{LandedFootprint, LandedFootprints};
use super::panel::{
    HoverTarget, PanelCommand, PanelController, PanelLayout, PanelTiming, SlideDirection,
};
use crate::consts::PANEL_FONT_SCALE;
use crate::settings::Settings;

/// Permission to run one frame of a specific scene generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

impl FrameTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Schedule another frame with this ticket
    Continue(FrameTicket),
    /// Every block released and landed; the loop has stopped
    Complete,
    /// Ticket from an older generation or a stopped loop; nothing happened
    Stale,
}

/// Things the presentation layer reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Released { index: usize },
    Landed { index: usize, footprint: LandedFootprint },
    Completed,
}

/// Where a panel click should go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub target: String,
    /// Open in a new browsing context instead of the current one
    pub new_context: bool,
}

/// One falling-block scene
#[derive(Debug, Clone)]
pub struct Scene {
    configs: Vec<BlockConfig>,
    settings: Settings,
    dims: ContainerDimensions,
    /// Width of the host viewport, for choosing the panel direction
    viewport_width: f32,
    blocks: Vec<Block>,
    footprints: LandedFootprints,
    next_release: usize,
    release_timer: u32,
    ticks: u64,
    generation: u64,
    running: bool,
    rng: Pcg32,
    panels: PanelController,
    events: Vec<SceneEvent>,
}

impl Scene {
    pub fn new(
        configs: Vec<BlockConfig>,
        dims: ContainerDimensions,
        settings: Settings,
        seed: u64,
    ) -> Self {
        let panels = PanelController::new(PanelTiming::from(&settings));
        Self {
            configs,
            viewport_width: dims.width,
            dims,
            settings,
            blocks: Vec::new(),
            footprints: LandedFootprints::new(),
            next_release: 0,
            release_timer: 0,
            ticks: 0,
            generation: 0,
            running: false,
            rng: Pcg32::seed_from_u64(seed),
            panels,
            events: Vec::new(),
        }
    }

    /// Begin the frame loop. Returns `None` if a loop is already running or
    /// there is nothing to release.
    pub fn start(&mut self) -> Option<FrameTicket> {
        if self.running {
            return None;
        }
        if self.is_settled() {
            log::info!("Nothing to animate ({} blocks)", self.configs.len());
            return None;
        }
        log::info!("Starting animation ({} blocks)", self.configs.len());
        self.running = true;
        Some(self.ticket())
    }

    /// Stop the loop and drop every block, footprint, panel and timer.
    /// Outstanding tickets become stale.
    pub fn reset(&mut self) {
        if self.running || !self.blocks.is_empty() {
            log::info!("Resetting scene (generation {})", self.generation);
        }
        self.running = false;
        self.generation += 1;
        self.blocks.clear();
        self.footprints.clear();
        self.next_release = 0;
        self.release_timer = 0;
        self.ticks = 0;
        self.panels.reset();
        self.events.clear();
    }

    /// Rebuild the scene for a new viewport size
    pub fn on_size_change(&mut self, viewport_width: f32, viewport_height: f32) -> Option<FrameTicket> {
        self.reset();
        self.dims = ContainerDimensions::from_viewport(viewport_width, viewport_height);
        self.viewport_width = viewport_width;
        log::debug!(
            "Resized to {:.0}x{:.0} (scale {:.3})",
            self.dims.width,
            self.dims.height,
            self.dims.scale()
        );
        self.start()
    }

    /// Run one frame: maybe release the next block, then advance every
    /// falling block.
    pub fn tick(&mut self, ticket: FrameTicket) -> TickOutcome {
        if !self.running || ticket.generation != self.generation {
            log::debug!(
                "Ignoring stale frame (ticket {}, scene {})",
                ticket.generation,
                self.generation
            );
            return TickOutcome::Stale;
        }
        self.ticks += 1;

        if self.next_release < self.configs.len()
            && self.release_timer % self.settings.release_interval() == 0
        {
            self.release_next();
        }
        self.release_timer += 1;

        let gravity = self.settings.gravity;
        for block in self.blocks.iter_mut() {
            if block.integrate(&mut self.footprints, &self.dims, gravity) {
                log::debug!(
                    "Block {} landed at ({:.1}, {:.1})",
                    block.index,
                    block.pos.x,
                    block.pos.y
                );
                self.events.push(SceneEvent::Landed {
                    index: block.index,
                    footprint: block.footprint(),
                });
            }
        }

        if self.is_settled() {
            self.running = false;
            self.events.push(SceneEvent::Completed);
            log::info!("Animation complete after {} ticks", self.ticks);
            TickOutcome::Complete
        } else {
            TickOutcome::Continue(self.ticket())
        }
    }

    fn release_next(&mut self) {
        let index = self.next_release;
        log::debug!("Creating block {}", index);
        let block = Block::spawn(
            index,
            &self.configs[index],
            &self.dims,
            &self.settings,
            &mut self.rng,
        );
        self.blocks.push(block);
        self.next_release += 1;
        self.events.push(SceneEvent::Released { index });
    }

    /// Start (if needed) and tick until the scene settles, as a virtual
    /// display would. Returns the number of frames, or `None` if it did not
    /// settle within `max_ticks`.
    pub fn settle(&mut self, max_ticks: u32) -> Option<u32> {
        let Some(mut ticket) = self.start().or_else(|| self.running.then(|| self.ticket())) else {
            return self.is_settled().then_some(0);
        };
        for frame in 1..=max_ticks {
            match self.tick(ticket) {
                TickOutcome::Continue(next) => ticket = next,
                TickOutcome::Complete => return Some(frame),
                TickOutcome::Stale => return None,
            }
        }
        None
    }

    fn ticket(&self) -> FrameTicket {
        FrameTicket {
            generation: self.generation,
        }
    }

    /// All blocks released and all released blocks landed
    pub fn is_settled(&self) -> bool {
        self.next_release >= self.configs.len() && self.blocks.iter().all(Block::is_landed)
    }

    pub fn is_animating(&self) -> bool {
        self.running
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn released_count(&self) -> usize {
        self.next_release
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn configs(&self) -> &[BlockConfig] {
        &self.configs
    }

    pub fn footprints(&self) -> &LandedFootprints {
        &self.footprints
    }

    pub fn dimensions(&self) -> &ContainerDimensions {
        &self.dims
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_viewport_width(&mut self, viewport_width: f32) {
        self.viewport_width = viewport_width;
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    // === Link panels ===

    /// Narrow viewports keep the panel inside the block
    pub fn panel_direction(&self) -> SlideDirection {
        let widest = self.dims.widest_block(&self.configs);
        if self.viewport_width < widest * 2.0 {
            SlideDirection::WithinBlock
        } else {
            SlideDirection::BesideBlock
        }
    }

    /// Placement for a block's panel; `None` unless it has landed and has a link
    pub fn panel_layout(&self, index: usize) -> Option<PanelLayout> {
        let block = self.blocks.get(index).filter(|b| b.is_landed())?;
        let config = self.configs.get(index).filter(|c| c.has_link())?;
        let direction = self.panel_direction();
        let (left, top, z_index) = match direction {
            SlideDirection::WithinBlock => (0.0, 0.0, 15),
            SlideDirection::BesideBlock => (block.pos.x + block.width, block.pos.y, 5),
        };
        Some(PanelLayout {
            direction,
            label: config.link_label.clone(),
            left,
            top,
            width: block.width,
            height: block.height,
            font_size: self.dims.font_size * PANEL_FONT_SCALE,
            z_index,
        })
    }

    pub fn pointer_enter(&mut self, index: usize, target: HoverTarget, now: f64) -> Vec<PanelCommand> {
        if index >= self.blocks.len() {
            return Vec::new();
        }
        let layout = self.panel_layout(index);
        self.panels.pointer_enter(index, target, now, layout)
    }

    pub fn pointer_leave(&mut self, index: usize, target: HoverTarget, now: f64) {
        if index < self.blocks.len() {
            self.panels.pointer_leave(index, target, now);
        }
    }

    /// Fire panel timers due at `now`
    pub fn advance_timers(&mut self, now: f64) -> Vec<PanelCommand> {
        self.panels.advance(now)
    }

    pub fn next_timer_deadline(&self) -> Option<f64> {
        self.panels.next_deadline()
    }

    pub fn panels(&self) -> &PanelController {
        &self.panels
    }

    /// Resolve a click on a block's panel
    pub fn click_panel(&self, index: usize) -> Option<Navigation> {
        if !self.panels.has_panel(index) {
            return None;
        }
        let config = self.configs.get(index).filter(|c| c.has_link())?;
        Some(Navigation {
            target: config.link_target.clone(),
            new_context: is_external_link(&config.link_target),
        })
    }
}
