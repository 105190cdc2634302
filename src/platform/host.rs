//! Platform-neutral scene hosting
//!
//! Owns the mounted scene (if any) and coalesces bursts of resize
//! notifications into one rebuild per display frame. The browser binding
//! wraps this; tests drive it directly.

use crate::settings::Settings;
use crate::sim::{
    BlockConfig, ContainerDimensions, FrameTicket, HoverTarget, Navigation, PanelCommand, Scene,
    TickOutcome,
};

/// Mount point for at most one scene
#[derive(Debug, Default)]
pub struct SceneHost {
    scene: Option<Scene>,
    /// Latest size seen since the last flush
    pending_resize: Option<(f32, f32)>,
}

impl SceneHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene sized for the viewport and start it
    pub fn mount(
        &mut self,
        configs: Vec<BlockConfig>,
        viewport: (f32, f32),
        settings: Settings,
        seed: u64,
    ) -> Option<FrameTicket> {
        if self.scene.is_some() {
            log::warn!("Remounting over an existing scene");
            self.unmount();
        }
        let dims = ContainerDimensions::from_viewport(viewport.0, viewport.1);
        let mut scene = Scene::new(configs, dims, settings, seed);
        scene.set_viewport_width(viewport.0);
        let ticket = scene.start();
        self.scene = Some(scene);
        ticket
    }

    /// Tear down the scene; returns false if nothing was mounted
    pub fn unmount(&mut self) -> bool {
        self.pending_resize = None;
        match self.scene.take() {
            Some(mut scene) => {
                scene.reset();
                true
            }
            None => false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.scene.is_some()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    pub fn is_animating(&self) -> bool {
        self.scene.as_ref().is_some_and(Scene::is_animating)
    }

    pub fn start(&mut self) -> Option<FrameTicket> {
        self.scene.as_mut()?.start()
    }

    /// Stop the scene and drop any resize still waiting for a frame
    pub fn reset(&mut self) {
        self.pending_resize = None;
        if let Some(scene) = self.scene.as_mut() {
            scene.reset();
        }
    }

    /// Run one display frame
    pub fn frame(&mut self, ticket: FrameTicket) -> TickOutcome {
        match self.scene.as_mut() {
            Some(scene) => scene.tick(ticket),
            None => TickOutcome::Stale,
        }
    }

    /// Note a new viewport size. Returns true when the caller should request
    /// a frame to flush it; later sizes in the same frame just overwrite.
    pub fn request_resize(&mut self, width: f32, height: f32) -> bool {
        if self.scene.is_none() {
            log::warn!("Ignoring resize to {width}x{height}: no scene mounted");
            return false;
        }
        self.pending_resize.replace((width, height)).is_none()
    }

    /// Rebuild for the latest requested size
    pub fn flush_resize(&mut self) -> Option<FrameTicket> {
        let (width, height) = self.pending_resize.take()?;
        self.scene.as_mut()?.on_size_change(width, height)
    }

    pub fn has_pending_resize(&self) -> bool {
        self.pending_resize.is_some()
    }

    // === Hover routing; all of these are no-ops without a scene ===

    pub fn pointer_enter(&mut self, block: usize, target: HoverTarget, now: f64) -> Vec<PanelCommand> {
        self.scene
            .as_mut()
            .map(|s| s.pointer_enter(block, target, now))
            .unwrap_or_default()
    }

    pub fn pointer_leave(&mut self, block: usize, target: HoverTarget, now: f64) {
        if let Some(scene) = self.scene.as_mut() {
            scene.pointer_leave(block, target, now);
        }
    }

    pub fn advance_timers(&mut self, now: f64) -> Vec<PanelCommand> {
        self.scene
            .as_mut()
            .map(|s| s.advance_timers(now))
            .unwrap_or_default()
    }

    pub fn next_timer_deadline(&self) -> Option<f64> {
        self.scene.as_ref()?.next_timer_deadline()
    }

    pub fn click_panel(&self, block: usize) -> Option<Navigation> {
        self.scene.as_ref()?.click_panel(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::default_blocks;

    fn mounted() -> (SceneHost, FrameTicket) {
        let mut host = SceneHost::new();
        let ticket = host
            .mount(default_blocks(), (1200.0, 900.0), Settings::default(), 7)
            .unwrap();
        (host, ticket)
    }

    #[test]
    fn test_mount_starts_animating() {
        let (host, _) = mounted();
        assert!(host.is_mounted());
        assert!(host.is_animating());
        let dims = host.scene().unwrap().dimensions();
        assert!((dims.height - 720.0).abs() < 1e-3);
        assert!((dims.width - 720.0).abs() < 1e-3);
    }

    #[test]
    fn test_resize_while_unmounted_is_ignored() {
        let mut host = SceneHost::new();
        assert!(!host.request_resize(800.0, 600.0));
        assert!(!host.has_pending_resize());
        assert!(host.flush_resize().is_none());
    }

    #[test]
    fn test_resize_burst_coalesces_to_latest() {
        let (mut host, _) = mounted();
        assert!(host.request_resize(800.0, 600.0));
        assert!(!host.request_resize(700.0, 600.0));
        assert!(!host.request_resize(600.0, 1000.0));

        let ticket = host.flush_resize().unwrap();
        let dims = host.scene().unwrap().dimensions();
        assert!((dims.width - 540.0).abs() < 1e-3);
        assert!((dims.height - 800.0).abs() < 1e-3);
        assert!(matches!(host.frame(ticket), TickOutcome::Continue(_)));

        // Nothing left to flush
        assert!(host.flush_resize().is_none());
    }

    #[test]
    fn test_resize_invalidates_in_flight_frame() {
        let (mut host, ticket) = mounted();
        let TickOutcome::Continue(ticket) = host.frame(ticket) else {
            panic!("expected the loop to continue");
        };
        host.request_resize(640.0, 480.0);
        host.flush_resize();
        assert_eq!(host.frame(ticket), TickOutcome::Stale);
        assert!(host.scene().unwrap().blocks().is_empty());
    }

    #[test]
    fn test_unmount_drops_scene() {
        let (mut host, ticket) = mounted();
        assert!(host.unmount());
        assert!(!host.unmount());
        assert!(!host.is_animating());
        assert_eq!(host.frame(ticket), TickOutcome::Stale);
        assert!(host.pointer_enter(0, HoverTarget::Block, 0.0).is_empty());
        assert_eq!(host.next_timer_deadline(), None);
        assert!(host.click_panel(0).is_none());
    }

    #[test]
    fn test_reset_discards_pending_resize() {
        let (mut host, _) = mounted();
        assert!(host.request_resize(800.0, 600.0));
        host.reset();
        assert!(!host.has_pending_resize());
        assert!(host.flush_resize().is_none());
        assert!(!host.is_animating());
    }

    #[test]
    fn test_reset_then_start() {
        let (mut host, _) = mounted();
        host.reset();
        assert!(!host.is_animating());
        let ticket = host.start().unwrap();
        assert!(host.start().is_none());
        assert!(matches!(host.frame(ticket), TickOutcome::Continue(_)));
    }
}
