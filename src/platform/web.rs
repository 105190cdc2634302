//! Browser binding
//!
//! Mirrors the scene into absolutely positioned `div`s inside a container
//! element, drives it from `requestAnimationFrame`, and turns panel commands
//! into DOM edits. DOM callbacks hold only weak references to the view, and
//! every callback checks it still belongs to the current scene generation.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlElement, MouseEvent, Window};

use super::host::SceneHost;
use crate::settings::Settings;
use crate::sim::{
    BlockConfig, BlockTransform, FrameTicket, HoverTarget, Navigation, PanelCommand, PanelLayout,
    Scene, SceneEvent, SlideDirection, TickOutcome, default_blocks,
};

type MouseListener = Closure<dyn FnMut(MouseEvent)>;

const HIDDEN_PANEL: &str = "translateX(-100%)";
const SHOWN_PANEL: &str = "translateX(0)";

struct PanelView {
    element: HtmlElement,
    _listeners: Vec<MouseListener>,
}

struct BlockView {
    element: HtmlElement,
    _listeners: Vec<MouseListener>,
    panel: Option<PanelView>,
}

struct View {
    host: SceneHost,
    window: Window,
    document: Document,
    container: HtmlElement,
    blocks: Vec<Option<BlockView>>,
    frame_id: Option<i32>,
    resize_frame_id: Option<i32>,
    timer_id: Option<i32>,
    resize_listener: Option<Closure<dyn FnMut(Event)>>,
}

#[inline]
fn px(value: f32) -> String {
    format!("{value}px")
}

#[inline]
fn now() -> f64 {
    js_sys::Date::now()
}

fn viewport(window: &Window) -> (f32, f32) {
    let read = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    (read(window.inner_width()), read(window.inner_height()))
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn place_block(element: &HtmlElement, transform: &BlockTransform) -> Result<(), JsValue> {
    let style = element.style();
    style.set_property("left", &px(transform.left))?;
    style.set_property("top", &px(transform.top))?;
    style.set_property("transform", &format!("rotate({}deg)", transform.rotation_deg))?;
    Ok(())
}

fn navigate(window: &Window, nav: &Navigation) {
    let result = if nav.new_context {
        window
            .open_with_url_and_target(&nav.target, "_blank")
            .map(|_| ())
    } else {
        window.location().set_href(&nav.target)
    };
    if let Err(e) = result {
        log::warn!("Navigation to {} failed: {:?}", nav.target, e);
    }
}

impl View {
    fn generation(&self) -> Option<u64> {
        self.host.scene().map(Scene::generation)
    }

    fn block_view(&self, index: usize) -> Option<&BlockView> {
        self.blocks.get(index).and_then(Option::as_ref)
    }

    /// Size the container element to the scene's dimensions
    fn apply_container_size(&self) -> Result<(), JsValue> {
        let Some(scene) = self.host.scene() else {
            return Ok(());
        };
        let dims = scene.dimensions();
        let style = self.container.style();
        style.set_property("position", "relative")?;
        style.set_property("width", &px(dims.width))?;
        style.set_property("height", &px(dims.height))?;
        Ok(())
    }

    /// Cancel the frame loop and timers, and detach every element we created
    fn teardown(&mut self) {
        if let Some(id) = self.frame_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        if let Some(id) = self.timer_id.take() {
            self.window.clear_timeout_with_handle(id);
        }
        for block in self.blocks.drain(..).flatten() {
            if let Some(panel) = block.panel {
                panel.element.remove();
            }
            block.element.remove();
        }
    }

    fn create_block(&mut self, index: usize, view: &Weak<RefCell<View>>) -> Result<(), JsValue> {
        let Some(scene) = self.host.scene() else {
            return Ok(());
        };
        let (Some(block), Some(config)) = (scene.block(index), scene.configs().get(index)) else {
            return Ok(());
        };
        let (width, height, transform) = (block.width, block.height, block.transform());
        let text = config.text.clone();
        let dims = *scene.dimensions();
        let generation = scene.generation();

        let element: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        element.set_class_name("block");
        element.set_text_content(Some(&text));
        let style = element.style();
        style.set_property("position", "absolute")?;
        style.set_property("box-sizing", "border-box")?;
        style.set_property("width", &px(width))?;
        style.set_property("height", &px(height))?;
        style.set_property("font-size", &px(dims.font_size))?;
        style.set_property("padding", &format!("{}px 0", dims.padding))?;
        place_block(&element, &transform)?;

        let listeners = vec![
            hover_listener(view, index, generation, HoverTarget::Block, true),
            hover_listener(view, index, generation, HoverTarget::Block, false),
        ];
        element.add_event_listener_with_callback("mouseenter", listeners[0].as_ref().unchecked_ref())?;
        element.add_event_listener_with_callback("mouseleave", listeners[1].as_ref().unchecked_ref())?;

        self.container.append_child(&element)?;
        if self.blocks.len() <= index {
            self.blocks.resize_with(index + 1, || None);
        }
        self.blocks[index] = Some(BlockView {
            element,
            _listeners: listeners,
            panel: None,
        });
        Ok(())
    }

    /// Freeze a landed block and start the flattening transition around its contact corner
    fn settle_block(&self, index: usize) -> Result<(), JsValue> {
        let (Some(view), Some(scene)) = (self.block_view(index), self.host.scene()) else {
            return Ok(());
        };
        let Some(block) = scene.block(index) else {
            return Ok(());
        };
        let transform = block.transform();
        let style = view.element.style();
        if let Some(origin) = transform.origin {
            style.set_property("transform-origin", &format!("{}px {}px", origin.x, origin.y))?;
        }
        style.set_property(
            "transition",
            &format!("transform {}ms ease-out", scene.settings().settle_transition_ms),
        )?;
        place_block(&view.element, &transform)
    }

    fn render_falling(&self) -> Result<(), JsValue> {
        let Some(scene) = self.host.scene() else {
            return Ok(());
        };
        for block in scene.blocks().iter().filter(|b| !b.is_landed()) {
            if let Some(view) = self.block_view(block.index) {
                place_block(&view.element, &block.transform())?;
            }
        }
        Ok(())
    }

    fn create_panel(
        &mut self,
        index: usize,
        layout: PanelLayout,
        view: &Weak<RefCell<View>>,
    ) -> Result<(), JsValue> {
        let Some(generation) = self.generation() else {
            return Ok(());
        };
        let exit_ms = self
            .host
            .scene()
            .map(|s| s.settings().panel_exit_ms)
            .unwrap_or_default();
        let Some(Some(block_view)) = self.blocks.get_mut(index) else {
            return Ok(());
        };

        let element: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        element.set_class_name("link-element");
        element.set_text_content(Some(&layout.label));
        let style = element.style();
        style.set_property("position", "absolute")?;
        style.set_property("top", &px(layout.top))?;
        style.set_property("width", &px(layout.width))?;
        style.set_property("height", &px(layout.height))?;
        style.set_property("font-size", &px(layout.font_size))?;
        style.set_property("z-index", &layout.z_index.to_string())?;
        style.set_property("transform", HIDDEN_PANEL)?;
        style.set_property("transition", &format!("transform {exit_ms}ms ease-out"))?;

        let listeners = vec![
            hover_listener(view, index, generation, HoverTarget::Panel, true),
            hover_listener(view, index, generation, HoverTarget::Panel, false),
            click_listener(view, index, generation),
        ];
        element.add_event_listener_with_callback("mouseenter", listeners[0].as_ref().unchecked_ref())?;
        element.add_event_listener_with_callback("mouseleave", listeners[1].as_ref().unchecked_ref())?;
        element.add_event_listener_with_callback("click", listeners[2].as_ref().unchecked_ref())?;

        match layout.direction {
            SlideDirection::WithinBlock => {
                style.set_property("right", "0")?;
                block_view.element.style().set_property("overflow", "hidden")?;
                block_view.element.append_child(&element)?;
            }
            SlideDirection::BesideBlock => {
                style.set_property("left", &px(layout.left))?;
                self.container.append_child(&element)?;
            }
        }

        block_view.panel = Some(PanelView {
            element,
            _listeners: listeners,
        });
        Ok(())
    }

    fn slide_panel(&self, index: usize, transform: &str) -> Result<(), JsValue> {
        match self.block_view(index).and_then(|b| b.panel.as_ref()) {
            Some(panel) => panel.element.style().set_property("transform", transform),
            None => Ok(()),
        }
    }

    fn remove_panel(&mut self, index: usize) {
        if let Some(Some(block_view)) = self.blocks.get_mut(index) {
            if let Some(panel) = block_view.panel.take() {
                panel.element.remove();
            }
        }
    }

    fn apply_panel_commands(&mut self, commands: Vec<PanelCommand>, view: &Weak<RefCell<View>>) {
        for command in commands {
            let result = match command {
                PanelCommand::Create { block, layout } => self.create_panel(block, layout, view),
                PanelCommand::SlideIn { block } => self.slide_panel(block, SHOWN_PANEL),
                PanelCommand::SlideOut { block } => self.slide_panel(block, HIDDEN_PANEL),
                PanelCommand::Remove { block } => {
                    self.remove_panel(block);
                    Ok(())
                }
            };
            if let Err(e) = result {
                log::warn!("Panel update failed: {:?}", e);
            }
        }
    }
}

impl Drop for View {
    fn drop(&mut self) {
        self.teardown();
        if let Some(id) = self.resize_frame_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        if let Some(listener) = self.resize_listener.take() {
            let _ = self
                .window
                .remove_event_listener_with_callback("resize", listener.as_ref().unchecked_ref());
        }
        self.host.unmount();
    }
}

fn hover_listener(
    view: &Weak<RefCell<View>>,
    index: usize,
    generation: u64,
    target: HoverTarget,
    entering: bool,
) -> MouseListener {
    let view = view.clone();
    Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
        let Some(view) = view.upgrade() else {
            return;
        };
        {
            let Ok(mut v) = view.try_borrow_mut() else {
                return;
            };
            if v.generation() != Some(generation) {
                return;
            }
            let commands = if entering {
                v.host.pointer_enter(index, target, now())
            } else {
                v.host.pointer_leave(index, target, now());
                Vec::new()
            };
            v.apply_panel_commands(commands, &Rc::downgrade(&view));
        }
        arm_timer(&view);
    })
}

fn click_listener(view: &Weak<RefCell<View>>, index: usize, generation: u64) -> MouseListener {
    let view = view.clone();
    Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
        let Some(view) = view.upgrade() else {
            return;
        };
        let Ok(v) = view.try_borrow() else {
            return;
        };
        if v.generation() != Some(generation) {
            return;
        }
        if let Some(nav) = v.host.click_panel(index) {
            navigate(&v.window, &nav);
        }
    })
}

/// Arm a single wakeup for the earliest panel timer, replacing any earlier one
fn arm_timer(view: &Rc<RefCell<View>>) {
    let mut v = view.borrow_mut();
    if let Some(id) = v.timer_id.take() {
        v.window.clear_timeout_with_handle(id);
    }
    let Some(deadline) = v.host.next_timer_deadline() else {
        return;
    };
    let delay = (deadline - now()).max(0.0).ceil() as i32;
    let weak = Rc::downgrade(view);
    let callback = Closure::once_into_js(move || {
        if let Some(view) = weak.upgrade() {
            on_timer(&view);
        }
    });
    match v
        .window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
    {
        Ok(id) => v.timer_id = Some(id),
        Err(e) => log::error!("setTimeout failed: {:?}", e),
    }
}

fn on_timer(view: &Rc<RefCell<View>>) {
    {
        let mut v = view.borrow_mut();
        v.timer_id = None;
        let commands = v.host.advance_timers(now());
        v.apply_panel_commands(commands, &Rc::downgrade(view));
    }
    arm_timer(view);
}

fn schedule_frame(view: &Rc<RefCell<View>>, ticket: FrameTicket) {
    let weak = Rc::downgrade(view);
    let callback = Closure::once_into_js(move |_time: f64| {
        if let Some(view) = weak.upgrade() {
            on_frame(&view, ticket);
        }
    });
    let mut v = view.borrow_mut();
    match v.window.request_animation_frame(callback.unchecked_ref()) {
        Ok(id) => v.frame_id = Some(id),
        Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
    }
}

fn on_frame(view: &Rc<RefCell<View>>, ticket: FrameTicket) {
    let outcome = {
        let mut v = view.borrow_mut();
        v.frame_id = None;
        let outcome = v.host.frame(ticket);
        if outcome != TickOutcome::Stale {
            let events = v
                .host
                .scene_mut()
                .map(Scene::drain_events)
                .unwrap_or_default();
            let weak = Rc::downgrade(view);
            for event in events {
                let result = match event {
                    SceneEvent::Released { index } => v.create_block(index, &weak),
                    SceneEvent::Landed { index, .. } => v.settle_block(index),
                    SceneEvent::Completed => Ok(()),
                };
                if let Err(e) = result {
                    log::warn!("Block update failed: {:?}", e);
                }
            }
            if let Err(e) = v.render_falling() {
                log::warn!("Render failed: {:?}", e);
            }
        }
        outcome
    };
    if let TickOutcome::Continue(next) = outcome {
        schedule_frame(view, next);
    }
}

fn on_resize(view: &Rc<RefCell<View>>) {
    let needs_frame = {
        let Ok(mut v) = view.try_borrow_mut() else {
            return;
        };
        let (width, height) = viewport(&v.window);
        v.host.request_resize(width, height)
    };
    if !needs_frame {
        return;
    }
    let weak = Rc::downgrade(view);
    let callback = Closure::once_into_js(move |_time: f64| {
        if let Some(view) = weak.upgrade() {
            flush_resize(&view);
        }
    });
    let mut v = view.borrow_mut();
    match v.window.request_animation_frame(callback.unchecked_ref()) {
        Ok(id) => v.resize_frame_id = Some(id),
        Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
    }
}

fn flush_resize(view: &Rc<RefCell<View>>) {
    let ticket = {
        let mut v = view.borrow_mut();
        v.resize_frame_id = None;
        v.teardown();
        let ticket = v.host.flush_resize();
        if let Err(e) = v.apply_container_size() {
            log::warn!("Container resize failed: {:?}", e);
        }
        ticket
    };
    if let Some(ticket) = ticket {
        schedule_frame(view, ticket);
    }
}

/// Install the console logger and panic hook (idempotent)
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Falling-block scene mounted into a page element
#[wasm_bindgen]
pub struct FallingBlocks {
    view: Rc<RefCell<View>>,
}

#[wasm_bindgen]
impl FallingBlocks {
    /// Mount into the element with id `container_id` and start animating.
    /// `blocks_json` and `settings_json` fall back to the built-in defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_id: &str,
        blocks_json: Option<String>,
        settings_json: Option<String>,
    ) -> Result<FallingBlocks, JsValue> {
        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let document = window.document().ok_or_else(|| js_err("no document"))?;
        let container: HtmlElement = document
            .get_element_by_id(container_id)
            .ok_or_else(|| js_err(format!("no element #{container_id}")))?
            .dyn_into()?;

        let configs = match blocks_json {
            Some(json) => BlockConfig::list_from_json(&json).map_err(js_err)?,
            None => default_blocks(),
        };
        let settings = match settings_json {
            Some(json) => Settings::from_json(&json).map_err(js_err)?,
            None => Settings::default(),
        };

        let view = Rc::new(RefCell::new(View {
            host: SceneHost::new(),
            window: window.clone(),
            document,
            container,
            blocks: Vec::new(),
            frame_id: None,
            resize_frame_id: None,
            timer_id: None,
            resize_listener: None,
        }));

        let weak = Rc::downgrade(&view);
        let listener = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
            if let Some(view) = weak.upgrade() {
                on_resize(&view);
            }
        });
        window.add_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())?;

        let ticket = {
            let mut v = view.borrow_mut();
            v.resize_listener = Some(listener);
            let ticket = v
                .host
                .mount(configs, viewport(&window), settings, now() as u64);
            v.apply_container_size()?;
            ticket
        };
        if let Some(ticket) = ticket {
            schedule_frame(&view, ticket);
        }
        log::info!("Falling blocks mounted on #{}", container_id);
        Ok(Self { view })
    }

    /// Begin animating; no-op while already running
    pub fn start(&self) {
        let ticket = self.view.borrow_mut().host.start();
        if let Some(ticket) = ticket {
            schedule_frame(&self.view, ticket);
        }
    }

    /// Stop and remove every block, panel, frame and timer
    pub fn reset(&self) {
        let mut v = self.view.borrow_mut();
        v.teardown();
        if let Some(id) = v.resize_frame_id.take() {
            let _ = v.window.cancel_animation_frame(id);
        }
        v.host.reset();
    }

    #[wasm_bindgen(js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.view.borrow().host.is_animating()
    }
}

thread_local! {
    static AUTO_MOUNTED: RefCell<Option<FallingBlocks>> = const { RefCell::new(None) };
}

/// Mount with defaults on `container_id` if the page has it, keeping the
/// handle alive for the page's lifetime
pub fn auto_mount(container_id: &str) -> Result<(), JsValue> {
    let present = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(container_id))
        .is_some();
    if !present {
        log::info!("No #{} element; nothing to mount", container_id);
        return Ok(());
    }
    let blocks = FallingBlocks::new(container_id, None, None)?;
    AUTO_MOUNTED.with(|slot| *slot.borrow_mut() = Some(blocks));
    Ok(())
}
