//! Headless HUD demo: a provider panel plus a consumer module
//!
//! Drives a few frames of the full stack without a window. The provider
//! builds a status panel with a draggable slider; a simulated consumer
//! module discovers the tree over the registration handshake and
//! attaches a score label using nothing but the accessor surface.

use std::cell::Cell;
use std::rc::Rc;

use hud_core::prelude::*;

const FRAMES: u64 = 6;
const SLIDER_WIDTH: f32 = 120.0;

/// Backend that logs draw calls instead of rendering
struct ConsoleBackend {
    quads: u32,
    texts: u32,
}

impl ConsoleBackend {
    fn new() -> Self {
        Self { quads: 0, texts: 0 }
    }
}

impl DrawBackend for ConsoleBackend {
    fn begin_frame(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.quads = 0;
        self.texts = 0;
        Ok(())
    }

    fn draw_quad(
        &mut self,
        _plane_to_world: &Mat4,
        size: Vec2,
        color: Vec4,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.quads += 1;
        log::debug!("quad {}x{} rgba({:.1},{:.1},{:.1},{:.1})", size.x, size.y, color.x, color.y, color.z, color.w);
        Ok(())
    }

    fn draw_text(
        &mut self,
        _plane_to_world: &Mat4,
        text: &RichText,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.texts += 1;
        log::debug!("text \"{}\"", text);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("frame drawn: {} quads, {} texts", self.quads, self.texts);
        Ok(())
    }
}

/// Background panel quad
struct Panel {
    size: Vec2,
}

impl HudElement for Panel {
    fn draw(&mut self, ctx: &mut DrawContext) {
        ctx.push_quad(self.size, Vec4::new(0.1, 0.1, 0.15, 0.9));
    }
}

/// Horizontal slider that captures the cursor while dragged
struct Slider {
    value: Rc<Cell<f32>>,
    dragging: bool,
}

impl HudElement for Slider {
    fn draw(&mut self, ctx: &mut DrawContext) {
        ctx.push_quad(Vec2::new(SLIDER_WIDTH, 8.0), Vec4::new(0.3, 0.3, 0.3, 1.0));
        ctx.push_quad(
            Vec2::new(SLIDER_WIDTH * self.value.get(), 8.0),
            Vec4::new(0.2, 0.8, 0.4, 1.0),
        );
    }

    fn handle_input(&mut self, ctx: &mut InputContext) {
        let over = ctx.cursor_pos.x >= 0.0 && ctx.cursor_pos.x <= SLIDER_WIDTH;
        if ctx.binds.is_held(BindAction::Select) && over {
            if ctx.cursor.try_capture(ctx.token) {
                self.dragging = true;
                self.value.set((ctx.cursor_pos.x / SLIDER_WIDTH).clamp(0.0, 1.0));
            }
        } else if self.dragging {
            ctx.cursor.try_release(ctx.token);
            self.dragging = false;
            log::info!("slider settled at {:.2}", self.value.get());
        }
    }
}

/// Label that re-queues its cached text every frame
struct Label;

impl HudElement for Label {
    fn draw(&mut self, ctx: &mut DrawContext) {
        if let Some(text) = ctx.text {
            ctx.push_text(text.clone());
        }
    }
}

/// Bind source scripted by the demo loop
#[derive(Default)]
struct ScriptedBinds {
    select_held: Cell<bool>,
}

impl BindSource for ScriptedBinds {
    fn is_pressed(&self, action: BindAction) -> bool {
        action == BindAction::Select && self.select_held.get()
    }

    fn is_held(&self, action: BindAction) -> bool {
        action == BindAction::Select && self.select_held.get()
    }
}

/// Consumer module: discovers the provider and attaches a score label
struct ScoreModule {
    client: RegistrationClient,
    label: Option<NodeProxy>,
    score: u32,
}

impl ScoreModule {
    fn new(reply_channel: u32) -> Self {
        Self {
            client: RegistrationClient::new(hud_core::interop::ChannelId(reply_channel)),
            label: None,
            score: 0,
        }
    }

    fn tick(&mut self, bus: &mut dyn MessageBus, hud: &HudManager) {
        if let Some(root) = self.client.poll(bus).cloned() {
            let root = NodeProxy::new(root);
            if self.label.is_none() {
                // First frame after registration: create and attach
                let token = {
                    let tree = hud.tree();
                    let mut tree = tree.borrow_mut();
                    let space = tree.spaces().root();
                    tree.create_widget_element(Box::new(Label), space)
                };
                let accessor = hud_core::tree::export::export_node(&hud.tree(), token);
                root.add_child(&accessor);
                root.set_focus(accessor.identity());
                self.label = Some(NodeProxy::new(accessor));
                log::info!("score module attached its label");
            }
        } else if self.client.is_failed() {
            return;
        }

        if let Some(label) = &mut self.label {
            if label.poll_parent() == ParentChange::Changed(None) {
                log::warn!("score label was orphaned, module going dormant");
                self.label = None;
                return;
            }
            self.score += 25;
            let mut text = RichText::from_run(
                "Score: ",
                GlyphFormat::default().style(FontStyle::BOLD),
            );
            text.add_str(self.score.to_string());
            label.set_text(&text);
        }
    }
}

fn main() {
    env_logger::init();

    let config = HudConfig::default();
    let mut hud = HudManager::new(&config);
    let camera = FixedCamera::default();
    let mut backend = ConsoleBackend::new();

    let binds = Rc::new(ScriptedBinds::default());
    hud.set_bind_source(Box::new(SharedBinds(binds.clone())));

    // Provider panel in a scaled frame so the whole HUD can shrink
    let slider_value = Rc::new(Cell::new(0.5));
    {
        let tree = hud.tree();
        let mut tree = tree.borrow_mut();
        let root_space = tree.spaces().root();
        let hud_space = tree.spaces_mut().add_scaled(root_space, 1.0);

        let panel = tree.create_widget_element(
            Box::new(Panel {
                size: Vec2::new(200.0, 80.0),
            }),
            hud_space,
        );
        let slider = tree.create_widget_element(
            Box::new(Slider {
                value: slider_value.clone(),
                dragging: false,
            }),
            hud_space,
        );
        let root = tree.root();
        tree.register_child(root, panel);
        tree.register_child(panel, slider);
        tree.set_z_offset(panel, -1);
    }

    // Handshake plumbing between provider and consumer
    let mut bus = LocalBus::new();
    let mut host = hud.registration_host(Rc::new(|| log::info!("consumer unregistered")));
    host.announce(&mut bus);
    let mut score_module = ScoreModule::new(7);

    for frame in 0..FRAMES {
        // Scripted input: drag the slider during the middle frames
        binds.select_held.set((2..4).contains(&frame));
        hud.set_cursor_pos(Vec2::new(30.0 + 20.0 * frame as f32, 12.0));

        host.service(&mut bus);
        score_module.tick(&mut bus, &hud);

        hud.frame(&camera, &mut backend, frame == 0);
    }

    log::info!(
        "done after {} frames, slider at {:.2}, score at {}",
        hud.frame_count(),
        slider_value.get(),
        score_module.score
    );
}

/// Adapter so the scripted binds can be shared with the demo loop
struct SharedBinds(Rc<ScriptedBinds>);

impl BindSource for SharedBinds {
    fn is_pressed(&self, action: BindAction) -> bool {
        self.0.is_pressed(action)
    }

    fn is_held(&self, action: BindAction) -> bool {
        self.0.is_held(action)
    }
}
