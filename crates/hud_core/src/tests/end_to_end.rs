use std::cell::Cell;
use std::rc::Rc;

use crate::config::HudConfig;
use crate::foundation::math::{Mat4, Vec2, Vec4};
use crate::input::HudCursor;
use crate::interop::{
    ChannelId, HasChildren, HasParent, LocalBus, NodeProxy, ParentChange, RegistrationClient,
};
use crate::space::FixedCamera;
use crate::text::{GlyphFormat, RichText};
use crate::tree::{DrawBackend, DrawContext, HudElement, InputContext};
use crate::{HudManager, NullBackend};

/// Widget that records the local-plane cursor position it was handed
struct CursorProbe {
    seen: Rc<Cell<Vec2>>,
}

impl HudElement for CursorProbe {
    fn handle_input(&mut self, ctx: &mut InputContext) {
        self.seen.set(ctx.cursor_pos);
    }
}

/// Widget that claims capture on its first input pass and records the
/// outcome
struct CaptureClaim {
    won: Rc<Cell<bool>>,
}

impl HudElement for CaptureClaim {
    fn handle_input(&mut self, ctx: &mut InputContext) {
        self.won.set(ctx.cursor.try_capture(ctx.token));
    }
}

/// Widget that queues one colored quad
struct QuadWidget {
    color: Vec4,
}

impl HudElement for QuadWidget {
    fn draw(&mut self, ctx: &mut DrawContext) {
        ctx.push_quad(Vec2::new(10.0, 10.0), self.color);
    }
}

/// Backend that records the red channel of every quad, in flush order
#[derive(Default)]
struct RecordingBackend {
    reds: Vec<f32>,
    frames: u32,
}

impl DrawBackend for RecordingBackend {
    fn begin_frame(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.frames += 1;
        Ok(())
    }

    fn draw_quad(
        &mut self,
        _plane_to_world: &Mat4,
        _size: Vec2,
        color: Vec4,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.reds.push(color.x);
        Ok(())
    }

    fn draw_text(
        &mut self,
        _plane_to_world: &Mat4,
        _text: &RichText,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

#[test]
fn test_scaled_space_remaps_cursor_across_frames() {
    let mut hud = HudManager::new(&HudConfig::default());
    let camera = FixedCamera::default();
    let mut backend = NullBackend;

    let seen = Rc::new(Cell::new(Vec2::zeros()));
    let (root, probe, scaled) = {
        let tree = hud.tree();
        let mut tree = tree.borrow_mut();
        let scaled = {
            let root_space = tree.spaces().root();
            tree.spaces_mut().add_scaled(root_space, 2.0)
        };
        let probe = tree.create_widget_element(
            Box::new(CursorProbe { seen: seen.clone() }),
            scaled,
        );
        let root = tree.root();
        tree.register_child(root, probe);
        (root, probe, scaled)
    };

    hud.set_cursor_pos(Vec2::new(100.0, 50.0));
    hud.frame(&camera, &mut backend, false);
    assert_eq!(seen.get(), Vec2::new(50.0, 25.0));

    // Dropping the factor back to 1.0 remaps the cursor without
    // touching the element's registration
    hud.tree().borrow_mut().spaces_mut().set_scale(scaled, 1.0);
    hud.frame(&camera, &mut backend, false);
    assert_eq!(seen.get(), Vec2::new(100.0, 50.0));
    assert_eq!(hud.tree().borrow().parent_of(probe), Some(root));
    assert_eq!(hud.frame_count(), 2);
}

#[test]
fn test_focused_element_wins_capture() {
    let mut hud = HudManager::new(&HudConfig::default());
    let camera = FixedCamera::default();
    let mut backend = NullBackend;

    let first_won = Rc::new(Cell::new(false));
    let second_won = Rc::new(Cell::new(false));
    let (first, second) = {
        let tree = hud.tree();
        let mut tree = tree.borrow_mut();
        let space = tree.spaces().root();
        let first = tree.create_widget_element(
            Box::new(CaptureClaim {
                won: first_won.clone(),
            }),
            space,
        );
        let second = tree.create_widget_element(
            Box::new(CaptureClaim {
                won: second_won.clone(),
            }),
            space,
        );
        let root = tree.root();
        tree.register_child(root, first);
        tree.register_child(root, second);
        (first, second)
    };

    // Input runs in reverse order: the last child is offered input
    // first and wins the exclusive capture slot
    hud.frame(&camera, &mut backend, false);
    assert!(second_won.get());
    assert!(!first_won.get());
    assert_eq!(hud.tree().borrow().cursor().captured(), Some(second));

    // Refocusing does not steal capture; the holder keeps it
    {
        let tree = hud.tree();
        let mut tree = tree.borrow_mut();
        let root = tree.root();
        tree.set_focus(root, first);
    }
    hud.frame(&camera, &mut backend, false);
    assert_eq!(hud.tree().borrow().cursor().captured(), Some(second));
    assert!(!first_won.get());
}

#[test]
fn test_draw_commands_flush_in_layer_order() {
    let mut hud = HudManager::new(&HudConfig::default());
    let camera = FixedCamera::default();
    let mut backend = RecordingBackend::default();

    {
        let tree = hud.tree();
        let mut tree = tree.borrow_mut();
        let space = tree.spaces().root();
        let front = tree.create_widget_element(
            Box::new(QuadWidget {
                color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            }),
            space,
        );
        let back = tree.create_widget_element(
            Box::new(QuadWidget {
                color: Vec4::new(0.0, 0.0, 1.0, 1.0),
            }),
            space,
        );
        let root = tree.root();
        // Registered front-first, but layer order must win at flush
        tree.register_child(root, front);
        tree.register_child(root, back);
        tree.set_z_offset(front, 2);
        tree.set_z_offset(back, -2);
    }

    hud.frame(&camera, &mut backend, false);
    assert_eq!(backend.frames, 1);
    assert_eq!(backend.reds, vec![0.0, 1.0]);
}

#[test]
fn test_consumer_composes_over_handshake() {
    let mut hud = HudManager::new(&HudConfig::default());
    let camera = FixedCamera::default();
    let mut backend = NullBackend;

    // Provider side: host the handshake for this tree
    let unregistered = Rc::new(Cell::new(false));
    let flag = unregistered.clone();
    let mut host = hud.registration_host(Rc::new(move || flag.set(true)));

    // Consumer side: bootstrap the root proxy over the bus
    let mut bus = LocalBus::new();
    let mut client = RegistrationClient::new(ChannelId(40));
    assert!(client.poll(&mut bus).is_none());
    host.service(&mut bus);
    let root = NodeProxy::new(client.poll(&mut bus).expect("handshake settles").clone());

    // The consumer attaches a provider-created label through the
    // generic surface alone
    let label_token = hud.tree().borrow_mut().create_element();
    let label_accessor = crate::tree::export::export_node(&hud.tree(), label_token);
    let mut label = NodeProxy::new(label_accessor.clone());
    assert!(!label.is_registered());

    root.add_child(&label_accessor);
    assert!(label.is_registered());
    assert_eq!(label.parent_token(), Some(root.identity()));

    // Reparent detection settles one poll after the change
    assert_eq!(
        label.poll_parent(),
        ParentChange::Changed(Some(root.identity()))
    );
    assert_eq!(label.poll_parent(), ParentChange::Unchanged);

    // Rich text round-trips through the tuple form
    label.set_text(&RichText::from_run("Score: 100", GlyphFormat::default()));
    assert_eq!(label.text().map(|t| t.to_string()), Some("Score: 100".into()));

    hud.frame(&camera, &mut backend, false);

    // Teardown runs the provider-supplied unregister function
    client.unregister();
    assert!(unregistered.get());
}

#[test]
fn test_frame_skips_while_accessor_holds_tree() {
    let mut hud = HudManager::new(&HudConfig::default());
    let camera = FixedCamera::default();
    let mut backend = NullBackend;

    // Simulate a pending accessor call holding the tree mid-frame
    let tree = hud.tree();
    let guard = tree.borrow_mut();
    hud.frame(&camera, &mut backend, false);
    drop(guard);

    // The skipped tick still counts, and the next one runs normally
    assert_eq!(hud.frame_count(), 1);
    hud.frame(&camera, &mut backend, false);
    assert_eq!(hud.frame_count(), 2);
}

#[test]
fn test_destroying_capture_holder_frees_cursor() {
    let mut hud = HudManager::new(&HudConfig::default());
    let camera = FixedCamera::default();
    let mut backend = NullBackend;

    let won = Rc::new(Cell::new(false));
    let holder = {
        let tree = hud.tree();
        let mut tree = tree.borrow_mut();
        let space = tree.spaces().root();
        let holder =
            tree.create_widget_element(Box::new(CaptureClaim { won: won.clone() }), space);
        let root = tree.root();
        tree.register_child(root, holder);
        holder
    };

    hud.frame(&camera, &mut backend, false);
    assert!(hud.tree().borrow().cursor().is_capturing(holder));

    hud.tree().borrow_mut().destroy(holder);
    let cursor: HudCursor = hud.tree().borrow().cursor().clone();
    assert!(!cursor.is_captured());
}
