//! Central HUD management
//!
//! Owns the shared tree handle, drives the three per-frame passes in
//! order, and exports the accessor surface other modules bootstrap
//! from. The host's per-tick clock calls [`HudManager::frame`] exactly
//! once per tick.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::HudConfig;
use crate::foundation::math::Vec2;
use crate::input::BindSource;
use crate::interop::{NodeAccessor, RegistrationHost, UnregisterFn};
use crate::space::CameraService;
use crate::tree::{export, DrawBackend, HudTree};

/// Top-level owner of the HUD tree and frame driver
pub struct HudManager {
    tree: Rc<RefCell<HudTree>>,
    frame_counter: u64,
}

impl HudManager {
    /// Create a manager with a fresh tree
    pub fn new(config: &HudConfig) -> Self {
        Self {
            tree: Rc::new(RefCell::new(HudTree::new(config))),
            frame_counter: 0,
        }
    }

    /// Shared handle to the tree, for provider-side element creation
    pub fn tree(&self) -> Rc<RefCell<HudTree>> {
        self.tree.clone()
    }

    /// Inject the key-binding collaborator
    pub fn set_bind_source(&mut self, binds: Box<dyn BindSource>) {
        self.tree.borrow_mut().set_bind_source(binds);
    }

    /// Export the root accessor tuple
    pub fn root_accessor(&self) -> NodeAccessor {
        export::export_root(&self.tree)
    }

    /// Build a registration host serving this tree's root
    ///
    /// `unregister` is handed to each successfully registered consumer;
    /// it should detach that consumer's subtree on teardown.
    pub fn registration_host(&self, unregister: UnregisterFn) -> RegistrationHost {
        RegistrationHost::new(self.root_accessor(), unregister)
    }

    /// Feed the cursor's screen position for the upcoming frame
    pub fn set_cursor_pos(&mut self, pos: Vec2) {
        self.tree.borrow_mut().cursor_mut().set_screen_pos(pos);
    }

    /// Frames driven so far
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    /// Run one tick: Layout, then Draw, then Input
    ///
    /// `refresh` requests a full layout rebuild, for resolution or
    /// scale changes.
    pub fn frame(
        &mut self,
        camera: &dyn CameraService,
        backend: &mut dyn DrawBackend,
        refresh: bool,
    ) {
        self.frame_counter += 1;
        let Ok(mut tree) = self.tree.try_borrow_mut() else {
            // A pending accessor call still holds the tree; skip the
            // tick rather than fault
            log::warn!("Frame {} skipped: tree busy", self.frame_counter);
            return;
        };
        tree.layout(camera, refresh);
        tree.draw(backend);
        tree.handle_input();
    }
}
