//! # HUD Core
//!
//! Core of an in-process HUD framework that lets independently built
//! modules share a live, hierarchical set of on-screen elements without
//! sharing source types or binaries.
//!
//! ## Features
//!
//! - **Accessor Interop**: providers expose mutable object graphs as
//!   opaque tokens plus a fixed tuple of capability functions; consumers
//!   reconstruct typed views with zero shared class definitions
//! - **Element Tree**: dynamic parent-child scene graph with
//!   registration lifecycle, focus order, and per-frame Layout, Draw,
//!   and Input traversals
//! - **Space Nodes**: nested coordinate frames (screen-space,
//!   camera-relative, scaled, fully custom) composed once per frame in
//!   parent-to-child order
//! - **Cursor Arbiter**: exclusive, explicit pointer-capture ownership
//! - **Rich Text**: ordered formatted-run sequences that cross the
//!   interop boundary in tuple form
//!
//! ## Quick Start
//!
//! ```rust
//! use hud_core::prelude::*;
//!
//! let config = HudConfig::default();
//! let mut hud = HudManager::new(&config);
//! let camera = FixedCamera::default();
//! let mut backend = NullBackend;
//!
//! let label = hud.tree().borrow_mut().create_element();
//! let root = hud.tree().borrow().root();
//! hud.tree().borrow_mut().register_child(root, label);
//!
//! hud.frame(&camera, &mut backend, false);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod input;
pub mod interop;
pub mod space;
pub mod text;
pub mod tree;

mod manager;

pub use manager::HudManager;

use foundation::math::{Mat4, Vec2, Vec4};

/// Draw backend that discards everything, for headless hosts and docs
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl tree::DrawBackend for NullBackend {
    fn begin_frame(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn draw_quad(
        &mut self,
        _plane_to_world: &Mat4,
        _size: Vec2,
        _color: Vec4,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn draw_text(
        &mut self,
        _plane_to_world: &Mat4,
        _text: &text::RichText,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

/// Common imports for framework users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, HudConfig},
        foundation::math::{Mat4, Vec2, Vec3, Vec4},
        input::{BindAction, BindSource, HudCursor, NullBinds},
        interop::{
            ApiValue, HasChildren, HasParent, LocalBus, MemberCode, MessageBus, NodeAccessor,
            NodeProxy, NodeToken, ParentChange, RegistrationClient, RegistrationHost, TreeMember,
        },
        space::{CameraService, CameraSpaceParams, FixedCamera, SpaceGraph, SpaceKey},
        text::{FontStyle, GlyphFormat, RichText, TextAlignment},
        tree::{
            export::export_node, DrawBackend, DrawContext, HudElement, HudTree, InputContext,
            LayoutContext,
        },
        HudManager, NullBackend,
    };
}

#[cfg(test)]
mod tests;
