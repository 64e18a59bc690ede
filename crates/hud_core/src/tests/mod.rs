//! Whole-framework scenarios driving the manager frame loop
//!
//! Unit tests live next to their modules; these cross module seams the
//! way an embedding host and a consumer module would.

mod end_to_end;
