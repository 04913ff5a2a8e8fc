// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Rendering of instants as text under a session-scoped output format.
//!
//! Formatting is a pure projection: it reads an instant and never changes it.

mod render;
mod state;
mod template;

pub use render::render;
pub use state::{OutputFormatState, SessionFormatConfig};
pub use template::FormatTemplate;
