//! Live debug viewer for a multiplayer simulation's state stream.
//!
//! This crate is compiled to WebAssembly and runs in the browser, and is also
//! linked natively by the `wsviz` CLI. It owns the connection lifecycle, the
//! latest-frame store with room filtering, the pan/zoom/follow camera, and the
//! per-tick rendering of players, monsters, and projectiles. Hosts feed events
//! into [`engine::EngineCore`] and carry out the [`engine::Action`]s it returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Application context and its testable entry points |
//! | [`connection`] | Socket lifecycle and reconnect policy (no I/O) |
//! | [`store`] | Latest accepted frame and room selection |
//! | [`camera`] | World/screen transform and viewport |
//! | [`controller`] | Pan, zoom, follow, and reset-view over the camera |
//! | [`input`] | Drag gesture state, wheel deltas, layer toggles |
//! | [`render`] | Scene drawing onto a [`render::Surface`] |
//! | [`surface`] | [`render::Surface`] for the browser canvas |
//! | [`fps`] | Rendered-frames-per-second meter |
//! | [`config`] | Viewer settings and validation |
//! | [`consts`] | Defaults, colors, and sizes |
//! | `web` | Browser host (wasm32 only) |

pub mod camera;
pub mod config;
pub mod connection;
pub mod consts;
pub mod controller;
pub mod engine;
pub mod fps;
pub mod input;
pub mod render;
pub mod store;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub mod web;
