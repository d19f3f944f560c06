//! Map canvas engine for a tabletop campaign companion.
//!
//! A map is an ink surface, a fog-of-war surface, a layered list of tokens
//! and a grid configuration, stored as a fenced JSON block inside a larger
//! text document. This crate owns the whole interaction model: translating
//! raw input events into map mutations, maintaining camera state for
//! pan/zoom, hit-testing tokens, building the frame as a display list, and
//! saving the map back into its document on a debounce.
//!
//! The engine itself never touches a browser or a filesystem. The `web`
//! feature adds a `<canvas>` backend; [`store::FsDocumentStore`] backs the
//! inspection binary.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EngineCore`]: routes events and returns [`engine::Action`]s |
//! | [`session`] | Engine plus save bridge; mutations schedule saves |
//! | [`doc`] | Persisted map types and the token store |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Tools, input event types and the gesture state machine |
//! | [`tools`] | Per-tool pointer behavior |
//! | [`surface`] | Stroke building, brush settings and compositing rules |
//! | [`hit`] | Token hit-testing and transform handles |
//! | [`grid`] | Square and hex grid geometry |
//! | [`measure`] | Two-click ruler |
//! | [`render`] | Backend-neutral display list |
//! | [`persist`] | Embedded map block parsing and rewriting |
//! | [`store`] | Document storage trait and implementations |
//! | [`bridge`] | Debounced, retrying save worker |
//! | [`config`] | Environment configuration |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants (zoom limits, layer buckets, sizes) |

pub mod bridge;
pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod grid;
pub mod hit;
pub mod input;
pub mod measure;
pub mod persist;
pub mod render;
pub mod session;
pub mod store;
pub mod surface;
pub mod tools;
#[cfg(feature = "web")]
pub mod web;
