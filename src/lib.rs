//! Drag-and-drop organisation engine for the Le Chat Plus browser extension.
//!
//! This crate is compiled to WebAssembly and runs inside the extension's
//! content script. It owns the drag lifecycle for conversation references:
//! translating raw pointer events into a single drag state machine,
//! classifying what lies under the cursor, and resolving a release into
//! folder/standalone list mutations. The host JavaScript layer only wires DOM
//! events to the [`session::DragSession`] and applies the returned
//! [`session::Action`]s (classes, floating indicator, re-render).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | The drag actor: pointer lifecycle and emitted actions |
//! | [`controller`] | Per-source-kind element registries and drag origins |
//! | [`classify`] | Drop-target classification over a spatial index |
//! | [`resolve`] | Drop decision table and its execution |
//! | [`drag`] | Drag state record and its enums |
//! | [`store`] | Folders, folder lists, and the standalone list |
//! | [`storage`] | Key-value persistence backends |
//! | [`surface`] | Host surface capabilities (element info, hit candidates) |
//! | [`model`] | Persisted entity types |
//! | [`geom`] | Points and bounding boxes |
//! | [`config`] | Tunable drag settings |
//! | [`consts`] | Shared constants (threshold, class hooks, storage keys) |

pub mod classify;
pub mod config;
pub mod consts;
pub mod controller;
pub mod drag;
pub mod geom;
pub mod model;
pub mod resolve;
pub mod session;
pub mod storage;
pub mod store;
pub mod surface;
