//! # seqview - Terminal Sequence Viewer
//!
//! Displays a single biological sequence with layered highlights and a
//! mouse-driven selection, using ratatui.
//!
//! ## Architecture
//!
//! The compositing engine knows nothing about terminals:
//! - `store`: highlights (kept in insertion order) and the current selection
//! - `compositor`: turns state changes into minimal repaint instructions
//! - `selection`: press/drag/release state machine for range selection
//! - `component`: the viewer, tying the above to a [`compositor::Renderer`]
//!
//! Around it:
//! - `model`, `annotation`: sequences, ranges, styles and annotations
//! - `config`, `error`: configuration (TOML or defaults) and error types
//! - `layout`: FASTA/CODATA/RAW/PRIDE text layouts with hit testing
//! - `notify`: selection and annotation notifications
//! - `fasta`: reading the sequence to display
//!
//! And the terminal host:
//! - `ui`: the terminal renderer and ratatui rendering
//! - `state`, `event`: application state, commands and input mapping
//! - `controller`: the main loop
//! - `logging`: file logging with tracing

pub mod annotation;
pub mod component;
pub mod compositor;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod fasta;
pub mod layout;
pub mod logging;
pub mod model;
pub mod notify;
pub mod selection;
pub mod state;
pub mod store;
pub mod ui;
