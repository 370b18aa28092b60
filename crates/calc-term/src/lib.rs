#![forbid(unsafe_code)]

//! Terminal front end for the calculator engine.
//!
//! Plays the key-source and display roles around [`calc_engine::Engine`]:
//! an interactive raw-mode panel, plus a script runner that drives the
//! engine on a virtual clock and prints the resulting display.

pub mod cli;
pub mod logging;
pub mod render;
pub mod script;
pub mod terminal;
