#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::many_single_char_names,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

use std::{
    collections::VecDeque,
    sync::{mpsc, Arc},
    time::{Duration, Instant},
};

use anyhow::{ensure, Context, Result};
use bytemuck::{Pod, Zeroable};
use clap::Parser;
use nalgebra as na;

#[macro_use]
extern crate log;

mod app;
mod camera;
mod color;
mod dispatch;
mod gfx;
mod img;
mod math;
mod scene;
mod tracer;

use camera::{Camera, Orbit};
use color::{ColorRgb, ColorRgba};
use img::RenderTarget;
use math::*;
use scene::{Scene, Sphere};
use tracer::Ray;

fn main() -> Result<()> {
    env_logger::init();
    app::run(app::Args::parse())
}
