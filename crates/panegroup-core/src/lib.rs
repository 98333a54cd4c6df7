#![forbid(unsafe_code)]

//! Core primitives for panegroup: units, animation, and frame scheduling.
//!
//! # Role in panegroup
//! `panegroup-core` holds the leaf types every other crate builds on:
//!
//! - **Unit model**: [`Unit`] / [`SizeExpr`] sizes with exact decimal math.
//! - **Animation**: [`animation::Tween`] and easing curves for collapse and
//!   expand transitions.
//! - **Frame scheduling**: the injectable [`frame::FrameScheduler`]
//!   capability and the host-side [`frame::FrameLoop`] batcher.
//! - **Cancellation**: tokens used to stop in-flight multi-frame work.
//!
//! The layout engine (`panegroup-layout`) and the event machine
//! (`panegroup-runtime`) sit on top of these.

pub mod animation;
pub mod cancellation;
pub mod frame;
pub mod unit;

pub use rust_decimal::Decimal;
pub use unit::{FILL_LITERAL, PIXEL_DECIMAL_PLACES, SizeExpr, Unit, UnitError, dynamic_space};
