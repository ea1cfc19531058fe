// Copyright 2025 Cowboy AI, LLC.

//! Windowed metrics engine
//!
//! Two trailing windows are fed from the stream: order creations and payment
//! outcomes. Everything else here is derived from them, or from the order view
//! and event log, at a caller-supplied `now`. Identical inputs always produce
//! identical outputs.

pub mod exceptions;
pub mod kpis;
pub mod series;
pub mod window;

pub use exceptions::{compute_exceptions, ExceptionItem, ExceptionKind, Severity};
pub use kpis::{compute_kpis, start_of_utc_day, KpiSnapshot};
pub use series::{build_line_series, LinePoint, OutcomeSeries, SERIES_POINTS};
pub use window::{CreatedSample, OutcomeSample, SampleWindow, Timestamped, WindowMetrics};
