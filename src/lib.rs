//! # Overview
//! A discrete event simulation of patients moving through a hospital.
//! Patients arrive, get sick, and are routed through optional lab, x-ray,
//! and treatment stages before seeing a doctor.
//!
//! This repository contains:
//!
//! * Input modeling, for specifying activity durations as random variables
//! and the probabilities of the routing decisions.
//! * Simulator engine, for executing runs over a time-ordered event queue
//! and publishing stage transitions to observers.
//! * Output analysis, for run-level results and confidence intervals across
//! replications.
//! * Controller, the configuration and results façade used by front-ends,
//! with a JS/WASM binding.
//!
//! The crate is compatible with a wide variety of compilation targets,
//! including WASM.
pub mod controller;
pub mod input_modeling;
pub mod output_analysis;
pub mod simulator;
pub mod utils;
