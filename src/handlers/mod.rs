// handlers/mod.rs - HTTP handlers grouped by surface
//
// Public (no session needed) → Access API (/api/access/*) → Pages (redirect decisions)
pub mod access;
pub mod business;
pub mod pages;
pub mod public;
