//! GovFlow document workflow engine.
//!
//! The core behind a document-routing system: documents move between
//! `pending`, `in-review`, `referred` and `completed`; referrals forward
//! them to users or departments; a role table decides who may do what; and
//! every mutation lands exactly one entry in the document's append-only
//! activity trail. UI, PDF handling, file transport and authentication are
//! external collaborators; they drive [`engine::Engine`] and implement
//! [`directory::Directory`].

pub mod config;
pub mod db;
pub mod directory;
pub mod engine;
pub mod models;
pub mod permissions;
pub mod workflow;

pub use engine::{Actor, Engine, EngineError};
