//! Application side of the training log.
//!
//! A [`ClientContext`] is passed explicitly to every entry point. It holds
//! the [`AppStore`] (the single mutable state), the subscription registry
//! that keeps at most one live query per slot, local storage and the
//! document store handle. Every state mutation publishes a
//! [`StateEvent`](state::StateEvent); the render loop re-renders on each.

pub mod auth;
pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod render;
pub mod state;
pub mod storage;
pub mod subscription;
pub mod sync;

pub use config::ClientConfig;
pub use context::ClientContext;
pub use error::{ClientError, ClientResult};
pub use state::{AppState, AppStore, StateEvent, StateField};
