//! View-state holders
//!
//! A holder owns a set of [`Observable`](crate::state::Observable) values and a
//! [`ViewModelScope`](crate::state::ViewModelScope). Trigger methods launch one
//! task each and return its handle; screens either await the handle or watch
//! the observables.

mod auth;
mod item;

pub use auth::{AuthState, AuthViewModel};
pub use item::ItemViewModel;
