//! Session gate and route guard built on the encrypted store.
//! The gate is the single accessor for "who is signed in, and as what".

pub mod balance;
pub mod gate;
pub mod guard;
pub mod routes;

pub use gate::{Navigator, RecordingNavigator, SessionGate, SESSION_KEY};
pub use guard::{AuthState, GuardDecision, RouteAccess};
