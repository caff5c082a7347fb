//! Skywatch - peer-attested sky observation registry
//!
//! Observers register a handle, submit observation records, and
//! cross-validate each other's records. Confirmation counts and honor
//! grants build a trust layer on top of raw submissions.
//!
//! ## Architecture
//!
//! - **Storage**: one SQLite database behind a single-writer lock; every
//!   mutating call is one transaction, so failures roll back completely.
//! - **Operation surface**: [`Registry`] exposes registration, submission,
//!   validation, and the honor catalog, plus read-only queries.
//! - **Achievement engine**: built-in activity thresholds grant honors;
//!   the admin-curated catalog holds descriptive honor metadata.
//! - **Events**: successful mutations broadcast [`RegistryEvent`]s for
//!   audit and cache listeners.
//!
//! ## Example
//!
//! ```
//! use skywatch::{ObservationInput, Registry};
//!
//! let registry = Registry::open_in_memory("admin")?;
//! registry.establish_observer_account("alice", "AstroWizard")?;
//!
//! let record_id = registry.submit_celestial_observation(
//!     "alice",
//!     ObservationInput {
//!         target: "Andromeda Galaxy".into(),
//!         category: "Galaxy".into(),
//!         ..Default::default()
//!     },
//! )?;
//!
//! registry.validate_celestial_record("bob", record_id)?;
//! assert!(registry.has_validated(record_id, "bob")?);
//! # Ok::<(), skywatch::RegistryError>(())
//! ```

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod events;
pub mod registry;

// Re-exports
pub use config::Config;
pub use db::honors::HonorType;
pub use db::observers::ObserverProfile;
pub use db::records::{ObservationInput, ObservationRecord};
pub use db::RegistryDb;
pub use error::RegistryError;
pub use events::{EventBus, RegistryEvent};
pub use registry::Registry;
