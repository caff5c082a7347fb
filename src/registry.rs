//! Registry operation surface
//!
//! Wraps the storage layer with the rules of the registry: parameter
//! bounds, the validation state machine, honor grants, and event emission.
//!
//! ## Call discipline
//!
//! Every mutating operation runs as one database transaction behind a
//! single-writer lock. A precondition failure aborts the whole call and
//! rolls back every write, counter bumps included, so no caller ever
//! observes partial state and failed calls never burn IDs.
//!
//! ## Caller identity
//!
//! The embedding environment passes a trusted caller identity into every
//! mutating call. The registry never authenticates it; it only compares it
//! against record submitters and the configured admin identity.
//!
//! ## Validation preconditions
//!
//! Checked in a fixed order so error precedence is deterministic:
//! record exists, then caller is not the submitter, then no prior mark.
//! Validating a nonexistent record reports the missing record even when the
//! caller submitted nothing.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::Config;
use crate::db::{self, honors, observers, records, stats, RegistryDb};
use crate::db::honors::HonorType;
use crate::db::observers::ObserverProfile;
use crate::db::records::{ObservationInput, ObservationRecord};
use crate::engine;
use crate::error::RegistryError;
use crate::events::{EventBus, RegistryEvent};

/// Field length maxima, fixed to cap storage growth
pub const MAX_HANDLE_LEN: usize = 32;
pub const MAX_TARGET_LEN: usize = 80;
pub const MAX_CATEGORY_LEN: usize = 32;
pub const MAX_COORDINATE_LEN: usize = 32;
pub const MAX_SITE_LEN: usize = 80;
pub const MAX_SKY_QUALITY_LEN: usize = 32;
pub const MAX_WEATHER_LEN: usize = 80;
pub const MAX_EQUIPMENT_LEN: usize = 80;
pub const MAX_NOTES_LEN: usize = 256;
pub const MAX_HONOR_FIELD_LEN: usize = 128;

/// Peer-attested observation registry
pub struct Registry {
    db: RegistryDb,
    events: Arc<EventBus>,
    admin_id: String,
}

impl Registry {
    /// Open or create the registry described by the config
    pub fn open(config: &Config) -> Result<Self, RegistryError> {
        let db = RegistryDb::open(&config.storage_dir)?;
        info!(admin_id = %config.admin_id, "Registry ready");
        Ok(Self {
            db,
            events: Arc::new(EventBus::new()),
            admin_id: config.admin_id.clone(),
        })
    }

    /// Open an in-memory registry (for testing)
    pub fn open_in_memory(admin_id: &str) -> Result<Self, RegistryError> {
        Ok(Self {
            db: RegistryDb::open_in_memory()?,
            events: Arc::new(EventBus::new()),
            admin_id: admin_id.to_string(),
        })
    }

    /// Event bus emitting one event per successful mutation
    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    /// Database statistics
    pub fn db_stats(&self) -> Result<db::DbStats, RegistryError> {
        self.db.stats()
    }

    // =========================================================================
    // Mutating Operations
    // =========================================================================

    /// Register a new observer, or update the handle of an existing one.
    ///
    /// First-ever registration grants the founding-member honor at honor
    /// index 0. Re-registration only replaces the handle; counters and
    /// honors are kept.
    pub fn establish_observer_account(
        &self,
        caller: &str,
        handle: &str,
    ) -> Result<bool, RegistryError> {
        check_len("handle", handle, MAX_HANDLE_LEN)?;
        if handle.is_empty() {
            return Err(RegistryError::BadParameters("handle must not be empty".into()));
        }

        let now = Utc::now().to_rfc3339();
        let mut founding = false;

        self.db.with_txn(|tx| {
            db::bump_counter(tx, "op_seq")?;
            if observers::exists(tx, caller)? {
                observers::update_handle(tx, caller, handle, &now)?;
            } else {
                observers::insert_observer(tx, caller, handle, &now)?;
                observers::grant_honor(tx, caller, engine::HONOR_FOUNDING_MEMBER, &now)?;
                founding = true;
            }
            Ok(())
        })?;

        info!(observer = caller, handle, founding, "Observer registered");
        self.events.emit(RegistryEvent::ObserverRegistered {
            observer: caller.to_string(),
            handle: handle.to_string(),
        });
        if founding {
            self.events.emit(RegistryEvent::HonorGranted {
                observer: caller.to_string(),
                honor_id: engine::HONOR_FOUNDING_MEMBER,
            });
        }

        Ok(true)
    }

    /// Submit an observation record and return its ID.
    ///
    /// Succeeds for unregistered identities too; the record is stored and
    /// category statistics advance, but no profile is created and no
    /// counters or honors accrue until the identity registers.
    pub fn submit_celestial_observation(
        &self,
        caller: &str,
        input: ObservationInput,
    ) -> Result<i64, RegistryError> {
        if input.target.is_empty() {
            return Err(RegistryError::BadParameters("target must not be empty".into()));
        }
        check_len("target", &input.target, MAX_TARGET_LEN)?;
        check_len("category", &input.category, MAX_CATEGORY_LEN)?;
        check_len("right_ascension", &input.right_ascension, MAX_COORDINATE_LEN)?;
        check_len("declination", &input.declination, MAX_COORDINATE_LEN)?;
        check_len("site", &input.site, MAX_SITE_LEN)?;
        check_len("sky_quality", &input.sky_quality, MAX_SKY_QUALITY_LEN)?;
        check_len("weather", &input.weather, MAX_WEATHER_LEN)?;
        check_len("equipment", &input.equipment, MAX_EQUIPMENT_LEN)?;
        check_len("notes", &input.notes, MAX_NOTES_LEN)?;

        let now = Utc::now().to_rfc3339();
        let mut granted = Vec::new();

        let record_id = self.db.with_txn(|tx| {
            let sequence = db::bump_counter(tx, "op_seq")?;
            let record_id = db::bump_counter(tx, "record_id")?;
            records::insert_record(tx, record_id, caller, &input, sequence, &now)?;
            stats::increment_category(tx, caller, &input.category)?;

            if observers::exists(tx, caller)? {
                observers::increment_submissions(tx, caller)?;
                granted = evaluate_honors(tx, caller, &now)?;
            }

            Ok(record_id)
        })?;

        info!(record_id, submitter = caller, category = %input.category, "Observation stored");
        self.events.emit(RegistryEvent::ObservationSubmitted {
            record_id,
            submitter: caller.to_string(),
            category: input.category.clone(),
        });
        self.emit_grants(caller, &granted);

        Ok(record_id)
    }

    /// Validate another observer's record.
    ///
    /// Moves the (record, caller) pair from unvalidated to validated, a
    /// one-way transition: a second call from the same validator is
    /// rejected, never absorbed.
    pub fn validate_celestial_record(
        &self,
        caller: &str,
        record_id: i64,
    ) -> Result<bool, RegistryError> {
        let now = Utc::now().to_rfc3339();
        let mut granted = Vec::new();

        let confirmations = self.db.with_txn(|tx| {
            db::bump_counter(tx, "op_seq")?;

            let record = records::get_record(tx, record_id)?
                .ok_or(RegistryError::InvalidRecord(record_id))?;
            if record.submitter == caller {
                return Err(RegistryError::SelfValidation(record_id));
            }
            if records::has_validation(tx, record_id, caller)? {
                return Err(RegistryError::DuplicateValidation {
                    record_id,
                    validator: caller.to_string(),
                });
            }

            records::insert_validation(tx, record_id, caller, &now)?;
            let confirmations = records::increment_confirmations(tx, record_id)?;

            if observers::exists(tx, caller)? {
                observers::increment_validations(tx, caller)?;
                granted = evaluate_honors(tx, caller, &now)?;
            }

            Ok(confirmations)
        })?;

        debug!(record_id, validator = caller, confirmations, "Record validated");
        self.events.emit(RegistryEvent::RecordValidated {
            record_id,
            validator: caller.to_string(),
            confirmations,
        });
        self.emit_grants(caller, &granted);

        Ok(true)
    }

    /// Create an honor type in the admin-curated catalog.
    ///
    /// Catalog entries are descriptive metadata; the achievement engine
    /// grants only its built-in threshold honors.
    pub fn establish_honor_type(
        &self,
        caller: &str,
        name: &str,
        description: &str,
        criteria: &str,
        rarity: &str,
    ) -> Result<i64, RegistryError> {
        if caller != self.admin_id {
            return Err(RegistryError::NotAuthorized(format!(
                "{} may not create honor types",
                caller
            )));
        }
        if name.is_empty() {
            return Err(RegistryError::BadParameters("name must not be empty".into()));
        }
        check_len("name", name, MAX_HONOR_FIELD_LEN)?;
        check_len("description", description, MAX_HONOR_FIELD_LEN)?;
        check_len("criteria", criteria, MAX_HONOR_FIELD_LEN)?;
        check_len("rarity", rarity, MAX_HONOR_FIELD_LEN)?;

        let now = Utc::now().to_rfc3339();

        let honor_type_id = self.db.with_txn(|tx| {
            db::bump_counter(tx, "op_seq")?;
            let id = db::bump_counter(tx, "honor_type_id")?;
            honors::insert_honor_type(tx, id, name, description, criteria, rarity, &now)?;
            Ok(id)
        })?;

        info!(honor_type_id, name, "Honor type created");
        self.events.emit(RegistryEvent::HonorTypeCreated {
            honor_type_id,
            name: name.to_string(),
        });

        Ok(honor_type_id)
    }

    // =========================================================================
    // Read-only Queries
    // =========================================================================

    /// Fetch an observer profile
    pub fn fetch_observer(&self, id: &str) -> Result<ObserverProfile, RegistryError> {
        self.db
            .with_conn(|conn| observers::get_observer(conn, id))?
            .ok_or_else(|| RegistryError::NotFound(format!("observer {}", id)))
    }

    /// Fetch the honor ID an observer holds at a list position
    pub fn fetch_observer_honor(&self, id: &str, idx: u32) -> Result<i64, RegistryError> {
        self.db
            .with_conn(|conn| observers::honor_at(conn, id, idx))?
            .ok_or_else(|| RegistryError::NotFound(format!("honor {} of observer {}", idx, id)))
    }

    /// Fetch an observation record
    pub fn fetch_record(&self, id: i64) -> Result<ObservationRecord, RegistryError> {
        self.db
            .with_conn(|conn| records::get_record(conn, id))?
            .ok_or_else(|| RegistryError::NotFound(format!("record {}", id)))
    }

    /// Submission count for (observer, category); 0 if absent
    pub fn fetch_category_stats(
        &self,
        observer: &str,
        category: &str,
    ) -> Result<u32, RegistryError> {
        self.db
            .with_conn(|conn| stats::category_count(conn, observer, category))
    }

    /// Fetch an honor type definition from the catalog
    pub fn fetch_honor_type(&self, id: i64) -> Result<HonorType, RegistryError> {
        self.db
            .with_conn(|conn| honors::get_honor_type(conn, id))?
            .ok_or_else(|| RegistryError::NotFound(format!("honor type {}", id)))
    }

    /// Whether this validator holds a mark on this record
    pub fn has_validated(&self, record_id: i64, validator: &str) -> Result<bool, RegistryError> {
        self.db
            .with_conn(|conn| records::has_validation(conn, record_id, validator))
    }

    fn emit_grants(&self, observer: &str, granted: &[i64]) {
        for &honor_id in granted {
            self.events.emit(RegistryEvent::HonorGranted {
                observer: observer.to_string(),
                honor_id,
            });
        }
    }
}

/// Run the achievement engine for an identity and persist any new grants.
/// Returns the granted honor IDs.
fn evaluate_honors(
    tx: &rusqlite::Transaction,
    id: &str,
    now: &str,
) -> Result<Vec<i64>, RegistryError> {
    let profile = observers::get_observer(tx, id)?
        .ok_or_else(|| RegistryError::Internal(format!("profile vanished for {}", id)))?;

    let earned = engine::newly_earned(
        profile.submission_count,
        profile.validation_count,
        &profile.honors,
    );
    for &honor_id in &earned {
        let idx = observers::grant_honor(tx, id, honor_id, now)?;
        debug!(observer = id, honor_id, idx, "Honor granted");
    }
    Ok(earned)
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), RegistryError> {
    if value.chars().count() > max {
        return Err(RegistryError::BadParameters(format!(
            "{} exceeds {} characters",
            field, max
        )));
    }
    Ok(())
}
