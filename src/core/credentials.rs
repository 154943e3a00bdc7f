//! Add, remove, and list passwords with restart coordination.
//!
//! Every mutation runs under the config lock as
//! load -> validate -> check service -> save -> restart-if-it-was-running.
//! Nothing is cached between operations; the document is re-read each time.

use crate::core::config_store::ConfigStore;
use crate::core::generator::{self, Generated};
use crate::core::service::{LifecycleReport, ServiceController, Supervisor};
use crate::error::{Result, ValidationFailure, ZimanError};
use crate::models::config_doc::ConfigDocument;
use crate::models::settings::PolicySection;
use serde::Serialize;

/// What happened to the service after a saved change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RestartOutcome {
    /// The service was active before the write and a restart was issued.
    Restarted { report: LifecycleReport },
    /// The service was not active, so it was left stopped.
    SkippedInactive,
    /// The service state could not be read; no restart was attempted.
    SkippedUnknown { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub credential: String,
    pub remaining: usize,
    pub restart: RestartOutcome,
}

pub struct CredentialManager<S> {
    store: ConfigStore,
    service: ServiceController<S>,
    policy: PolicySection,
}

impl<S: Supervisor> CredentialManager<S> {
    pub fn new(store: ConfigStore, service: ServiceController<S>, policy: PolicySection) -> Self {
        Self {
            store,
            service,
            policy,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn service(&self) -> &ServiceController<S> {
        &self.service
    }

    pub fn policy(&self) -> &PolicySection {
        &self.policy
    }

    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.store.load()?.credentials().to_vec())
    }

    /// Validate a candidate without touching disk.
    pub fn check_candidate(&self, candidate: &str, allow_weak: bool) -> Result<()> {
        if candidate.trim().is_empty() {
            return Err(ValidationFailure::Empty.into());
        }
        if !allow_weak && self.policy.is_weak(candidate) {
            return Err(ValidationFailure::TooShort {
                len: candidate.chars().count(),
                min: self.policy.min_password_length,
            }
            .into());
        }
        Ok(())
    }

    pub fn add(&self, candidate: &str, allow_weak: bool) -> Result<Change> {
        self.check_candidate(candidate, allow_weak)?;

        let _lock = self.store.lock()?;
        let mut doc = self.store.load()?;
        if doc.credentials().iter().any(|c| c == candidate) {
            return Err(ValidationFailure::Duplicate(candidate.to_string()).into());
        }
        doc.credentials_mut().push(candidate.to_string());
        let restart = self.commit(&doc)?;
        tracing::info!(total = doc.credentials().len(), "password added");
        Ok(Change {
            credential: candidate.to_string(),
            remaining: doc.credentials().len(),
            restart,
        })
    }

    /// Generate a password of (clamped) `length` and add it.
    pub fn add_generated(&self, length: usize) -> Result<(Generated, Change)> {
        let generated = generator::generate(length);
        if let Some(actual) = generated.clamped_to {
            tracing::info!(requested = length, actual, "generated length clamped");
        }
        let change = self.add(&generated.password, true)?;
        Ok((generated, change))
    }

    /// Remove the entry at 1-based `index` of a previously listed `snapshot`.
    ///
    /// The entry is matched by value against a fresh load, so an edit made
    /// between listing and removing never deletes the wrong password.
    pub fn remove(&self, index: usize, snapshot: &[String]) -> Result<Change> {
        if index == 0 || index > snapshot.len() {
            return Err(ZimanError::OutOfRange {
                index,
                len: snapshot.len(),
            });
        }
        let target = &snapshot[index - 1];

        let _lock = self.store.lock()?;
        let mut doc = self.store.load()?;
        let position = doc
            .credentials()
            .iter()
            .position(|c| c == target)
            .ok_or_else(|| ZimanError::StaleSelection {
                value: target.clone(),
            })?;
        doc.credentials_mut().remove(position);
        let restart = self.commit(&doc)?;
        tracing::info!(total = doc.credentials().len(), "password removed");
        Ok(Change {
            credential: target.clone(),
            remaining: doc.credentials().len(),
            restart,
        })
    }

    /// Save, then restart only if the service was active right before the
    /// write. A failed restart does not undo the save.
    fn commit(&self, doc: &ConfigDocument) -> Result<RestartOutcome> {
        let was_running = self.service.is_active();
        self.store.save(doc)?;
        let outcome = match was_running {
            Ok(true) => RestartOutcome::Restarted {
                report: self.service.restart(),
            },
            Ok(false) => {
                tracing::info!(unit = %self.service.unit(), "service inactive, restart skipped");
                RestartOutcome::SkippedInactive
            }
            Err(e) => {
                tracing::warn!(unit = %self.service.unit(), error = %e, "cannot read service state, restart skipped");
                RestartOutcome::SkippedUnknown {
                    reason: e.to_string(),
                }
            }
        };
        Ok(outcome)
    }
}
