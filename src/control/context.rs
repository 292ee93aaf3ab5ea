use super::config_event::ConfigEvent;
use crate::flap::{FlapAdvisor, FlapTableError};
use crate::polar::PolarModel;
use crate::setup::legacy::LegacyStore;
use crate::setup::{AdvisorTuning, SetupStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handles to the configuration store and both advisory models.
///
/// Whenever both models are locked the polar model is locked first.
#[derive(Clone)]
pub struct AdvisorContext {
    /// The configuration store both models read from.
    store: Arc<dyn SetupStore>,
    /// The polar and speed-to-fly model.
    polar: Arc<RwLock<PolarModel>>,
    /// The flap table and flap advisory.
    flaps: Arc<RwLock<FlapAdvisor>>,
}

impl AdvisorContext {
    /// Creates both models from `store` and brings them up to date.
    ///
    /// # Arguments
    /// - `store`: The configuration store.
    /// - `tuning`: Tuning constants shared by both models.
    /// - `legacy`: Old flat flap settings, migrated once if the store has no flap table.
    ///
    /// # Returns
    /// A context with a fitted polar and a prepared flap table for the stored ballast.
    pub fn new(
        store: Arc<dyn SetupStore>,
        tuning: AdvisorTuning,
        legacy: Option<&dyn LegacyStore>,
    ) -> Self {
        let mut polar = PolarModel::new(Arc::clone(&store), tuning);
        polar.begin();
        let flaps = FlapAdvisor::new(Arc::clone(&store), tuning, legacy);
        Self {
            store,
            polar: Arc::new(RwLock::new(polar)),
            flaps: Arc::new(RwLock::new(flaps)),
        }
    }

    pub fn store(&self) -> Arc<dyn SetupStore> { Arc::clone(&self.store) }

    pub fn polar(&self) -> Arc<RwLock<PolarModel>> { Arc::clone(&self.polar) }

    pub fn flaps(&self) -> Arc<RwLock<FlapAdvisor>> { Arc::clone(&self.flaps) }

    /// Writes `event` to the store and updates the affected models.
    ///
    /// Mass changes refit the polar and rebuild the flap table under both locks, so a
    /// reader never sees a polar and a flap table prepared for different ballast.
    ///
    /// # Errors
    /// Rejected flap table mutations, the store is left unchanged in that case.
    pub async fn apply(&self, event: ConfigEvent) -> Result<(), FlapTableError> {
        match event {
            ConfigEvent::Ballast { kg } => self.store.set_ballast_kg(kg),
            ConfigEvent::Crew { kg } => self.store.set_crew_weight(kg),
            ConfigEvent::Bugs { pct } => {
                self.store.set_bugs_pct(pct);
                self.polar.write().await.modify_polar();
            }
            ConfigEvent::Mc { value } => {
                self.store.set_mc(value);
                self.polar.write().await.change_mc();
            }
            ConfigEvent::PolarPoints(points) => {
                self.store.set_polar_points(points);
                self.polar.write().await.modify_polar();
            }
            ConfigEvent::Polar(polar) => self.polar.write().await.set_polar(&polar),
            ConfigEvent::AddLevel(level) => self.flaps.write().await.add_level(level)?,
            ConfigEvent::RemoveLevel(idx) => {
                self.flaps.write().await.remove_level(idx)?;
            }
            ConfigEvent::EditLevel { idx, edit } => self.flaps.write().await.edit_level(idx, edit)?,
            ConfigEvent::ReloadLevels => self.flaps.write().await.reload_levels(),
        }
        if event.changes_mass() {
            self.change_ballast().await;
        }
        Ok(())
    }

    /// Recomputes the overweight, refits the polar and rebuilds the flap table.
    pub async fn change_ballast(&self) {
        let mut polar = self.polar.write().await;
        let mut flaps = self.flaps.write().await;
        polar.change_ballast();
        flaps.rebuild_derived_state();
    }
}
