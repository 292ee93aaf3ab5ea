use crate::flap::{FlapLevel, LevelEdit};
use crate::polar::{GliderPolar, PolarPoints};
use strum_macros::{Display, VariantNames};

/// A configuration change requested by the user interface or a peer device.
///
/// Events are applied one at a time by [`super::Supervisor::run_config_hub`], which keeps
/// the store, the polar model and the flap table consistent with each other.
#[derive(Debug, Display, VariantNames, Clone, Copy, PartialEq)]
pub enum ConfigEvent {
    /// Water ballast in kg.
    Ballast { kg: f32 },
    /// Crew weight in kg.
    Crew { kg: f32 },
    /// Bug degradation in percent.
    Bugs { pct: f32 },
    Mc { value: f32 },
    PolarPoints(PolarPoints),
    Polar(GliderPolar),
    AddLevel(FlapLevel),
    RemoveLevel(usize),
    EditLevel { idx: usize, edit: LevelEdit },
    ReloadLevels,
}

impl ConfigEvent {
    /// Whether the event changes the glider mass and with it every ballast corrected value.
    pub fn changes_mass(&self) -> bool {
        matches!(self, Self::Ballast { .. } | Self::Crew { .. } | Self::Polar(_))
    }
}
