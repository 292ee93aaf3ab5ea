use super::coefficients::PolarCoefficients;
use super::mass;
use super::polar_points::GliderPolar;
use crate::common::math::{clamp_or_bound, floor_g_load, kmh_to_ms, loading_factor, ms_to_kmh, KMH_PER_MS};
use crate::setup::{AdvisorTuning, SetupStore};
use crate::{conf, event, info, log};
use std::sync::Arc;

/// Below this airspeed (m/s) the drag coefficient estimate is not meaningful.
const MIN_CW_SPEED: f32 = 14.0;

/// Polar based performance model.
///
/// Holds the corrected polar coefficients and everything derived from them. All
/// configuration is read from the [`SetupStore`] when one of the `change_*` /
/// `modify_polar` entry points runs, in between the model is a pure function of the
/// live G-load it is fed.
pub struct PolarModel {
    store: Arc<dyn SetupStore>,
    tuning: AdvisorTuning,
    coeffs: PolarCoefficients,
    /// Overweight in percent the coefficients were fitted for.
    ballast_pct: f32,
    /// Last raw vertical acceleration in g.
    accel_z: f32,
    min_sink_speed: f32,
    min_sink: f32,
    circling_speed: f32,
    circling_sink: f32,
    stall_speed_ms: f32,
}

impl PolarModel {
    pub fn new(store: Arc<dyn SetupStore>, tuning: AdvisorTuning) -> Self {
        Self {
            store,
            tuning,
            coeffs: PolarCoefficients::default(),
            ballast_pct: 0.0,
            accel_z: 1.0,
            min_sink_speed: 0.0,
            min_sink: 0.0,
            circling_speed: 0.0,
            circling_sink: 0.0,
            stall_speed_ms: 0.0,
        }
    }

    /// Startup initialisation once the configuration is loaded.
    pub fn begin(&mut self) {
        if self.store.empty_weight() <= 0.0 {
            let empty = mass::default_empty_weight(self.store.wingload(), self.store.wingarea());
            self.store.set_empty_weight(empty);
        }
        self.change_ballast();
    }

    pub fn coefficients(&self) -> PolarCoefficients { self.coeffs }
    pub fn ballast_pct(&self) -> f32 { self.ballast_pct }
    pub fn min_sink_speed(&self) -> f32 { self.min_sink_speed }
    pub fn min_sink(&self) -> f32 { self.min_sink }
    pub fn circling_speed(&self) -> f32 { self.circling_speed }
    pub fn circling_sink(&self) -> f32 { self.circling_sink }
    pub fn stall_speed_ms(&self) -> f32 { self.stall_speed_ms }

    pub fn is_valid(&self) -> bool { self.coeffs.is_valid() }

    /// Feeds the latest vertical acceleration in g.
    pub fn set_g_load(&mut self, accel_z: f32) { self.accel_z = accel_z; }

    /// Current load factor, never below 0.3 g.
    pub fn current_g_load(&self) -> f32 { floor_g_load(self.accel_z) }

    /// Refits the polar from the stored points and updates the derived speeds.
    pub fn modify_polar(&mut self) {
        self.recalculate_polar();
        self.recalc_sink_and_speeds();
    }

    /// Refits the coefficients for the current ballast and bug setting.
    pub fn recalculate_polar(&mut self) {
        let bugs = self.store.bugs_pct();
        self.coeffs = PolarCoefficients::fit(&self.store.polar_points(), self.ballast_pct, bugs);
        info!(
            "Polar bugs: {bugs:.0}% ballast: {:.1}% a0={:.4} a1={:.4} a2={:.6}",
            self.ballast_pct,
            self.coeffs.a0(),
            self.coeffs.a1(),
            self.coeffs.a2()
        );
    }

    /// Recomputes the gross weight and overweight from the stored masses.
    pub fn calculate_overweight(&mut self) {
        let gross = mass::gross_weight(
            self.store.empty_weight(),
            self.store.crew_weight(),
            self.store.ballast_kg(),
        );
        self.store.set_gross_weight(gross);
        self.ballast_pct = mass::overweight_pct(gross, self.store.wingload(), self.store.wingarea());
        self.store.set_ballast_pct(self.ballast_pct);
        info!("New ballast overweight: {:.2}%", self.ballast_pct);
    }

    /// Full recomputation after any mass change. The flap table must be rebuilt afterwards.
    pub fn change_ballast(&mut self) {
        log!(
            "Empty weight {:.1} kg, crew {:.1} kg, water {:.1} kg of max {:.0} l",
            self.store.empty_weight(),
            self.store.crew_weight(),
            self.store.ballast_kg(),
            mass::effective_max_ballast(self.store.max_ballast())
        );
        self.calculate_overweight();
        self.modify_polar();
    }

    /// Mc only affects the derived values shown to the pilot.
    pub fn change_mc(&mut self) {
        conf!("MC changed to {:.1}", self.store.mc());
        self.recalc_sink_and_speeds();
    }

    /// Replaces the stored polar and resets the values that follow from it.
    ///
    /// The stall speed is set to an estimate for the polar's wingload and the empty
    /// weight to the reference mass minus one pilot.
    pub fn set_polar(&mut self, polar: &GliderPolar) {
        conf!("Setting new polar, wingload {:.1} kg/m²", polar.wingload);
        self.store.set_polar_points(polar.points);
        self.store.set_wingload(polar.wingload);
        let stall_ms = mass::estimate_stall_speed(polar.wingload);
        self.stall_speed_ms = stall_ms;
        self.store.set_stall_speed(ms_to_kmh(stall_ms));
        self.store.set_max_ballast(polar.max_ballast);
        self.store.set_wingarea(polar.wingarea);
        self.store.set_empty_weight(mass::default_empty_weight(polar.wingload, polar.wingarea));
        self.modify_polar();
    }

    /// Checks whether the stored polar matches `polar`.
    pub fn is_polar_equal_to(&self, polar: &GliderPolar) -> bool {
        let current = GliderPolar {
            points: self.store.polar_points(),
            wingload: self.store.wingload(),
            max_ballast: self.store.max_ballast(),
            wingarea: self.store.wingarea(),
        };
        current.approx_eq(polar)
    }

    /// G-load corrected speed in m/s, never below the stall speed.
    pub fn vn(&self, v: f32) -> f32 {
        let vn = v * self.current_g_load().sqrt();
        if vn > self.stall_speed_ms { vn } else { self.stall_speed_ms }
    }

    /// Sink rate at `v_kmh` for the current load factor, in m/s.
    ///
    /// # Returns
    /// - `0.0` near or below stall and for an invalid polar.
    pub fn sink(&self, v_kmh: f32) -> f32 {
        let v_stall = self.stall_speed_ms * KMH_PER_MS * self.tuning.stall_margin;
        if v_kmh < v_stall || !self.is_valid() || !v_kmh.is_finite() {
            return 0.0;
        }
        self.coeffs.sink_at(kmh_to_ms(v_kmh), self.current_g_load())
    }

    /// Sink over speed ratio at `v` m/s.
    pub fn cw(&self, v: f32) -> f32 {
        if v > MIN_CW_SPEED { self.sink(ms_to_kmh(v)) / v } else { 0.0 }
    }

    /// Speed-to-fly in km/h.
    ///
    /// # Arguments
    /// - `netto_vario`: Vertical air mass movement in m/s.
    /// - `circling`: Returns the circling speed when set.
    /// - `mc_value`: Expected climb in the next thermal, m/s.
    /// - `block_speed_mode`: Ignore `netto_vario`.
    /// - `v_max`: Upper clamp in km/h.
    ///
    /// # Returns
    /// - The speed clamped into `[min_sink_speed, v_max]`; NaN maps to the lower and
    ///   infinity to the upper bound.
    pub fn speed_to_fly(
        &self,
        netto_vario: f32,
        circling: bool,
        mc_value: f32,
        block_speed_mode: bool,
        v_max: f32,
    ) -> f32 {
        if circling {
            return self.circling_speed;
        }
        let a0 = self.coeffs.a0();
        let a2 = self.coeffs.a2();
        let stf = if block_speed_mode {
            KMH_PER_MS * ((a0 - mc_value) / a2).sqrt()
        } else {
            KMH_PER_MS * ((a0 - mc_value + netto_vario) / a2).sqrt()
        };
        let speed = clamp_or_bound(stf, self.min_sink_speed, v_max);
        event!("S2F {speed:.1} km/h, netto {netto_vario:.2} m/s, MC {mc_value:.1}");
        speed
    }

    /// [`Self::speed_to_fly`] with Mc, block mode and `v_max` taken from the store.
    pub fn speed(&self, netto_vario: f32, circling: bool) -> f32 {
        self.speed_to_fly(
            netto_vario,
            circling,
            self.store.mc(),
            self.store.block_speed(),
            self.store.v_max(),
        )
    }

    /// Recomputes minimum sink, circling values and the ballast corrected stall speed.
    pub fn recalc_sink_and_speeds(&mut self) {
        if !self.is_valid() {
            self.min_sink_speed = 0.0;
            self.min_sink = 0.0;
            self.circling_speed = 0.0;
            self.circling_sink = 0.0;
            self.stall_speed_ms = 0.0;
            return;
        }
        let lf = loading_factor(self.ballast_pct);
        self.stall_speed_ms = kmh_to_ms(self.store.stall_speed()) * lf.sqrt();
        self.min_sink_speed = ms_to_kmh(self.coeffs.vertex_speed());
        self.min_sink = self.sink(self.min_sink_speed);
        self.circling_speed = self.tuning.circling_factor * self.min_sink_speed;
        self.circling_sink = self.sink(self.circling_speed);

        info!("Airspeed @ min sink = {:.1} km/h", self.min_sink_speed);
        info!("          min sink  = {:.3} m/s", self.min_sink);
        info!("Circling speed      = {:.1} km/h", self.circling_speed);
        info!("Stall warn @        = {:.1} km/h", ms_to_kmh(self.stall_speed_ms));
    }
}
