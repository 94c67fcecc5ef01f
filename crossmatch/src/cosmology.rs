//! Flat ΛCDM distance scale.
//!
//! Converts an event redshift into the projected physical scale
//! (kpc per arcsecond) used to turn angular separations into proper
//! transverse distances. The parameter set matches the WMAP nine-year
//! results the survey analysis was calibrated against; swapping parameters
//! changes the policy, not the math.

/// Speed of light in km/s.
const C_KM_S: f64 = 299_792.458;

/// Kiloparsecs per megaparsec.
const KPC_PER_MPC: f64 = 1.0e3;

/// One arcsecond in radians.
const ARCSEC_IN_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Integration steps for the comoving-distance integral. Even, so Simpson's
/// rule applies cleanly; at z <= 0.1 this is far below float noise.
const INTEGRATION_STEPS: usize = 1024;

/// A flat ΛCDM cosmological model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cosmology {
    /// Hubble constant in km/s/Mpc.
    pub h0_km_s_mpc: f64,
    /// Matter density parameter; dark energy takes the flat-universe rest.
    pub omega_m: f64,
}

/// WMAP nine-year parameter set.
pub const WMAP9: Cosmology = Cosmology {
    h0_km_s_mpc: 69.32,
    omega_m: 0.2865,
};

impl Cosmology {
    fn omega_lambda(&self) -> f64 {
        1.0 - self.omega_m
    }

    /// Hubble distance c/H0 in Mpc.
    fn hubble_distance_mpc(&self) -> f64 {
        C_KM_S / self.h0_km_s_mpc
    }

    /// Dimensionless inverse Hubble function 1/E(z).
    fn inv_e(&self, z: f64) -> f64 {
        let a = 1.0 + z;
        1.0 / (self.omega_m * a * a * a + self.omega_lambda()).sqrt()
    }

    /// Line-of-sight comoving distance to redshift `z`, in Mpc.
    ///
    /// Simpson's rule over 1/E(z); the integrand is smooth and slowly
    /// varying over the survey's redshift range.
    pub fn comoving_distance_mpc(&self, z: f64) -> f64 {
        let h = z / INTEGRATION_STEPS as f64;
        let mut sum = self.inv_e(0.0) + self.inv_e(z);
        for i in 1..INTEGRATION_STEPS {
            let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
            sum += weight * self.inv_e(h * i as f64);
        }
        self.hubble_distance_mpc() * sum * h / 3.0
    }

    /// Angular diameter distance to redshift `z`, in Mpc (flat universe).
    pub fn angular_diameter_distance_mpc(&self, z: f64) -> f64 {
        self.comoving_distance_mpc(z) / (1.0 + z)
    }

    /// Proper transverse distance subtended by one arcsecond at redshift
    /// `z`, in kpc.
    ///
    /// Fails softly: a non-positive or non-finite redshift yields 0.0, the
    /// "cannot compute physical distance" sentinel. Callers must treat a
    /// non-positive scale as undefined and fall back to angular-only logic.
    pub fn kpc_per_arcsec(&self, z: f64) -> f64 {
        if !z.is_finite() || z <= 0.0 {
            return 0.0;
        }
        self.angular_diameter_distance_mpc(z) * KPC_PER_MPC * ARCSEC_IN_RAD
    }

    /// Angular radius, in arcseconds, that subtends `target_kpc` at
    /// redshift `z`, capped at `cap_arcsec`.
    ///
    /// The cap also covers the degenerate case of an undefined distance
    /// scale, where no finite radius subtends the target.
    pub fn search_radius_arcsec(&self, z: f64, target_kpc: f64, cap_arcsec: f64) -> f64 {
        let scale = self.kpc_per_arcsec(z);
        if scale <= 0.0 {
            return cap_arcsec;
        }
        (target_kpc / scale).min(cap_arcsec)
    }
}

impl Default for Cosmology {
    fn default() -> Self {
        WMAP9
    }
}
