//! Near-infrared filter bands and per-band instrument policy

use once_cell::sync::Lazy;

/// Identifier for the broadband near-infrared filters of the imager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandId {
    J,
    H,
    K,
}

impl BandId {
    /// All bands, in wavelength order
    pub const ALL: [BandId; 3] = [BandId::J, BandId::H, BandId::K];
}

impl std::fmt::Display for BandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BandId::J => write!(f, "J"),
            BandId::H => write!(f, "H"),
            BandId::K => write!(f, "K"),
        }
    }
}

/// Which sky-background model dominates in a band.
///
/// In the K band the background is continuum thermal emission from the sky
/// and the telescope itself; in J and H the OH airglow lines dominate, so an
/// empirical sky-brightness magnitude is the better estimate. This is a fixed
/// per-instrument policy, not something derived from the input data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyModel {
    /// Continuum-dominated: thermal sky plus thermal telescope emission
    ThermalContinuum,
    /// Line-dominated: empirical sky-brightness magnitude
    EmpiricalOh,
}

/// A broadband filter passband.
///
/// Wavelengths are in meters. Immutable once constructed.
#[derive(Debug, Clone, Copy)]
pub struct SpectralBand {
    pub id: BandId,
    /// Effective (pivot) wavelength in meters
    pub effective_wavelength_m: f64,
    /// Equivalent bandwidth in meters
    pub bandwidth_m: f64,
    /// Lower wavelength bound in meters
    pub wavelength_min_m: f64,
    /// Upper wavelength bound in meters
    pub wavelength_max_m: f64,
    /// Sky-background policy for this band
    pub sky_model: SkyModel,
}

impl SpectralBand {
    /// Create a new band definition.
    ///
    /// # Panics
    /// Panics when the bounds are not ordered `min < effective < max` or any
    /// value is non-finite. These are programming errors in an instrument
    /// table, so no Result is returned.
    pub fn new(
        id: BandId,
        effective_wavelength_m: f64,
        bandwidth_m: f64,
        wavelength_min_m: f64,
        wavelength_max_m: f64,
        sky_model: SkyModel,
    ) -> Self {
        for v in [
            effective_wavelength_m,
            bandwidth_m,
            wavelength_min_m,
            wavelength_max_m,
        ] {
            if !v.is_finite() || v <= 0.0 {
                panic!("Band {} has a non-finite or non-positive wavelength", id);
            }
        }
        if !(wavelength_min_m < effective_wavelength_m && effective_wavelength_m < wavelength_max_m)
        {
            panic!(
                "Band {} bounds must satisfy min < effective < max, got {} < {} < {}",
                id, wavelength_min_m, effective_wavelength_m, wavelength_max_m
            );
        }
        Self {
            id,
            effective_wavelength_m,
            bandwidth_m,
            wavelength_min_m,
            wavelength_max_m,
            sky_model,
        }
    }

    /// Width of the full passband window in meters
    pub fn window_width_m(&self) -> f64 {
        self.wavelength_max_m - self.wavelength_min_m
    }
}

/// A scalar quantity tabulated per band (sky brightness, zero points, ...).
#[derive(Debug, Clone, Copy)]
pub struct BandTable {
    pub j: f64,
    pub h: f64,
    pub k: f64,
}

impl BandTable {
    pub fn get(&self, band: BandId) -> f64 {
        match band {
            BandId::J => self.j,
            BandId::H => self.h,
            BandId::K => self.k,
        }
    }
}

/// J/H/K filter definitions for the imager.
///
/// K is flagged continuum-dominated; J and H are OH-line dominated.
pub static FILTER_BANDS: Lazy<[SpectralBand; 3]> = Lazy::new(|| {
    [
        SpectralBand::new(BandId::J, 1.25e-6, 0.16e-6, 1.17e-6, 1.33e-6, SkyModel::EmpiricalOh),
        SpectralBand::new(BandId::H, 1.635e-6, 0.29e-6, 1.49e-6, 1.78e-6, SkyModel::EmpiricalOh),
        SpectralBand::new(
            BandId::K,
            2.20e-6,
            0.34e-6,
            2.03e-6,
            2.37e-6,
            SkyModel::ThermalContinuum,
        ),
    ]
});

/// Look up a filter definition by identifier.
pub fn filter_band(id: BandId) -> &'static SpectralBand {
    FILTER_BANDS
        .iter()
        .find(|b| b.id == id)
        .expect("filter table covers every BandId")
}
