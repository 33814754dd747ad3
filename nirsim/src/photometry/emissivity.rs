//! Emissivity models for grey-body and tabulated emitters

use thiserror::Error;

/// Errors that can occur when building an emissivity model
#[derive(Debug, Error)]
pub enum EmissivityError {
    #[error("Wavelength and emissivity vectors must have the same length")]
    LengthMismatch,

    #[error("Wavelengths must be in ascending order")]
    NotAscending,

    #[error("Emissivity values must be between 0.0 and 1.0")]
    OutOfRange,
}

/// Emissivity of a radiating surface, either grey or wavelength-dependent.
///
/// A grey body is described by a single scalar; the atmosphere is described
/// by a tabulated curve derived from a measured transmission spectrum
/// (ε(λ) = 1 − T(λ)). Radiometric integrals dispatch on the variant once at
/// entry, so a constant emissivity costs nothing per sample.
#[derive(Debug, Clone)]
pub enum Emissivity {
    /// Wavelength-independent (grey body) emissivity
    Constant(f64),
    /// Linearly interpolated table of (wavelength [m], emissivity) samples
    Tabulated {
        wavelengths_m: Vec<f64>,
        values: Vec<f64>,
    },
}

impl Emissivity {
    /// A grey-body emissivity.
    ///
    /// # Panics
    /// Panics when the value is outside [0, 1]; a constant emissivity is an
    /// instrument-table entry, so this is a programming error.
    pub fn constant(value: f64) -> Self {
        if !(0.0..=1.0).contains(&value) {
            panic!("Emissivity must be in [0, 1], got {}", value);
        }
        Emissivity::Constant(value)
    }

    /// Build a tabulated emissivity from explicit samples.
    ///
    /// Wavelengths must be strictly ascending, values in [0, 1].
    pub fn from_table(wavelengths_m: Vec<f64>, values: Vec<f64>) -> Result<Self, EmissivityError> {
        if wavelengths_m.len() != values.len() || wavelengths_m.len() < 2 {
            return Err(EmissivityError::LengthMismatch);
        }

        for i in 1..wavelengths_m.len() {
            if wavelengths_m[i] <= wavelengths_m[i - 1] {
                return Err(EmissivityError::NotAscending);
            }
        }

        for &value in &values {
            if !(0.0..=1.0).contains(&value) {
                return Err(EmissivityError::OutOfRange);
            }
        }

        Ok(Emissivity::Tabulated {
            wavelengths_m,
            values,
        })
    }

    /// Build an emissivity curve from a transmission table (ε = 1 − T).
    ///
    /// This is the usual way atmospheric emissivity enters: a tabulated sky
    /// transmission spectrum read by the caller, handed in as plain vectors.
    pub fn from_transmission_table(
        wavelengths_m: Vec<f64>,
        transmission: Vec<f64>,
    ) -> Result<Self, EmissivityError> {
        let values = transmission.iter().map(|t| 1.0 - t).collect();
        Self::from_table(wavelengths_m, values)
    }

    /// Evaluate the emissivity at a wavelength.
    ///
    /// Tabulated curves interpolate linearly between samples and clamp to the
    /// end values outside the tabulated range.
    pub fn at(&self, wavelength_m: f64) -> f64 {
        match self {
            Emissivity::Constant(value) => *value,
            Emissivity::Tabulated {
                wavelengths_m,
                values,
            } => {
                if wavelength_m <= wavelengths_m[0] {
                    return values[0];
                }
                if wavelength_m >= *wavelengths_m.last().unwrap() {
                    return *values.last().unwrap();
                }

                // Find the segment that contains the wavelength
                for i in 0..wavelengths_m.len() - 1 {
                    if wavelength_m >= wavelengths_m[i] && wavelength_m <= wavelengths_m[i + 1] {
                        let t = (wavelength_m - wavelengths_m[i])
                            / (wavelengths_m[i + 1] - wavelengths_m[i]);
                        return values[i] * (1.0 - t) + values[i + 1] * t;
                    }
                }

                // Should never reach here if input is in range
                unreachable!()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant() {
        let eps = Emissivity::constant(0.3);
        assert_eq!(eps.at(1.0e-6), 0.3);
        assert_eq!(eps.at(2.5e-6), 0.3);
    }

    #[test]
    fn test_tabulated_interpolation() {
        let eps =
            Emissivity::from_table(vec![1.0e-6, 2.0e-6, 3.0e-6], vec![0.0, 1.0, 0.5]).unwrap();

        assert_relative_eq!(eps.at(1.5e-6), 0.5, epsilon = 1e-12);
        assert_relative_eq!(eps.at(2.5e-6), 0.75, epsilon = 1e-12);

        // Clamped outside the table
        assert_eq!(eps.at(0.5e-6), 0.0);
        assert_eq!(eps.at(4.0e-6), 0.5);
    }

    #[test]
    fn test_from_transmission() {
        let eps =
            Emissivity::from_transmission_table(vec![1.0e-6, 2.0e-6], vec![0.9, 0.2]).unwrap();
        assert_relative_eq!(eps.at(1.0e-6), 0.1, epsilon = 1e-12);
        assert_relative_eq!(eps.at(2.0e-6), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_not_ascending() {
        let result = Emissivity::from_table(vec![2.0e-6, 1.0e-6], vec![0.1, 0.2]);
        assert!(matches!(result, Err(EmissivityError::NotAscending)));
    }

    #[test]
    fn test_out_of_range() {
        let result = Emissivity::from_table(vec![1.0e-6, 2.0e-6], vec![0.1, 1.2]);
        assert!(matches!(result, Err(EmissivityError::OutOfRange)));
    }

    #[test]
    #[should_panic]
    fn test_constant_out_of_range_panics() {
        Emissivity::constant(1.5);
    }
}
