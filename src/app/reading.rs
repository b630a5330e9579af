//! One SPS30 measurement as decoded from the bus.

/// Immutable value produced by the sensor per successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    /// Mass concentration PM1.0 [µg/m³]
    pub mass_pm1_0: f32,
    /// Mass concentration PM2.5 [µg/m³]
    pub mass_pm2_5: f32,
    /// Mass concentration PM4.0 [µg/m³]
    pub mass_pm4_0: f32,
    /// Mass concentration PM10 [µg/m³]
    pub mass_pm10: f32,
    /// Number concentration PM0.5 [#/cm³]
    pub number_pm0_5: f32,
    /// Number concentration PM1.0 [#/cm³]
    pub number_pm1_0: f32,
    /// Number concentration PM2.5 [#/cm³]
    pub number_pm2_5: f32,
    /// Number concentration PM4.0 [#/cm³]
    pub number_pm4_0: f32,
    /// Number concentration PM10 [#/cm³]
    pub number_pm10: f32,
    /// Typical particle size [µm]
    pub typical_particle_size: f32,
}

impl Reading {
    /// Build from the ten floats in SPS30 output order: four mass
    /// concentrations, five number concentrations, typical size.
    pub fn from_words(v: [f32; 10]) -> Self {
        Self {
            mass_pm1_0: v[0],
            mass_pm2_5: v[1],
            mass_pm4_0: v[2],
            mass_pm10: v[3],
            number_pm0_5: v[4],
            number_pm1_0: v[5],
            number_pm2_5: v[6],
            number_pm4_0: v[7],
            number_pm10: v[8],
            typical_particle_size: v[9],
        }
    }
}
