use studio_types::Material;

/// Physical material parameters derived from the reflectiveness slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectivenessParams {
    pub roughness: f64,
    pub metalness: f64,
    pub env_map_intensity: f64,
    pub clearcoat: f64,
    pub clearcoat_roughness: f64,
    pub reflectivity: f64,
    pub ior: f64,
}

impl ReflectivenessParams {
    /// Map a slider value (clamped to [0, 1]) onto material parameters.
    pub fn from_scalar(reflectiveness: f64) -> Self {
        let r = reflectiveness.clamp(0.0, 1.0);
        Self {
            roughness: 1.0 - 0.9 * r,
            metalness: 0.4 * r,
            env_map_intensity: 1.5 * r,
            clearcoat: 0.5 * r,
            clearcoat_roughness: 1.0 - r,
            reflectivity: 0.5 * r,
            ior: 1.33 + 0.2 * r,
        }
    }

    /// Overwrite the material's surface parameters. Clearcoat, reflectivity
    /// and ior only exist on physical materials.
    pub fn apply(&self, material: &mut Material) {
        material.roughness = self.roughness;
        material.metalness = self.metalness;
        material.env_map_intensity = self.env_map_intensity;
        if let Some(physical) = material.physical.as_mut() {
            physical.clearcoat = self.clearcoat;
            physical.clearcoat_roughness = self.clearcoat_roughness;
            physical.reflectivity = self.reflectivity;
            physical.ior = self.ior;
        }
    }
}
