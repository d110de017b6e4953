//! Live-tunable gallery parameters.
//!
//! A `ControlSettings` is a flat, ordered mapping of named numeric parameters.
//! Each parameter carries the min/max/step its range input uses; `set` clamps
//! to that range and nothing else validates values. Settings are read by the
//! per-frame updater every tick, so a change is visible on the next frame.

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Static description of one tunable parameter.
#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    /// Key as shown in the panel and in the exported JSON.
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
}

impl ParamSpec {
    const fn new(name: &'static str, min: f32, max: f32, step: f32, default: f32) -> Self {
        Self { name, min, max, step, default }
    }
}

#[derive(Clone, Debug)]
struct Param {
    spec: ParamSpec,
    value: f32,
}

/// Ordered set of live parameters for one gallery instance.
#[derive(Clone, Debug, Default)]
pub struct ControlSettings {
    params: Vec<Param>,
}

const STACK_SPECS: &[ParamSpec] = &[
    ParamSpec::new("spacing", -5.0, 10.0, 0.1, 1.0),
    ParamSpec::new("yOffset", -5.0, 10.0, 0.1, 1.0),
    ParamSpec::new("xRotation", -5.0, 10.0, 0.1, 0.0),
    ParamSpec::new("moveSpeed", -5.0, 10.0, 0.1, 0.008),
    ParamSpec::new("cycleSeconds", 0.5, 10.0, 0.1, 3.0),
    ParamSpec::new("cameraX", -20.0, 20.0, 0.1, 10.0),
    ParamSpec::new("cameraY", -20.0, 20.0, 0.1, 10.0),
    ParamSpec::new("cameraZ", -20.0, 20.0, 0.1, 10.0),
    ParamSpec::new("brightness", 0.0, 2.0, 0.05, 1.05),
];

const WAVE_SPECS: &[ParamSpec] = &[
    ParamSpec::new("waveAmplitude", 0.0, 10.0, 0.1, 1.4),
    ParamSpec::new("waveFrequency", 0.0, 10.0, 0.1, 6.2),
    ParamSpec::new("waveSpeed", 0.0, 10.0, 0.1, 0.1),
    ParamSpec::new("spacing", 0.0, 10.0, 0.1, 1.2),
    ParamSpec::new("yOffset", 0.0, 10.0, 0.1, 0.0),
    ParamSpec::new("cameraX", -20.0, 40.0, 0.1, 6.7),
    ParamSpec::new("cameraY", -20.0, 40.0, 0.1, 15.7),
    ParamSpec::new("cameraZ", -20.0, 40.0, 0.1, -6.3),
    ParamSpec::new("brightness", 0.0, 2.0, 0.05, 0.8),
    ParamSpec::new("oceanicScale", 0.0, 5.0, 0.1, 4.1),
];

impl ControlSettings {
    fn from_specs(specs: &[ParamSpec]) -> Self {
        Self {
            params: specs
                .iter()
                .map(|spec| Param { spec: *spec, value: spec.default })
                .collect(),
        }
    }

    /// Parameters for the card-stack gallery.
    pub fn stack() -> Self {
        Self::from_specs(STACK_SPECS)
    }

    /// Parameters for the ocean-wave gallery.
    pub fn wave() -> Self {
        Self::from_specs(WAVE_SPECS)
    }

    /// Variants without a settings panel.
    pub fn empty() -> Self {
        Self { params: Vec::new() }
    }

    /// Current value of a parameter, or its fallback if this variant does not
    /// expose the name.
    pub fn value_or(&self, name: &str, fallback: f32) -> f32 {
        self.params
            .iter()
            .find(|p| p.spec.name == name)
            .map(|p| p.value)
            .unwrap_or(fallback)
    }

    /// Current value of a parameter known to exist for this variant.
    pub fn value(&self, name: &str) -> f32 {
        self.value_or(name, 0.0)
    }

    /// Set a parameter, clamping to its declared range. Returns false for an
    /// unknown name.
    pub fn set(&mut self, name: &str, value: f32) -> bool {
        match self.params.iter_mut().find(|p| p.spec.name == name) {
            Some(p) => {
                p.value = value.clamp(p.spec.min, p.spec.max);
                true
            }
            None => false,
        }
    }

    /// Specs in declaration order, for building a settings panel.
    pub fn specs(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().map(|p| &p.spec)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Serialize the current values as a JSON object keyed by parameter name,
    /// in declaration order. This is the "copy settings" payload.
    pub fn to_json(&self) -> String {
        let mut map = Map::new();
        for p in &self.params {
            let num = Number::from_f64(p.value as f64).unwrap_or_else(|| Number::from(0));
            map.insert(p.spec.name.to_string(), Value::Number(num));
        }
        serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_else(|_| "{}".to_string())
    }

    /// Describe every parameter (name, range, step, current value) as a JSON
    /// array, for hosts building a settings panel.
    pub fn specs_json(&self) -> String {
        #[derive(Serialize)]
        struct Row<'a> {
            name: &'a str,
            min: f32,
            max: f32,
            step: f32,
            value: f32,
        }
        let rows: Vec<Row> = self
            .params
            .iter()
            .map(|p| Row {
                name: p.spec.name,
                min: p.spec.min,
                max: p.spec.max,
                step: p.spec.step,
                value: p.value,
            })
            .collect();
        serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
    }

    /// Apply values from a JSON object produced by [`to_json`] (or edited by
    /// hand). Unknown keys are ignored; known keys are clamped as usual.
    /// Returns the number of parameters applied.
    pub fn apply_json(&mut self, json: &str) -> anyhow::Result<usize> {
        let map: Map<String, Value> = serde_json::from_str(json)?;
        let mut applied = 0;
        for (key, value) in &map {
            if let Some(v) = value.as_f64() {
                if self.set(key, v as f32) {
                    applied += 1;
                }
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_defaults() {
        let s = ControlSettings::stack();
        assert_eq!(s.value("spacing"), 1.0);
        assert_eq!(s.value("moveSpeed"), 0.008);
        assert_eq!(s.value("cycleSeconds"), 3.0);
        assert_eq!(s.value("brightness"), 1.05);
    }

    #[test]
    fn test_wave_defaults() {
        let s = ControlSettings::wave();
        assert_eq!(s.value("waveAmplitude"), 1.4);
        assert_eq!(s.value("cameraZ"), -6.3);
        assert_eq!(s.value("oceanicScale"), 4.1);
    }

    #[test]
    fn test_set_clamps_to_range() {
        let mut s = ControlSettings::stack();
        assert!(s.set("brightness", 99.0));
        assert_eq!(s.value("brightness"), 2.0);
        assert!(s.set("cameraX", -999.0));
        assert_eq!(s.value("cameraX"), -20.0);
    }

    #[test]
    fn test_set_unknown_name() {
        let mut s = ControlSettings::wave();
        assert!(!s.set("nope", 1.0));
        assert_eq!(s.value_or("nope", 7.0), 7.0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut s = ControlSettings::wave();
        s.set("waveAmplitude", 2.5);
        let json = s.to_json();
        assert!(json.contains("\"waveAmplitude\""));

        let mut other = ControlSettings::wave();
        let applied = other.apply_json(&json).unwrap();
        assert_eq!(applied, WAVE_SPECS.len());
        assert_eq!(other.value("waveAmplitude"), 2.5);
    }

    #[test]
    fn test_apply_json_clamps_and_skips_unknown() {
        let mut s = ControlSettings::stack();
        let applied = s
            .apply_json(r#"{"brightness": 5.0, "mystery": 1.0}"#)
            .unwrap();
        assert_eq!(applied, 1);
        assert_eq!(s.value("brightness"), 2.0);
    }

    #[test]
    fn test_specs_json_lists_every_param() {
        let s = ControlSettings::stack();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&s.specs_json()).unwrap();
        assert_eq!(rows.len(), STACK_SPECS.len());
        assert_eq!(rows[0]["name"], "spacing");
        assert_eq!(rows[0]["min"], -5.0);
    }

    #[test]
    fn test_empty_settings() {
        let s = ControlSettings::empty();
        assert!(s.is_empty());
        assert_eq!(s.to_json(), "{}");
    }
}
