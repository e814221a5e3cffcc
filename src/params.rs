use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Coarse landform tag carried in `terrain_type`. Serialised as its integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TerrainType {
    Flat = 0,
    Hills = 1,
    Mountains = 2,
    Valleys = 3,
    Plateau = 4,
    Custom = 5,
}

#[derive(Debug, Error)]
#[error("terrain type out of range: {0}")]
pub struct InvalidTerrainType(pub u8);

impl From<TerrainType> for u8 {
    fn from(t: TerrainType) -> u8 {
        t as u8
    }
}

impl TryFrom<u8> for TerrainType {
    type Error = InvalidTerrainType;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Ok(match v {
            0 => TerrainType::Flat,
            1 => TerrainType::Hills,
            2 => TerrainType::Mountains,
            3 => TerrainType::Valleys,
            4 => TerrainType::Plateau,
            5 => TerrainType::Custom,
            other => return Err(InvalidTerrainType(other)),
        })
    }
}

/// Range and default for one record field.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub integral: bool,
}

impl FieldSpec {
    const fn float(name: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self { name, min, max, default, integral: false }
    }

    const fn int(name: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self { name, min, max, default, integral: true }
    }

    #[inline]
    pub fn clamp(&self, v: f64) -> f64 {
        self.max.min(v).max(self.min)
    }
}

/// Field table in record order. `validate` and `ParameterRecord::to_map` walk it.
pub const FIELDS: [FieldSpec; 9] = [
    FieldSpec::int("seed", 0.0, 10000.0, 42.0),
    FieldSpec::float("frequency", 0.01, 1.0, 0.1),
    FieldSpec::float("amplitude", 0.5, 20.0, 5.0),
    FieldSpec::int("octaves", 1.0, 6.0, 3.0),
    FieldSpec::float("lacunarity", 1.5, 3.0, 2.0),
    FieldSpec::float("persistence", 0.1, 0.8, 0.5),
    FieldSpec::int("terrain_type", 0.0, 5.0, 1.0),
    FieldSpec::float("erosion", 0.0, 1.0, 0.0),
    FieldSpec::float("plateau", 0.0, 15.0, 0.0),
];

/// Noise parameters handed to the terrain generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub seed: u32,
    // Fractal noise
    pub frequency: f64,
    pub amplitude: f64,
    pub octaves: u32,
    pub lacunarity: f64,
    pub persistence: f64,
    // Shaping
    pub terrain_type: TerrainType,
    pub erosion: f64,
    pub plateau: f64,
}

impl Default for ParameterRecord {
    fn default() -> Self {
        Self {
            seed: 42,
            frequency: 0.1,
            amplitude: 5.0,
            octaves: 3,
            lacunarity: 2.0,
            persistence: 0.5,
            terrain_type: TerrainType::Hills,
            erosion: 0.0,
            plateau: 0.0,
        }
    }
}

impl ParameterRecord {
    /// Values in `FIELDS` order.
    fn values(&self) -> [f64; 9] {
        [
            self.seed as f64,
            self.frequency,
            self.amplitude,
            self.octaves as f64,
            self.lacunarity,
            self.persistence,
            u8::from(self.terrain_type) as f64,
            self.erosion,
            self.plateau,
        ]
    }

    /// Builds a record from already-clamped values in `FIELDS` order.
    /// Integral fields are truncated.
    fn from_clamped(v: [f64; 9]) -> Self {
        let terrain = TerrainType::try_from(v[6].trunc() as u8).unwrap_or(TerrainType::Custom);
        Self {
            seed: v[0].trunc() as u32,
            frequency: v[1],
            amplitude: v[2],
            octaves: v[3].trunc() as u32,
            lacunarity: v[4],
            persistence: v[5],
            terrain_type: terrain,
            erosion: v[7],
            plateau: v[8],
        }
    }

    /// Returns the record with every field pulled into its range.
    pub fn clamped(&self) -> Self {
        let mut v = self.values();
        for (x, spec) in v.iter_mut().zip(FIELDS.iter()) {
            *x = spec.clamp(*x);
        }
        Self::from_clamped(v)
    }

    /// The record as the loose mapping `validate` accepts.
    pub fn to_map(&self) -> Map<String, Value> {
        FIELDS
            .iter()
            .zip(self.values())
            .map(|(spec, v)| {
                let value = if spec.integral {
                    Value::from(v as i64)
                } else {
                    Value::from(v)
                };
                (spec.name.to_string(), value)
            })
            .collect()
    }
}

/// JSON numbers, plus booleans read as 0/1. Anything else is not numeric.
fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Repairs an arbitrary mapping into a full in-range record.
///
/// Present numeric fields are clamped, present non-numeric fields drop to the
/// field's minimum, absent fields take the default. Unknown keys are ignored.
/// Never fails.
pub fn validate(raw: &Map<String, Value>) -> ParameterRecord {
    let mut v = [0.0; 9];
    for (slot, spec) in v.iter_mut().zip(FIELDS.iter()) {
        *slot = match raw.get(spec.name) {
            None => spec.default,
            Some(value) => match numeric(value) {
                Some(x) => spec.clamp(x),
                None => {
                    warn!(field = spec.name, %value, "non-numeric parameter, using minimum");
                    spec.min
                }
            },
        };
    }
    ParameterRecord::from_clamped(v)
}
