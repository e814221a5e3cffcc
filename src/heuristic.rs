use tracing::{debug, info};

use crate::params::{ParameterRecord, TerrainType};

const MOUNTAIN_WORDS: &[&str] = &["mountain", "mountains", "peak", "peaks"];
const HILL_WORDS: &[&str] = &["hill", "hills", "hilly", "rolling"];
const VALLEY_WORDS: &[&str] = &["valley", "valleys", "depression", "low"];
const FLAT_WORDS: &[&str] = &["flat", "plain", "plains", "level"];
const PLATEAU_WORDS: &[&str] = &["plateau", "mesa", "tableland"];

const LARGE_WORDS: &[&str] = &["large", "big", "huge", "massive"];
const SMALL_WORDS: &[&str] = &["small", "tiny", "little", "mini"];

const ROUGH_WORDS: &[&str] = &["rough", "jagged", "rocky", "detailed"];
const SMOOTH_WORDS: &[&str] = &["smooth", "gentle", "soft", "simple"];

const WATER_WORDS: &[&str] = &["river", "stream", "water", "creek"];

/// Exclusive upper bound for fallback seeds.
pub const SEED_SPAN: u32 = 10000;

/// Substring containment, so "plainly" matches "plain".
#[inline]
fn mentions(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Fresh seed in `[0, SEED_SPAN)`.
pub fn random_seed() -> u32 {
    rand::random_range(0..SEED_SPAN)
}

/// Keyword-driven text → parameters mapping. Pure apart from the seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicAnalyzer;

impl HeuristicAnalyzer {
    pub fn analyze(&self, text: &str) -> ParameterRecord {
        self.analyze_with_seed(text, random_seed())
    }

    /// Layers are applied in order: terrain family, scale, detail, water.
    /// Families and branches within a layer are first-match-wins.
    pub fn analyze_with_seed(&self, text: &str, seed: u32) -> ParameterRecord {
        info!("using keyword fallback analysis");
        let text = text.to_lowercase();
        let mut p = ParameterRecord {
            seed,
            ..ParameterRecord::default()
        };

        if mentions(&text, MOUNTAIN_WORDS) {
            p.terrain_type = TerrainType::Mountains;
            p.amplitude = 15.0;
            p.frequency = 0.05;
        } else if mentions(&text, HILL_WORDS) {
            p.terrain_type = TerrainType::Hills;
            p.amplitude = 8.0;
            p.frequency = 0.1;
        } else if mentions(&text, VALLEY_WORDS) {
            p.terrain_type = TerrainType::Valleys;
            p.amplitude = 6.0;
        } else if mentions(&text, FLAT_WORDS) {
            p.terrain_type = TerrainType::Flat;
            p.amplitude = 1.0;
        } else if mentions(&text, PLATEAU_WORDS) {
            p.terrain_type = TerrainType::Plateau;
            p.plateau = 5.0;
            p.amplitude = 8.0;
        }

        if mentions(&text, LARGE_WORDS) {
            p.frequency *= 0.5;
            p.amplitude *= 1.5;
        } else if mentions(&text, SMALL_WORDS) {
            p.frequency *= 2.0;
            p.amplitude *= 0.7;
        }

        if mentions(&text, ROUGH_WORDS) {
            p.octaves = 5;
            p.lacunarity = 2.5;
        } else if mentions(&text, SMOOTH_WORDS) {
            p.octaves = 2;
            p.persistence = 0.3;
        }

        if mentions(&text, WATER_WORDS) {
            p.erosion = 0.3;
        }

        // "huge mountains" scales amplitude past its maximum
        let p = p.clamped();
        debug!(?p, "fallback analysis result");
        p
    }
}
