//! Generate memorable names for story output directories.
//!
//! Names are storybook-themed adjective-noun pairs like "brave-lantern"
//! or "moonlit-fox".

use std::path::{Path, PathBuf};

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Storybook-themed adjectives.
pub const ADJECTIVES: &[&str] = &[
    "amber", "ancient", "brave", "bright", "clever", "cozy", "curious",
    "dancing", "dreamy", "drowsy", "emerald", "enchanted", "friendly",
    "gentle", "giggling", "gleaming", "golden", "happy", "hidden", "humble",
    "jolly", "kindly", "little", "lucky", "merry", "midnight", "moonlit",
    "mossy", "mysterious", "peaceful", "playful", "quiet", "rosy",
    "secret", "silver", "sleepy", "snug", "sparkling", "starry", "sunny",
    "tiny", "twinkling", "velvet", "wandering", "whispering", "wild",
    "wise", "wondrous",
];

/// Storybook-themed nouns.
pub const NOUNS: &[&str] = &[
    "acorn", "badger", "bell", "bridge", "brook", "candle", "castle",
    "cloud", "compass", "cottage", "cricket", "crown", "dragon", "fable",
    "feather", "firefly", "fox", "garden", "giant", "hedgehog", "kettle",
    "lantern", "lighthouse", "meadow", "mitten", "moon", "mouse", "owl",
    "pebble", "pinecone", "pond", "rabbit", "raven", "riddle", "river",
    "saddle", "sparrow", "star", "tale", "thicket", "toadstool", "tower",
    "treasure", "turtle", "wagon", "willow", "wish", "wren",
];

/// Generate an adjective-noun pair, deterministic when seeded.
pub fn generate_name(seed: Option<u64>) -> String {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let adjective = ADJECTIVES.choose(&mut rng).unwrap_or(&"quiet");
    let noun = NOUNS.choose(&mut rng).unwrap_or(&"tale");
    format!("{}-{}", adjective, noun)
}

/// Create a uniquely named run directory under `base`.
///
/// Uses `explicit` as the name when given; otherwise generates one,
/// suffixing -2, -3, ... on collision.
pub fn create_run_dir(base: &Path, seed: Option<u64>, explicit: Option<&str>) -> Result<PathBuf> {
    std::fs::create_dir_all(base)?;

    let name = match explicit {
        Some(n) => n.to_string(),
        None => generate_name(seed),
    };

    let mut dir = base.join(&name);
    let mut counter = 2;
    while dir.exists() {
        dir = base.join(format!("{}-{}", name, counter));
        counter += 1;
    }
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
