//! Node key naming for the standard creature brain.
//!
//! Sight pixels are numbered left to right and named by their
//! offset from the center pixel: `l1`, `c0`, `r1` for a
//! resolution of 3. Each pixel feeds four inputs, suffixed
//! `h`, `s`, `l` (hue, saturation, lightness) and `d` (distance).

use crate::NodeKey;

/// Sight resolution used by randomly founded genomes.
pub const DEFAULT_SIGHT_RESOLUTION: usize = 3;

/// Inputs present regardless of sight resolution.
pub const BODY_INPUT_KEYS: [&str; 4] = ["energy", "fire_power", "speed", "dna_color"];

/// Outputs of the standard creature brain.
pub const OUTPUT_KEYS: [&str; 4] = [
    "acceleration_angle",
    "acceleration_radius",
    "shooting_trigger",
    "sexual_desire",
];

/// Outputs wired up in reduced genomes.
pub const REDUCED_OUTPUT_KEYS: [&str; 2] = ["acceleration_angle", "acceleration_radius"];

/// Returns the id of sight pixel `index` at `resolution`.
///
/// # Examples
/// ```
/// use evodna_neat::genomics::pixel_id_for_resolution;
///
/// let ids: Vec<_> = (0..3).map(|i| pixel_id_for_resolution(i, 3)).collect();
/// assert_eq!(ids, ["l1", "c0", "r1"]);
/// assert_eq!(pixel_id_for_resolution(0, 4), "l2");
/// assert_eq!(pixel_id_for_resolution(3, 4), "r1");
/// ```
pub fn pixel_id_for_resolution(index: usize, resolution: usize) -> String {
    let offset = index as i64 - (resolution / 2) as i64;
    let side = match offset {
        o if o < 0 => 'l',
        o if o > 0 => 'r',
        _ => 'c',
    };
    format!("{}{}", side, offset.abs())
}

fn sight_keys(resolution: usize, channels: &'static [char]) -> impl Iterator<Item = NodeKey> {
    (0..resolution).flat_map(move |i| {
        let pixel = pixel_id_for_resolution(i, resolution);
        channels
            .iter()
            .map(move |channel| format!("sight_{}{}", pixel, channel))
    })
}

/// Returns every sight input key at `resolution`.
pub fn sight_input_keys(resolution: usize) -> Vec<NodeKey> {
    sight_keys(resolution, &['h', 's', 'l', 'd']).collect()
}

/// Returns the standard input keys: body inputs, then sight inputs.
pub fn input_keys(resolution: usize) -> Vec<NodeKey> {
    BODY_INPUT_KEYS
        .iter()
        .map(|k| k.to_string())
        .chain(sight_input_keys(resolution))
        .collect()
}

/// Returns the inputs wired up in reduced genomes:
/// the lightness and distance of every pixel.
pub fn reduced_input_keys(resolution: usize) -> Vec<NodeKey> {
    sight_keys(resolution, &['l', 'd']).collect()
}
