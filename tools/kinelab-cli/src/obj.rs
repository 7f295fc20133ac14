//! OBJ vertex reading
//!
//! Only `v` lines matter for vertex-to-joint assignment; faces, normals and
//! texture coordinates are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use glam::Vec3;

/// Read every `v x y z` position from an OBJ file, in file order
pub fn read_vertices(input: &Path) -> Result<Vec<Vec3>> {
    let file = File::open(input).with_context(|| format!("Failed to open OBJ: {:?}", input))?;
    let vertices = parse_vertices(BufReader::new(file))
        .with_context(|| format!("Failed to parse OBJ: {:?}", input))?;
    tracing::info!("Read {} vertices from {:?}", vertices.len(), input);
    Ok(vertices)
}

/// Parse `v` lines from any reader
pub fn parse_vertices<R: BufRead>(reader: R) -> Result<Vec<Vec3>> {
    let mut positions = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts[0] != "v" {
            continue;
        }
        if parts.len() < 4 {
            bail!("line {}: vertex needs three coordinates", number + 1);
        }

        let mut xyz = [0.0f32; 3];
        for (slot, part) in xyz.iter_mut().zip(&parts[1..4]) {
            *slot = part
                .parse()
                .with_context(|| format!("line {}: invalid coordinate {:?}", number + 1, part))?;
        }
        positions.push(Vec3::from_array(xyz));
    }

    Ok(positions)
}
