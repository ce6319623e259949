//! Greedy nearby-point merge: fewer, larger points for dense outlines

use crate::sampler::SampledPoint;
use lumen_core::Vec2;
use std::collections::HashMap;

/// Union points within `merge_distance` of a seed into their centroid.
///
/// Walks points in input order; each unvisited point becomes a seed and
/// absorbs every later unvisited point within `merge_distance` of it. The
/// merged point keeps the seed's metadata, takes the mean alpha and gets size
/// `sqrt(count) * 2`. Output order follows seed order, so results depend on
/// input order.
pub fn merge_points(points: &[SampledPoint], merge_distance: f32) -> Vec<SampledPoint> {
    if points.is_empty() {
        return Vec::new();
    }

    let cell_size = merge_distance.max(f32::EPSILON);
    let cell_of = |p: Vec2| {
        (
            (p.x / cell_size).floor() as i64,
            (p.y / cell_size).floor() as i64,
        )
    };

    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, p) in points.iter().enumerate() {
        grid.entry(cell_of(p.position)).or_default().push(i);
    }

    let mut used = vec![false; points.len()];
    let mut merged = Vec::new();
    let mut neighbors = Vec::new();

    for i in 0..points.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let seed = &points[i];
        let (cx, cy) = cell_of(seed.position);

        neighbors.clear();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = grid.get(&(cx + dx, cy + dy)) {
                    neighbors.extend(bucket.iter().copied().filter(|&j| j > i && !used[j]));
                }
            }
        }
        // Accumulate in index order so float sums match a linear sweep
        neighbors.sort_unstable();

        let mut count = 1usize;
        let mut sum = seed.position;
        let mut alpha_sum = seed.alpha;
        for &j in &neighbors {
            let other = &points[j];
            if seed.position.distance(other.position) <= merge_distance {
                used[j] = true;
                count += 1;
                sum += other.position;
                alpha_sum += other.alpha;
            }
        }

        let n = count as f32;
        merged.push(SampledPoint {
            position: sum * (1.0 / n),
            alpha: alpha_sum / n,
            size: Some(n.sqrt() * 2.0),
            ..seed.clone()
        });
    }
    merged
}
