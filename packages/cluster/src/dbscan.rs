//! DBSCAN over an abstract neighbor lookup.

use std::collections::VecDeque;

/// Runs DBSCAN over `point_count` points using `neighbors_of` as the
/// region query.
///
/// `neighbors_of(i)` must return every point within the clustering radius
/// of point `i`, including `i` itself. A point whose neighborhood reaches
/// `min_samples` is a core point; core points chain into clusters, points
/// reachable from a core point but not dense themselves join as border
/// points, and everything else is noise (`None`).
///
/// Points are visited in index order and neighbor lists are consumed in
/// the order returned, so for a sorted input and a deterministic lookup
/// the labeling is reproducible, including which cluster claims a border
/// point shared between two dense regions.
#[must_use]
pub fn dbscan<F>(point_count: usize, min_samples: usize, mut neighbors_of: F) -> Vec<Option<usize>>
where
    F: FnMut(usize) -> Vec<usize>,
{
    let mut labels: Vec<Option<usize>> = vec![None; point_count];
    let mut visited = vec![false; point_count];
    let mut next_cluster = 0;

    for point in 0..point_count {
        if visited[point] {
            continue;
        }
        visited[point] = true;

        let neighbors = neighbors_of(point);
        if neighbors.len() < min_samples {
            // Noise for now; may still be adopted as a border point later.
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;
        labels[point] = Some(cluster);

        let mut queue: VecDeque<usize> = neighbors.into_iter().collect();
        while let Some(candidate) = queue.pop_front() {
            if labels[candidate].is_none() {
                labels[candidate] = Some(cluster);
            } else if labels[candidate] != Some(cluster) {
                continue;
            }

            if !visited[candidate] {
                visited[candidate] = true;
                let candidate_neighbors = neighbors_of(candidate);
                if candidate_neighbors.len() >= min_samples {
                    queue.extend(candidate_neighbors);
                }
            }
        }
    }

    labels
}
