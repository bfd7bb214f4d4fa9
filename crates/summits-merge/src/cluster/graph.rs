use kiddo::{KdTree, SquaredEuclidean};
use std::collections::HashMap;
use summits_core::Point;

/// KD-tree over a set of map coordinates, answering fixed-radius queries.
///
/// The tree stores each distinct coordinate once; `slots[k]` lists the
/// points sitting at the `k`-th stored coordinate. A kiddo leaf holds a
/// bounded number of items at one exact position, and shared key cols are
/// routine across DEMs.
pub(crate) struct PointIndex {
    tree: KdTree<f64, 2>,
    points: Vec<Point>,
    slots: Vec<Vec<usize>>,
}

impl PointIndex {
    pub fn new(points: Vec<Point>) -> Self {
        let mut slot_of: HashMap<(u64, u64), usize> = HashMap::new();
        let mut coords: Vec<[f64; 2]> = Vec::new();
        let mut slots: Vec<Vec<usize>> = Vec::new();
        for (i, p) in points.iter().enumerate() {
            // `+ 0.0` folds -0.0 into 0.0
            let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
            let slot = *slot_of.entry(key).or_insert_with(|| {
                coords.push([p.x, p.y]);
                slots.push(Vec::new());
                slots.len() - 1
            });
            slots[slot].push(i);
        }
        let tree: KdTree<f64, 2> = (&coords).into();
        Self {
            tree,
            points,
            slots,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Indices of all points within `radius` of `query`, ascending.
    ///
    /// The tree is queried with a slightly larger radius and the result is
    /// re-checked with the exact planar distance, so the boundary case
    /// `distance == radius` is always included and the relation stays
    /// symmetric.
    pub fn within(&self, query: &Point, radius: f64) -> Vec<usize> {
        if self.points.is_empty() || radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let squared_radius = radius * radius * (1.0 + 1e-9) + f64::MIN_POSITIVE;
        let mut hits = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&[query.x, query.y], squared_radius)
            .into_iter()
            .flat_map(|nn| self.slots[nn.item as usize].iter().copied())
            .filter(|&i| nalgebra::distance(query, &self.points[i]) <= radius)
            .collect::<Vec<_>>();
        hits.sort_unstable();
        hits
    }

    /// Closest point within `radius` of `query`; the lowest index wins ties.
    pub fn nearest_within(&self, query: &Point, radius: f64) -> Option<usize> {
        self.within(query, radius).into_iter().min_by(|&a, &b| {
            nalgebra::distance(query, &self.points[a])
                .total_cmp(&nalgebra::distance(query, &self.points[b]))
        })
    }
}

/// Undirected adjacency lists, one per candidate.
pub(crate) struct NeighborGraph {
    pub neighbors: Vec<Vec<usize>>,
}

impl NeighborGraph {
    /// Link every pair of summits within `radius`; when `cols` is given the
    /// cols of both candidates must be within `radius` as well.
    pub fn build(summits: &PointIndex, cols: Option<&[Point]>, radius: f64) -> Self {
        let mut neighbors = Vec::with_capacity(summits.len());
        for (i, p) in summits.points.iter().enumerate() {
            let node = summits
                .within(p, radius)
                .into_iter()
                .filter(|&j| j != i)
                .filter(|&j| match cols {
                    Some(cols) => nalgebra::distance(&cols[i], &cols[j]) <= radius,
                    None => true,
                })
                .collect();
            neighbors.push(node);
        }
        Self { neighbors }
    }
}

/// Connected components, each sorted ascending, ordered by smallest member.
pub(crate) fn connected_components(graph: &NeighborGraph) -> Vec<Vec<usize>> {
    let mut visited = vec![false; graph.neighbors.len()];
    let mut components = Vec::new();

    for start in 0..graph.neighbors.len() {
        if visited[start] {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            component.push(node);

            for &next in &graph.neighbors[node] {
                if !visited[next] {
                    stack.push(next);
                }
            }
        }

        component.sort_unstable();
        components.push(component);
    }

    components
}
