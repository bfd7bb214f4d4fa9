use summits_core::{DistanceModel, LinearUnit, Point, SummitCandidate};
use summits_merge::{ClusterBuilder, ClusterParams, LinkMode, SummitSet};

const SOURCES: [&str; 5] = ["SRTM", "ASTER", "ALOS", "TDX", "GLO30"];

/// Small deterministic generator so the scenes are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Peaks scattered over a 10 x 10 map-unit square, each seen by a few DEMs
/// with a small positional jitter.
fn scene(seed: u64, peaks: usize) -> Vec<SummitCandidate> {
    let mut rng = Lcg(seed);
    let mut out = Vec::new();
    for p in 0..peaks {
        let cx = rng.next_f64() * 10.0;
        let cy = rng.next_f64() * 10.0;
        let ele = 1000.0 + rng.next_f64() * 1500.0;
        let seen_by = 1 + (p % SOURCES.len());
        for source in SOURCES.iter().take(seen_by) {
            let x = cx + (rng.next_f64() - 0.5) * 0.2;
            let y = cy + (rng.next_f64() - 0.5) * 0.2;
            let ridge = vec![Point::new(x, y), Point::new(x + 0.3, y - 0.1)];
            out.push(
                SummitCandidate::from_ridge(*source, ridge, ele, ele - 150.0 - p as f64).unwrap(),
            );
        }
    }
    out
}

fn builder(d: f64) -> ClusterBuilder {
    ClusterBuilder::new(
        ClusterParams::new(d, LinearUnit::MapUnits),
        DistanceModel::map_units(),
    )
    .unwrap()
}

fn partition(set: &SummitSet) -> Vec<Vec<usize>> {
    let mut p: Vec<_> = set.groups.iter().map(|g| g.members.clone()).collect();
    p.sort();
    p
}

#[test]
fn every_candidate_in_exactly_one_group() {
    for seed in 1..6 {
        let cands = scene(seed, 40);
        let n = cands.len();
        let set = builder(0.25).build(cands);
        let mut seen = vec![0usize; n];
        for g in &set.groups {
            assert!(!g.members.is_empty());
            for &m in &g.members {
                seen[m] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1), "seed {seed}: {seen:?}");
    }
}

#[test]
fn larger_threshold_never_splits_a_group() {
    let cands = scene(7, 60);
    let thresholds = [0.05, 0.1, 0.2, 0.4, 0.8, 1.6];
    for pair in thresholds.windows(2) {
        let small = builder(pair[0]).build(cands.clone());
        let large = builder(pair[1]).build(cands.clone());
        for g in &small.groups {
            let owner = large.group_of(g.members[0]).unwrap();
            assert!(
                g.members.iter().all(|m| owner.members.contains(m)),
                "group {:?} split when growing {} -> {}",
                g.members,
                pair[0],
                pair[1]
            );
        }
        assert!(large.groups.len() <= small.groups.len());
    }
}

#[test]
fn reclustering_canonical_positions_is_stable() {
    let cands = scene(11, 50);
    let first = builder(0.3).build(cands);

    let canonical: Vec<SummitCandidate> = first
        .groups
        .iter()
        .map(|g| {
            let col = first.selected_col(g);
            SummitCandidate::from_ridge(
                col.source_id.clone(),
                vec![g.canonical_position, col.col_position],
                first.candidates[g.members[0]].elevation,
                col.col_elevation,
            )
            .unwrap()
        })
        .collect();
    let second = builder(0.3).build(canonical);
    assert_eq!(first.groups.len(), second.groups.len());
    assert!(second.groups.iter().all(|g| g.members.len() == 1));
}

#[test]
fn clustering_does_not_depend_on_query_direction() {
    let cands = scene(3, 30);
    let mut reversed = cands.clone();
    reversed.reverse();
    let n = cands.len();

    let a = partition(&builder(0.3).build(cands));
    let mut b: Vec<Vec<usize>> = partition(&builder(0.3).build(reversed))
        .into_iter()
        .map(|g| {
            let mut g: Vec<_> = g.into_iter().map(|m| n - 1 - m).collect();
            g.sort();
            g
        })
        .collect();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn chained_detections_join_transitively() {
    // Flat top: each detection is within reach of the next one only.
    let cands: Vec<_> = (0..4)
        .map(|i| {
            let x = i as f64 * 0.09;
            SummitCandidate::from_ridge(
                SOURCES[i],
                vec![Point::new(x, 0.0), Point::new(x, -1.0)],
                2000.0,
                1700.0,
            )
            .unwrap()
        })
        .collect();
    let set = builder(0.1).build(cands);
    assert_eq!(vec![vec![0, 1, 2, 3]], partition(&set));
    assert_eq!(Point::new(0.0, 0.0), set.groups[0].canonical_position);
}

#[test]
fn summit_and_col_mode_is_stricter() {
    let cands = scene(5, 40);
    let loose = builder(0.3).build(cands.clone());
    let strict = ClusterBuilder::new(
        ClusterParams::new(0.3, LinearUnit::MapUnits).with_link(LinkMode::SummitAndCol),
        DistanceModel::map_units(),
    )
    .unwrap()
    .build(cands);
    assert!(strict.groups.len() >= loose.groups.len());
    for g in &strict.groups {
        let owner = loose.group_of(g.members[0]).unwrap();
        assert!(g.members.iter().all(|m| owner.members.contains(m)));
    }
}

#[test]
fn groups_carry_one_ridge_part_per_member() {
    let set = builder(0.3).build(scene(9, 20));
    for g in &set.groups {
        assert_eq!(g.members.len(), g.combined_ridge.member_parts().count());
        assert!(g.combined_ridge.representative().is_some());
    }
}

#[test]
fn shared_key_col_across_many_detections() {
    // 7 peaks, each seen by all 5 DEMs, all draining to one col.
    let col = Point::new(3000.0, 5000.0);
    let mut cands = Vec::new();
    for p in 0..7 {
        let summit = Point::new(1000.0 + 200.0 * p as f64, 6000.0);
        for source in SOURCES {
            let ele = 2000.0 + 10.0 * p as f64;
            cands.push(SummitCandidate::from_ridge(source, vec![summit, col], ele, 1500.0).unwrap());
        }
    }
    let set = builder(90.0).build(cands);
    assert_eq!(7, set.groups.len());
    for g in &set.groups {
        assert_eq!(5, g.members.len());
        assert!(g.merge.is_empty());
        assert_eq!(6, g.cross.len(), "{}: {:?}", g.id, g.cross);
        assert!(!g.cross.contains(&g.id));
    }

    let strict = ClusterBuilder::new(
        ClusterParams::new(90.0, LinearUnit::MapUnits).with_link(LinkMode::SummitAndCol),
        DistanceModel::map_units(),
    )
    .unwrap()
    .build(set.candidates.clone());
    assert_eq!(partition(&set), partition(&strict));
}

#[test]
fn identical_summit_positions_form_one_group() {
    let cands: Vec<_> = (0..200)
        .map(|i| {
            SummitCandidate::from_ridge(
                SOURCES[i % SOURCES.len()],
                vec![Point::new(42.0, 17.0), Point::new(42.0, 16.0)],
                900.0,
                600.0,
            )
            .unwrap()
        })
        .collect();
    let set = builder(0.5).build(cands);
    assert_eq!(vec![(0..200).collect::<Vec<_>>()], partition(&set));
    assert!(set.groups[0].merge.is_empty());
    assert!(set.groups[0].cross.is_empty());
}
