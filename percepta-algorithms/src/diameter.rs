//! Diameter (farthest pair) search

use percepta_core::Point3d;

/// The farthest pair of a point set, by index into the searched slice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diameter {
    pub first: usize,
    pub second: usize,
    pub length: f64,
}

/// Exhaustive O(n²) search for the pair of points at maximum distance.
///
/// Pairs are visited as `(i, j)` with `i < j` in slice order and a pair only
/// replaces the current best when strictly farther, so among equally long
/// pairs the first one visited wins. Returns `None` for fewer than two
/// points. Meant for downsampled clusters; cost grows quadratically.
pub fn find_diameter(points: &[Point3d]) -> Option<Diameter> {
    if points.len() < 2 {
        return None;
    }

    let mut best = Candidate {
        first: 0,
        second: 1,
        length_squared: (points[1] - points[0]).norm_squared(),
    };

    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let length_squared = (points[j] - points[i]).norm_squared();
            if length_squared > best.length_squared {
                best = Candidate { first: i, second: j, length_squared };
            }
        }
    }

    Some(Diameter {
        first: best.first,
        second: best.second,
        length: best.length_squared.sqrt(),
    })
}

struct Candidate {
    first: usize,
    second: usize,
    length_squared: f64,
}

/// The two ends of an elongated object, labeled by coordinate sum.
///
/// `highest` is the end with the larger `x + y + z`. This is a fixed
/// labeling convention that decides which end becomes a pose origin; it
/// carries no "up" meaning. On equal sums the second argument is `highest`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoints {
    pub highest: Point3d,
    pub lowest: Point3d,
}

impl Endpoints {
    pub fn label(a: Point3d, b: Point3d) -> Self {
        if coordinate_sum(&a) > coordinate_sum(&b) {
            Self { highest: a, lowest: b }
        } else {
            Self { highest: b, lowest: a }
        }
    }
}

fn coordinate_sum(p: &Point3d) -> f64 {
    p.x + p.y + p.z
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;

    fn brute_force_max(points: &[Point3d]) -> f64 {
        let mut max = 0.0_f64;
        for a in points {
            for b in points {
                max = max.max((a - b).norm());
            }
        }
        max
    }

    #[test]
    fn test_find_diameter_too_few_points() {
        assert!(find_diameter(&[]).is_none());
        assert!(find_diameter(&[Point3d::origin()]).is_none());
    }

    #[test]
    fn test_find_diameter_line() {
        let points = vec![
            Point3d::new(0.5, 0.0, 0.0),
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(0.2, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
        ];
        let d = find_diameter(&points).unwrap();
        assert_eq!((d.first, d.second), (1, 3));
        assert_relative_eq!(d.length, 1.0);
    }

    #[test]
    fn test_find_diameter_tie_keeps_first_pair() {
        // Unit square: both diagonals have the same length
        let points = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ];
        let d = find_diameter(&points).unwrap();
        assert_eq!((d.first, d.second), (0, 2));
    }

    #[test]
    fn test_find_diameter_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let n = rng.gen_range(2..=20);
            let points: Vec<Point3d> = (0..n)
                .map(|_| Point3d::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
                .collect();

            let d = find_diameter(&points).unwrap();
            assert!(d.first < d.second);
            assert_relative_eq!((points[d.second] - points[d.first]).norm(), d.length, epsilon = 1e-12);
            assert_relative_eq!(d.length, brute_force_max(&points), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_endpoints_label_by_coordinate_sum() {
        let a = Point3d::new(0.0, 0.0, 0.1);
        let b = Point3d::new(0.3, 0.0, 0.0);

        let e = Endpoints::label(a, b);
        assert_eq!(e.highest, b);
        assert_eq!(e.lowest, a);

        let e = Endpoints::label(b, a);
        assert_eq!(e.highest, b);
    }

    #[test]
    fn test_endpoints_label_tie() {
        let a = Point3d::new(1.0, 0.0, 0.0);
        let b = Point3d::new(0.0, 1.0, 0.0);
        let labeled = Endpoints::label(a, b);
        assert_eq!(labeled.highest, b);
        assert_eq!(labeled.lowest, a);
        assert_eq!(Endpoints::label(b, a).highest, a);
    }
}
