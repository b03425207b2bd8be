use std::cmp::Ordering;

use placefinder_geocoding::Coordinate;

use crate::classify::ProcessedResult;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in kilometres.
#[must_use]
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance from `origin` to a result, or `None` if the provider sent
/// coordinates that do not parse.
#[must_use]
pub fn distance_km(result: &ProcessedResult, origin: Coordinate) -> Option<f64> {
    result
        .raw
        .coordinate()
        .map(|position| haversine_km(origin, position))
}

fn by_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts results nearest first.
///
/// The sort is stable, so equal distances keep their incoming order. Results
/// whose coordinates cannot be parsed are kept and placed after every
/// measurable one.
#[must_use]
pub fn rank(results: Vec<ProcessedResult>, origin: Coordinate) -> Vec<ProcessedResult> {
    let mut keyed: Vec<(Option<f64>, ProcessedResult)> = results
        .into_iter()
        .map(|result| (distance_km(&result, origin), result))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| by_distance(*a, *b));
    keyed.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use placefinder_geocoding::Address;

    use super::*;
    use crate::classify::{process, tests::candidate};

    fn village(id: u64, lat: &str, lon: &str) -> ProcessedResult {
        let mut raw = candidate(
            id,
            "village",
            Address {
                village: Some(format!("Village {id}")),
                country: Some("Nowhere".to_string()),
                ..Address::default()
            },
        );
        raw.lat = lat.to_string();
        raw.lon = lon.to_string();
        process(vec![raw], "village", None).remove(0)
    }

    fn ids(results: &[ProcessedResult]) -> Vec<u64> {
        results.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_haversine_known_distances() {
        let london = Coordinate::new(51.5074, -0.1278);
        let paris = Coordinate::new(48.8566, 2.3522);
        let d = haversine_km(london, paris);
        assert!((d - 343.5).abs() < 1.0, "London-Paris was {d}");

        assert_eq!(haversine_km(london, london), 0.0);

        let one_degree = haversine_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((one_degree - 111.19).abs() < 0.01, "one degree was {one_degree}");
    }

    #[test]
    fn test_nearer_first() {
        let results = vec![village(2, "0", "2"), village(1, "0", "1")];
        let ranked = rank(results, Coordinate::new(0.0, 0.0));
        assert_eq!(ids(&ranked), vec![1, 2]);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let results = vec![
            village(1, "10", "10"),
            village(2, "-5", "3"),
            village(3, "0.5", "0.5"),
            village(4, "45", "-120"),
        ];
        let origin = Coordinate::new(1.0, 1.0);

        let first = rank(results.clone(), origin);
        let second = rank(results, origin);
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(ids(&first), vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_swapping_coordinates_swaps_order() {
        let origin = Coordinate::new(0.0, 0.0);
        let ranked = rank(vec![village(1, "0", "1"), village(2, "0", "3")], origin);
        assert_eq!(ids(&ranked), vec![1, 2]);

        let ranked = rank(vec![village(1, "0", "3"), village(2, "0", "1")], origin);
        assert_eq!(ids(&ranked), vec![2, 1]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let origin = Coordinate::new(0.0, 0.0);
        let results = vec![
            village(7, "0", "1"),
            village(3, "1", "0"),
            village(5, "0", "-1"),
        ];
        assert_eq!(ids(&rank(results, origin)), vec![7, 3, 5]);
    }

    #[test]
    fn test_unparsable_coordinates_sort_last() {
        let origin = Coordinate::new(0.0, 0.0);
        let results = vec![
            village(1, "not-a-number", "0"),
            village(2, "0", "5"),
            village(3, "", ""),
            village(4, "0", "1"),
        ];

        let ranked = rank(results, origin);
        assert_eq!(ids(&ranked), vec![4, 2, 1, 3]);
        assert!(distance_km(&ranked[2], origin).is_none());
    }

    #[test]
    fn test_process_ranks_when_origin_known() {
        let mut far = candidate(
            1,
            "village",
            Address {
                village: Some("Farby".to_string()),
                country: Some("Nowhere".to_string()),
                ..Address::default()
            },
        );
        far.lon = "2".to_string();
        let mut near = far.clone();
        near.place_id = 2;
        near.lon = "1".to_string();

        let unranked = process(vec![far.clone(), near.clone()], "farby", None);
        assert_eq!(ids(&unranked), vec![1, 2]);

        let ranked = process(vec![far, near], "farby", Some(Coordinate::new(0.0, 0.0)));
        assert_eq!(ids(&ranked), vec![2, 1]);
    }
}
