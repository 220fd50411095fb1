use crate::location::GeoLocation;

/// Neighbourhood centroids, sorted by name.
const AREA_CENTROIDS: &[(&str, f64, f64)] = &[
    ("Banani", 23.7937, 90.4066),
    ("Dhanmondi", 23.7461, 90.3742),
    ("Gulshan", 23.7806, 90.4160),
    ("Mirpur-1", 23.8103, 90.3563),
    ("Mirpur-14", 23.7808, 90.4125),
    ("Mohammadpur", 23.7679, 90.3565),
    ("Uttara", 23.8759, 90.3795),
];

/// Look up the centroid of a named area (case-insensitive).
pub fn lookup_area(name: &str) -> Option<GeoLocation> {
    let name = name.trim();
    AREA_CENTROIDS
        .iter()
        .find(|(area, _, _)| area.eq_ignore_ascii_case(name))
        .map(|&(_, lat, lng)| GeoLocation::new(lat, lng))
}

/// Canonical spelling of an area name, if known.
pub fn canonical_area_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    AREA_CENTROIDS
        .iter()
        .find(|(area, _, _)| area.eq_ignore_ascii_case(name))
        .map(|(area, _, _)| *area)
}

pub fn area_names() -> impl Iterator<Item = &'static str> {
    AREA_CENTROIDS.iter().map(|(area, _, _)| *area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let loc = lookup_area("dhanmondi").expect("Dhanmondi should exist");
        assert_eq!(loc, GeoLocation::new(23.7461, 90.3742));
        assert_eq!(canonical_area_name(" mirpur-14 "), Some("Mirpur-14"));
    }

    #[test]
    fn test_unknown_area() {
        assert!(lookup_area("Chittagong").is_none());
        assert!(lookup_area("").is_none());
    }

    #[test]
    fn test_table_is_sorted_and_valid() {
        let names: Vec<_> = area_names().collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(AREA_CENTROIDS
            .iter()
            .all(|&(_, lat, lng)| GeoLocation::new(lat, lng).is_valid()));
    }
}
