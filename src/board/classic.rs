//! The classic 42-territory world map.
//!
//! All data is compile-time `static`. Each border is listed once; the graph
//! builder stores it in both directions.

use super::territory::TerritoryGraph;

/// Number of territories on the classic map.
pub const CLASSIC_TERRITORY_COUNT: usize = 42;

/// Number of undirected borders on the classic map.
pub const CLASSIC_BORDER_COUNT: usize = 83;

/// Continents and the bonus for holding each of them whole.
pub static CLASSIC_CONTINENTS: [(&str, u32); 6] = [
    ("Africa", 3),
    ("Asia", 7),
    ("Europe", 5),
    ("North America", 5),
    ("Oceania", 2),
    ("South America", 2),
];

const NA: &str = "North America";
const SA: &str = "South America";
const EU: &str = "Europe";
const AF: &str = "Africa";
const AS: &str = "Asia";
const OC: &str = "Oceania";

/// Territory names and their continent, in id order.
pub static CLASSIC_TERRITORIES: [(&str, &str); CLASSIC_TERRITORY_COUNT] = [
    // North America
    ("Alaska", NA),
    ("Alberta", NA),
    ("Central America", NA),
    ("Eastern United States", NA),
    ("Greenland", NA),
    ("Northwest Territory", NA),
    ("Ontario", NA),
    ("Quebec", NA),
    ("Western United States", NA),
    // South America
    ("Argentina", SA),
    ("Brazil", SA),
    ("Peru", SA),
    ("Venezuela", SA),
    // Europe
    ("Great Britain", EU),
    ("Iceland", EU),
    ("Northern Europe", EU),
    ("Scandinavia", EU),
    ("Southern Europe", EU),
    ("Ukraine", EU),
    ("Western Europe", EU),
    // Africa
    ("Congo", AF),
    ("East Africa", AF),
    ("Egypt", AF),
    ("Madagascar", AF),
    ("North Africa", AF),
    ("South Africa", AF),
    // Asia
    ("Afghanistan", AS),
    ("China", AS),
    ("India", AS),
    ("Irkutsk", AS),
    ("Japan", AS),
    ("Kamchatka", AS),
    ("Middle East", AS),
    ("Mongolia", AS),
    ("Siam", AS),
    ("Siberia", AS),
    ("Ural", AS),
    ("Yakutsk", AS),
    // Oceania
    ("Eastern Australia", OC),
    ("Indonesia", OC),
    ("New Guinea", OC),
    ("Western Australia", OC),
];

/// Undirected borders, each listed once.
pub static CLASSIC_BORDERS: [(&str, &str); CLASSIC_BORDER_COUNT] = [
    ("Alaska", "Northwest Territory"),
    ("Alaska", "Alberta"),
    ("Alaska", "Kamchatka"),
    ("Alberta", "Northwest Territory"),
    ("Alberta", "Ontario"),
    ("Alberta", "Western United States"),
    ("Central America", "Western United States"),
    ("Central America", "Eastern United States"),
    ("Central America", "Venezuela"),
    ("Eastern United States", "Western United States"),
    ("Eastern United States", "Ontario"),
    ("Eastern United States", "Quebec"),
    ("Greenland", "Northwest Territory"),
    ("Greenland", "Ontario"),
    ("Greenland", "Quebec"),
    ("Greenland", "Iceland"),
    ("Northwest Territory", "Ontario"),
    ("Ontario", "Quebec"),
    ("Ontario", "Western United States"),
    ("Venezuela", "Brazil"),
    ("Venezuela", "Peru"),
    ("Brazil", "Peru"),
    ("Brazil", "Argentina"),
    ("Brazil", "North Africa"),
    ("Peru", "Argentina"),
    ("Great Britain", "Iceland"),
    ("Great Britain", "Scandinavia"),
    ("Great Britain", "Northern Europe"),
    ("Great Britain", "Western Europe"),
    ("Iceland", "Scandinavia"),
    ("Northern Europe", "Scandinavia"),
    ("Northern Europe", "Ukraine"),
    ("Northern Europe", "Southern Europe"),
    ("Northern Europe", "Western Europe"),
    ("Scandinavia", "Ukraine"),
    ("Southern Europe", "Ukraine"),
    ("Southern Europe", "Western Europe"),
    ("Southern Europe", "North Africa"),
    ("Southern Europe", "Egypt"),
    ("Southern Europe", "Middle East"),
    ("Ukraine", "Ural"),
    ("Ukraine", "Afghanistan"),
    ("Ukraine", "Middle East"),
    ("Western Europe", "North Africa"),
    ("North Africa", "Egypt"),
    ("North Africa", "East Africa"),
    ("North Africa", "Congo"),
    ("Egypt", "East Africa"),
    ("Egypt", "Middle East"),
    ("East Africa", "Congo"),
    ("East Africa", "South Africa"),
    ("East Africa", "Madagascar"),
    ("East Africa", "Middle East"),
    ("Congo", "South Africa"),
    ("South Africa", "Madagascar"),
    ("Afghanistan", "Ural"),
    ("Afghanistan", "China"),
    ("Afghanistan", "India"),
    ("Afghanistan", "Middle East"),
    ("China", "India"),
    ("China", "Siam"),
    ("China", "Mongolia"),
    ("China", "Siberia"),
    ("China", "Ural"),
    ("India", "Middle East"),
    ("India", "Siam"),
    ("Irkutsk", "Siberia"),
    ("Irkutsk", "Yakutsk"),
    ("Irkutsk", "Kamchatka"),
    ("Irkutsk", "Mongolia"),
    ("Japan", "Kamchatka"),
    ("Japan", "Mongolia"),
    ("Kamchatka", "Yakutsk"),
    ("Kamchatka", "Mongolia"),
    ("Siberia", "Ural"),
    ("Siberia", "Yakutsk"),
    ("Siberia", "Mongolia"),
    ("Siam", "Indonesia"),
    ("Indonesia", "New Guinea"),
    ("Indonesia", "Western Australia"),
    ("New Guinea", "Eastern Australia"),
    ("New Guinea", "Western Australia"),
    ("Eastern Australia", "Western Australia"),
];

/// Builds the classic map graph.
pub fn classic() -> TerritoryGraph {
    TerritoryGraph::from_parts(
        CLASSIC_CONTINENTS.iter().copied(),
        CLASSIC_TERRITORIES.iter().copied(),
        CLASSIC_BORDERS.iter().copied(),
    )
    .expect("classic map table is consistent")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_map_has_expected_shape() {
        let graph = classic();
        assert_eq!(graph.len(), CLASSIC_TERRITORY_COUNT);
        assert_eq!(graph.continents().count(), 6);
        let directed: usize = graph.ids().map(|t| graph.neighbors_of(t).len()).sum();
        assert_eq!(directed, CLASSIC_BORDER_COUNT * 2);
    }

    #[test]
    fn no_border_is_listed_twice() {
        for (i, (a, b)) in CLASSIC_BORDERS.iter().enumerate() {
            for (c, d) in &CLASSIC_BORDERS[i + 1..] {
                assert!(
                    !((a == c && b == d) || (a == d && b == c)),
                    "duplicate border {} - {}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn continent_sizes_and_bonuses() {
        let graph = classic();
        let sizes: Vec<(&str, usize, u32)> = graph
            .continents()
            .map(|(_, c)| (c.name.as_str(), c.members.len(), c.bonus))
            .collect();
        assert_eq!(
            sizes,
            vec![
                ("Africa", 6, 3),
                ("Asia", 12, 7),
                ("Europe", 7, 5),
                ("North America", 9, 5),
                ("Oceania", 4, 2),
                ("South America", 4, 2),
            ]
        );
    }

    #[test]
    fn intercontinental_links() {
        let graph = classic();
        let id = |n: &str| graph.id_of(n).unwrap();
        assert!(graph.is_adjacent(id("Alaska"), id("Kamchatka")));
        assert!(graph.is_adjacent(id("Brazil"), id("North Africa")));
        assert!(graph.is_adjacent(id("Greenland"), id("Iceland")));
        assert!(graph.is_adjacent(id("Siam"), id("Indonesia")));
        assert!(!graph.is_adjacent(id("Brazil"), id("Egypt")));
    }

    #[test]
    fn every_territory_is_reachable() {
        let graph = classic();
        let mut seen = vec![false; graph.len()];
        let mut queue = std::collections::VecDeque::from([graph.id_of("Alaska").unwrap()]);
        seen[0] = true;
        while let Some(t) = queue.pop_front() {
            for &n in graph.neighbors_of(t) {
                if !seen[n.index()] {
                    seen[n.index()] = true;
                    queue.push_back(n);
                }
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn oceania_has_one_border() {
        let graph = classic();
        let oceania = graph.continent_of(graph.id_of("Indonesia").unwrap());
        assert_eq!(
            graph.continent_borders(oceania),
            vec![graph.id_of("Indonesia").unwrap()]
        );
    }
}
