//! Reading module - three Root Cards drawn without replacement

use crate::category::{Category, Taxonomy};
use crate::error::DomainError;
use crate::graph::Graph;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of cards in a reading
pub const READING_SIZE: usize = 3;

/// A drawn hand of distinct Root Cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    cards: Vec<String>,
}

impl Reading {
    /// Wrap already-drawn card labels
    pub fn new(cards: Vec<String>) -> Self {
        Self { cards }
    }

    /// The drawn card labels, in draw order
    pub fn cards(&self) -> &[String] {
        &self.cards
    }

    /// Whether a label is part of this reading
    pub fn contains(&self, label: &str) -> bool {
        self.cards.iter().any(|c| c == label)
    }
}

/// Draw a reading uniformly at random from the Root Cards of `graph`
///
/// # Errors
/// Returns `DomainError::InsufficientPool` when fewer than
/// [`READING_SIZE`] Root Cards exist.
pub fn draw_reading<R: Rng + ?Sized>(
    graph: &Graph,
    taxonomy: &Taxonomy,
    rng: &mut R,
) -> Result<Reading, DomainError> {
    let pool = graph.nodes_in(taxonomy, Category::RootCard);
    if pool.len() < READING_SIZE {
        return Err(DomainError::InsufficientPool {
            available: pool.len(),
            required: READING_SIZE,
        });
    }

    let cards = rand::seq::index::sample(rng, pool.len(), READING_SIZE)
        .into_iter()
        .map(|i| pool[i].to_string())
        .collect();

    Ok(Reading { cards })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn deck() -> Graph {
        Graph::from_edges(&[
            Edge::new("La Casa", "El Mundo", 1.0),
            Edge::new("El Río", "Miedo al Abandono", 2.0),
            Edge::new("La Semilla", "El Renacido", 1.0),
            Edge::new("El Puente", "Frase del Perdón", 1.0),
            Edge::new("La Casa", "El Puente", 1.0),
        ])
    }

    #[test]
    fn test_reading_draws_distinct_root_cards() {
        let graph = deck();
        let taxonomy = Taxonomy::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let reading = draw_reading(&graph, &taxonomy, &mut rng).unwrap();
            let cards = reading.cards();
            assert_eq!(cards.len(), READING_SIZE);

            let unique: HashSet<_> = cards.iter().collect();
            assert_eq!(unique.len(), READING_SIZE);

            for card in cards {
                assert_eq!(taxonomy.categorize(card), Category::RootCard);
            }
        }
    }

    #[test]
    fn test_exact_pool_returns_whole_pool() {
        let graph = Graph::from_edges(&[
            Edge::new("Uno", "El Sol", 1.0),
            Edge::new("Dos", "Tres", 1.0),
        ]);
        let mut rng = StdRng::seed_from_u64(1);
        let reading = draw_reading(&graph, &Taxonomy::default(), &mut rng).unwrap();

        let drawn: HashSet<_> = reading.cards().iter().map(String::as_str).collect();
        assert_eq!(drawn, HashSet::from(["Uno", "Dos", "Tres"]));
    }

    #[test]
    fn test_undersized_pool_fails() {
        let graph = Graph::from_edges(&[Edge::new("La Casa", "El Mundo", 1.0)]);
        let mut rng = StdRng::seed_from_u64(3);

        let result = draw_reading(&graph, &Taxonomy::default(), &mut rng);
        assert_eq!(
            result,
            Err(DomainError::InsufficientPool {
                available: 1,
                required: 3
            })
        );
    }

    #[test]
    fn test_empty_graph_fails() {
        let mut rng = StdRng::seed_from_u64(3);
        let result = draw_reading(&Graph::default(), &Taxonomy::default(), &mut rng);
        assert!(matches!(result, Err(DomainError::InsufficientPool { available: 0, .. })));
    }

    #[test]
    fn test_contains() {
        let graph = deck();
        let mut rng = StdRng::seed_from_u64(11);
        let reading = draw_reading(&graph, &Taxonomy::default(), &mut rng).unwrap();
        let first = reading.cards()[0].clone();
        assert!(reading.contains(&first));
        assert!(!reading.contains("El Mundo"));
    }
}
