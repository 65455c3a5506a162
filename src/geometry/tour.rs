//! Proximity tour
//!
//! Greedy nearest-neighbour ordering over a layer's elements in the (x, z)
//! plane. Starting from the first element, the tour repeatedly hops to the
//! closest unvisited element. Ties go to the element that comes first in
//! source order. Quadratic, which is fine for hand-authored scenes.

use crate::scene::Element;

/// Visit order as indices into `elements`.
///
/// The result is a permutation: same length as the input, every index
/// exactly once. Empty input gives an empty tour.
pub fn proximity_order(elements: &[Element]) -> Vec<usize> {
    let n = elements.len();
    let mut order = Vec::with_capacity(n);
    if n == 0 {
        return order;
    }

    let mut visited = vec![false; n];
    let mut current = 0;
    visited[current] = true;
    order.push(current);

    while order.len() < n {
        let here = elements[current].position;
        let mut best: Option<(usize, f64)> = None;
        for (i, el) in elements.iter().enumerate() {
            if visited[i] {
                continue;
            }
            let d = here.distance_sq(&el.position);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((i, d)),
            }
        }
        // Some unvisited index always exists while order.len() < n.
        let Some((next, _)) = best else { break };
        visited[next] = true;
        order.push(next);
        current = next;
    }

    order
}

/// Elements in tour order.
pub fn proximity_tour(elements: &[Element]) -> Vec<&Element> {
    proximity_order(elements)
        .into_iter()
        .map(|i| &elements[i])
        .collect()
}
