//! Synthetic street grid with a hazard zone cut out of it.
//!
//! Stands in for the ingestion step: a real deployment would load a road graph
//! and overlay hazard polygons before handing an immutable network to the
//! engine.  Here every block is `spacing` metres long and any segment whose
//! midpoint falls inside the hazard rectangle is dropped.

use evac_core::{NodeId, Point};
use evac_network::{NetworkBuilder, NetworkModel, NetworkResult};

/// Axis-aligned hazard rectangle in grid metres.
#[derive(Clone, Copy, Debug)]
pub struct HazardZone {
    pub min: Point,
    pub max: Point,
}

impl HazardZone {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// The flooded band used by the demo: a horizontal strip a little below the
/// middle of a grid spanning `extent` metres.  It stops short of the west
/// edge so the west exit keeps its street connections.
pub fn flood_band(extent: f64) -> HazardZone {
    HazardZone {
        min: Point::new(extent * 0.15, extent * 0.40),
        max: Point::new(extent * 0.70, extent * 0.55),
    }
}

/// Build a `size × size` grid with exits at the midpoint of each side.
///
/// Returns the network and the number of segments removed by the hazard.
pub fn build_grid(
    size:     u32,
    spacing:  f64,
    hazard:   HazardZone,
    capacity: u32,
) -> NetworkResult<(NetworkModel, usize)> {
    let node = |row: u32, col: u32| NodeId(row * size + col);

    let mut b = NetworkBuilder::with_capacity((size * size) as usize, (2 * size * size) as usize);
    for row in 0..size {
        for col in 0..size {
            b.add_node(Point::new(col as f64 * spacing, row as f64 * spacing));
        }
    }

    let mut removed = 0;
    for row in 0..size {
        for col in 0..size {
            let here = node(row, col);
            let mut neighbours = Vec::with_capacity(2);
            if col + 1 < size {
                neighbours.push(node(row, col + 1));
            }
            if row + 1 < size {
                neighbours.push(node(row + 1, col));
            }
            for there in neighbours {
                let (Some(p), Some(q)) = (b.node_pos(here), b.node_pos(there)) else {
                    continue;
                };
                if hazard.contains(p.lerp(q, 0.5)) {
                    removed += 1;
                    continue;
                }
                b.add_edge(here, there, p.distance(q));
            }
        }
    }

    let mid = size / 2;
    for exit in [node(0, mid), node(size - 1, mid), node(mid, 0), node(mid, size - 1)] {
        b.add_target(exit);
    }
    b.capacity(capacity);

    Ok((b.build()?, removed))
}
