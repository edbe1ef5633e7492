//! Edge walker for recursive geometry resolution
//!
//! Resolves vector geometry by following VRPT chains and applying
//! orientation/continuity rules.

use super::errors::{TopologyError, TopologyResult};
use super::types::Orientation;
use super::TraversalContext;
use num_rational::BigRational;
use num_traits::Signed;
use s57_parse::bitstring::NameKey;
use std::collections::HashMap;

/// Maximum recursion depth for VRPT traversal
const MAX_DEPTH: usize = 100;

/// Walker for resolving edge geometry
pub struct EdgeWalker<'a> {
    ctx: &'a TraversalContext<'a>,
    /// Track visit counts for cycle detection
    visit_counts: HashMap<NameKey, usize>,
    /// Current recursion depth
    depth: usize,
    /// Chain of vectors being resolved (for error reporting)
    chain: Vec<NameKey>,
}

impl<'a> EdgeWalker<'a> {
    /// Create a new edge walker
    pub fn new(ctx: &'a TraversalContext<'a>) -> Self {
        Self {
            ctx,
            visit_counts: HashMap::new(),
            depth: 0,
            chain: Vec::new(),
        }
    }

    /// Resolve a vector to a 2D polyline
    ///
    /// Returns coordinates in (lat, lon) order with exact rational precision.
    /// Follows VRPT chain if no direct geometry available.
    ///
    /// # Algorithm
    ///
    /// 1. Check depth limit
    /// 2. Check cycle policy
    /// 3. Look up vector data
    /// 4. If has direct geometry (SG2D), return it
    /// 5. If has VRPT pointers, recursively resolve and stitch
    /// 6. Otherwise, error (no geometry)
    pub fn resolve_line_2d(
        &mut self,
        name: NameKey,
    ) -> TopologyResult<Vec<(BigRational, BigRational)>> {
        // Check depth limit
        if self.depth >= MAX_DEPTH {
            return Err(TopologyError::MaxDepthExceeded {
                max_depth: MAX_DEPTH,
                chain: self.chain.clone(),
            });
        }

        // Check cycle detection policy
        self.check_cycle(&name)?;

        // Track this vector in the chain
        self.chain.push(name);
        self.depth += 1;

        // Increment visit count
        *self.visit_counts.entry(name).or_insert(0) += 1;

        // Look up vector entity by NAME
        let entity = self
            .ctx
            .world
            .name_index
            .get(&name)
            .copied()
            .ok_or_else(|| TopologyError::DanglingReference {
                from: *self.chain.get(self.chain.len() - 2).unwrap_or(&name),
                to: name,
            })?;

        let own_positions = self.ctx.world.exact_positions.get(&entity);
        let topo = self.ctx.world.vector_topology.get(&entity);

        // An edge carries its own interior vertices directly (SG2D) and its
        // endpoint nodes only as VRPT pointers tagged TOPI 1 (begin) / 2
        // (end). Splice begin-node + interior + end-node in that declared
        // order -- not VRPT list order, which need not match it.
        if let Some(positions) = own_positions {
            if let Some(topo) = topo {
                let begin = topo.neighbors.iter().find(|n| n.topi == 1);
                let end = topo.neighbors.iter().find(|n| n.topi == 2);
                if begin.is_some() || end.is_some() {
                    let mut result: Vec<(BigRational, BigRational)> = Vec::new();
                    if let Some(b) = begin {
                        let coords = self.resolve_neighbor(name, b)?;
                        Self::append_dedup(&mut result, coords);
                    }
                    let interior: Vec<(BigRational, BigRational)> = positions
                        .lat
                        .iter()
                        .cloned()
                        .zip(positions.lon.iter().cloned())
                        .collect();
                    Self::append_dedup(&mut result, interior);
                    if let Some(e) = end {
                        let coords = self.resolve_neighbor(name, e)?;
                        Self::append_dedup(&mut result, coords);
                    }

                    self.depth -= 1;
                    self.chain.pop();
                    return Ok(result);
                }
            }

            // Plain node: no endpoint pointers to splice around.
            let coords: Vec<(BigRational, BigRational)> = positions
                .lat
                .iter()
                .cloned()
                .zip(positions.lon.iter().cloned())
                .collect();

            self.depth -= 1;
            self.chain.pop();
            return Ok(coords);
        }

        // No direct geometry: fall back to stitching every VRPT neighbor in
        // listed order (e.g. a face boundary built entirely from edges).
        let vrpt_neighbors = if let Some(topo) = topo {
            &topo.neighbors
        } else {
            // No direct geometry and no VRPT pointers
            self.depth -= 1;
            self.chain.pop();
            return Err(TopologyError::NoGeometry { vector: name });
        };

        if vrpt_neighbors.is_empty() {
            self.depth -= 1;
            self.chain.pop();
            return Err(TopologyError::NoGeometry { vector: name });
        }

        // Recursively resolve each VRPT pointer and stitch together
        let mut result: Vec<(BigRational, BigRational)> = Vec::new();

        for (idx, neighbor) in vrpt_neighbors.iter().enumerate() {
            // Resolve entity -> NAME for the referenced vector
            let neighbor_name = self
                .ctx
                .world
                .vector_meta
                .get(&neighbor.entity)
                .map(|meta| meta.name)
                .ok_or_else(|| TopologyError::DanglingReference {
                    from: name,
                    to: NameKey { rcnm: 0, rcid: 0 }, // Unknown name
                })?;

            // Apply orientation
            let ornt = Orientation::from_ornt(neighbor.ornt);

            // Recursively resolve the referenced vector
            let child_coords = self.resolve_with_orientation(neighbor_name, ornt)?;

            if child_coords.is_empty() {
                continue; // Skip empty segments
            }

            // Check continuity if not the first segment
            if !result.is_empty() && !child_coords.is_empty() {
                self.check_continuity(
                    result.last().unwrap(),
                    &child_coords[0],
                    neighbor_name,
                    idx,
                )?;
            }

            // Append coordinates (avoid duplicating shared endpoints)
            if !result.is_empty() && !child_coords.is_empty() {
                let last_pt = result.last().unwrap();
                let first_pt = &child_coords[0];

                // If endpoints match exactly, skip the duplicate
                if last_pt.0 == first_pt.0 && last_pt.1 == first_pt.1 {
                    result.extend_from_slice(&child_coords[1..]);
                } else {
                    // Not matching - continuity policy will handle this
                    result.extend(child_coords);
                }
            } else {
                result.extend(child_coords);
            }
        }

        self.depth -= 1;
        self.chain.pop();
        Ok(result)
    }

    /// Resolve a vector with orientation applied
    fn resolve_with_orientation(
        &mut self,
        name: NameKey,
        ornt: Orientation,
    ) -> TopologyResult<Vec<(BigRational, BigRational)>> {
        let mut coords = self.resolve_line_2d(name)?;

        if ornt.should_reverse() {
            coords.reverse();
        }

        Ok(coords)
    }

    /// Resolve a single `VectorNeighbor` (a VRPT entry) to its oriented
    /// coordinate sequence, re-deriving its NAME through `vector_meta`.
    fn resolve_neighbor(
        &mut self,
        from: NameKey,
        neighbor: &crate::ecs::VectorNeighbor,
    ) -> TopologyResult<Vec<(BigRational, BigRational)>> {
        let neighbor_name = self
            .ctx
            .world
            .vector_meta
            .get(&neighbor.entity)
            .map(|meta| meta.name)
            .ok_or_else(|| TopologyError::DanglingReference {
                from,
                to: NameKey { rcnm: 0, rcid: 0 },
            })?;
        self.resolve_with_orientation(neighbor_name, Orientation::from_ornt(neighbor.ornt))
    }

    /// Append `next` onto `result`, dropping `next`'s first point when it
    /// coincides exactly with `result`'s last point.
    fn append_dedup(
        result: &mut Vec<(BigRational, BigRational)>,
        next: Vec<(BigRational, BigRational)>,
    ) {
        if next.is_empty() {
            return;
        }
        if let Some(last) = result.last() {
            let first = &next[0];
            if last.0 == first.0 && last.1 == first.1 {
                result.extend(next.into_iter().skip(1));
                return;
            }
        }
        result.extend(next);
    }

    /// Check for cycle detection based on policy
    fn check_cycle(&self, name: &NameKey) -> TopologyResult<()> {
        use super::errors::CyclePolicy;

        let visit_count = self.visit_counts.get(name).copied().unwrap_or(0);

        match self.ctx.cycle_policy {
            CyclePolicy::Error => {
                if visit_count > 0 {
                    return Err(TopologyError::CycleDetected {
                        chain: self.chain.clone(),
                    });
                }
            }
            CyclePolicy::Truncate => {
                if visit_count > 0 {
                    // Truncate: stop traversal here by returning empty result
                    // Caller will handle this gracefully
                    return Err(TopologyError::CycleDetected {
                        chain: self.chain.clone(),
                    });
                }
            }
            CyclePolicy::AllowVisitCount(max_visits) => {
                if visit_count >= max_visits {
                    return Err(TopologyError::CycleDetected {
                        chain: self.chain.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Check endpoint continuity
    fn check_continuity(
        &self,
        lhs_end: &(BigRational, BigRational),
        rhs_start: &(BigRational, BigRational),
        child: NameKey,
        index: usize,
    ) -> TopologyResult<()> {
        use super::errors::ContinuityPolicy;

        // Check if endpoints match exactly
        if lhs_end.0 == rhs_start.0 && lhs_end.1 == rhs_start.1 {
            return Ok(()); // Perfect continuity
        }

        match self.ctx.continuity_policy {
            ContinuityPolicy::Error => {
                return Err(TopologyError::ContinuityBreak {
                    at_index: index,
                    lhs_end: lhs_end.clone(),
                    rhs_start: rhs_start.clone(),
                    child,
                });
            }
            ContinuityPolicy::SnapWithinTolerance(denom) => {
                // Calculate distance using rational arithmetic
                let dx = &lhs_end.0 - &rhs_start.0;
                let dy = &lhs_end.1 - &rhs_start.1;

                // Approximate distance check: |dx| + |dy| < tolerance (Manhattan distance)
                let tolerance = BigRational::new(1.into(), denom.into());

                if dx.abs() < tolerance && dy.abs() < tolerance {
                    // Within tolerance - snap is handled by caller skipping duplicate point
                    return Ok(());
                }

                // Outside tolerance
                return Err(TopologyError::ContinuityBreak {
                    at_index: index,
                    lhs_end: lhs_end.clone(),
                    rhs_start: rhs_start.clone(),
                    child,
                });
            }
            ContinuityPolicy::InsertGapMarker => {
                // Allow the gap - caller will insert both points
                // This creates a visible discontinuity in the line
                log::warn!(
                    "discontinuous seam before {:?} (index {}): {:?} != {:?}",
                    child,
                    index,
                    lhs_end,
                    rhs_start
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{EntityType, ExactPositions, VectorMeta, VectorNeighbor, VectorTopology, World};
    use crate::topology::{ContinuityPolicy, CyclePolicy, TraversalContext};
    use num_bigint::BigInt;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn add_node(world: &mut World, rcid: u32, lat: BigRational, lon: BigRational) -> NameKey {
        let entity = world.create_entity(EntityType::Vector);
        let name = NameKey { rcnm: 110, rcid };
        world.name_index.insert(name, entity);
        world.vector_meta.insert(entity, VectorMeta { name, rver: 1, ruin: 1 });
        world.exact_positions.insert(entity, ExactPositions { lat: vec![lat], lon: vec![lon] });
        name
    }

    /// An edge the way `decode.rs` actually leaves it: SG2D (interior
    /// vertices) and VRPT (TOPI 1/2 endpoint pointers) attached to the same
    /// entity, matching a real VRID record rather than a synthetic stand-in.
    #[test]
    fn edge_splices_begin_node_interior_and_end_node() {
        let mut world = World::new();
        let a = add_node(&mut world, 1, rat(0, 1), rat(0, 1));
        let b = add_node(&mut world, 2, rat(0, 1), rat(2, 1));

        let edge_entity = world.create_entity(EntityType::Vector);
        let edge_name = NameKey { rcnm: 130, rcid: 10 };
        world.name_index.insert(edge_name, edge_entity);
        world.vector_meta.insert(edge_entity, VectorMeta { name: edge_name, rver: 1, ruin: 1 });
        world.exact_positions.insert(
            edge_entity,
            ExactPositions { lat: vec![rat(0, 1)], lon: vec![rat(1, 1)] },
        );
        world.vector_topology.insert(
            edge_entity,
            VectorTopology {
                neighbors: vec![
                    VectorNeighbor { entity: world.name_index[&a], ornt: 1, usag: 255, topi: 1, mask: 255 },
                    VectorNeighbor { entity: world.name_index[&b], ornt: 1, usag: 255, topi: 2, mask: 255 },
                ],
            },
        );

        let ctx = TraversalContext::new(&world)
            .with_cycle_policy(CyclePolicy::Truncate)
            .with_continuity_policy(ContinuityPolicy::InsertGapMarker);
        let mut walker = EdgeWalker::new(&ctx);
        let coords = walker.resolve_line_2d(edge_name).unwrap();

        assert_eq!(coords, vec![(rat(0, 1), rat(0, 1)), (rat(0, 1), rat(1, 1)), (rat(0, 1), rat(2, 1))]);
    }

    #[test]
    fn reversed_edge_reverses_interior_vertices_but_not_endpoints() {
        let mut world = World::new();
        let a = add_node(&mut world, 1, rat(0, 1), rat(0, 1));
        let b = add_node(&mut world, 2, rat(0, 1), rat(2, 1));

        let edge_entity = world.create_entity(EntityType::Vector);
        let edge_name = NameKey { rcnm: 130, rcid: 10 };
        world.name_index.insert(edge_name, edge_entity);
        world.vector_meta.insert(edge_entity, VectorMeta { name: edge_name, rver: 1, ruin: 1 });
        world.exact_positions.insert(
            edge_entity,
            ExactPositions { lat: vec![rat(0, 1)], lon: vec![rat(1, 1)] },
        );
        world.vector_topology.insert(
            edge_entity,
            VectorTopology {
                neighbors: vec![
                    VectorNeighbor { entity: world.name_index[&a], ornt: 1, usag: 255, topi: 1, mask: 255 },
                    VectorNeighbor { entity: world.name_index[&b], ornt: 1, usag: 255, topi: 2, mask: 255 },
                ],
            },
        );

        let ctx = TraversalContext::new(&world)
            .with_cycle_policy(CyclePolicy::Truncate)
            .with_continuity_policy(ContinuityPolicy::InsertGapMarker);

        let forward = EdgeWalker::new(&ctx).resolve_line_2d(edge_name).unwrap();
        let mut reverse = EdgeWalker::new(&ctx).resolve_line_2d(edge_name).unwrap();
        reverse.reverse();

        assert_eq!(forward, vec![(rat(0, 1), rat(0, 1)), (rat(0, 1), rat(1, 1)), (rat(0, 1), rat(2, 1))]);
        assert_eq!(reverse, vec![(rat(0, 1), rat(2, 1)), (rat(0, 1), rat(1, 1)), (rat(0, 1), rat(0, 1))]);
    }
}
