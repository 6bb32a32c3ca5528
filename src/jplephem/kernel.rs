//! Barycentric position lookups over a whole SPK file
//!
//! An SPK file stores positions pairwise (moon relative to the Earth-Moon
//! barycenter, Earth-Moon barycenter relative to the solar system barycenter,
//! and so on). `SpiceKernel` precomputes, for every body reachable from the
//! solar system barycenter, the chain of segments whose sum gives the body's
//! barycentric position.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::Path;

use nalgebra::Vector3;

use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::names::{target_id, targets};
use crate::jplephem::spk::SPK;

/// A loaded SPK kernel with segment chain resolution
pub struct SpiceKernel {
    spk: SPK,
    /// target_id -> (center, target) pairs leading from the barycenter
    chains: HashMap<i32, Vec<(i32, i32)>>,
}

impl SpiceKernel {
    /// Open a BSP/SPK file and precompute segment chains
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let spk = SPK::open(path)?;
        let chains = Self::build_chains(&spk);
        log::debug!("Kernel resolves {} bodies", chains.len());
        Ok(SpiceKernel { spk, chains })
    }

    /// Breadth-first search from the barycenter over segment edges
    fn build_chains(spk: &SPK) -> HashMap<i32, Vec<(i32, i32)>> {
        let mut adjacent: HashMap<i32, Vec<i32>> = HashMap::new();
        for seg in &spk.segments {
            adjacent.entry(seg.center).or_default().push(seg.target);
        }

        let root = targets::SOLAR_SYSTEM_BARYCENTER;
        let mut parent: HashMap<i32, i32> = HashMap::new();
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            for &target in adjacent.get(&node).into_iter().flatten() {
                if target == root {
                    continue;
                }
                if let Entry::Vacant(e) = parent.entry(target) {
                    e.insert(node);
                    queue.push_back(target);
                }
            }
        }

        parent
            .keys()
            .map(|&body| {
                let mut chain = Vec::new();
                let mut current = body;
                while let Some(&center) = parent.get(&current) {
                    chain.push((center, current));
                    current = center;
                }
                chain.reverse();
                (body, chain)
            })
            .collect()
    }

    /// Resolve a body name or numeric string to a NAIF ID
    pub fn resolve_name(&self, name: &str) -> Result<i32> {
        if let Ok(id) = name.trim().parse::<i32>() {
            return Ok(id);
        }
        target_id(name).ok_or_else(|| {
            JplephemError::InvalidFormat(format!("Unknown body name: '{name}'"))
        })
    }

    /// True if the body's barycentric position can be computed
    pub fn contains(&self, id: i32) -> bool {
        id == targets::SOLAR_SYSTEM_BARYCENTER || self.chains.contains_key(&id)
    }

    /// Segment chain leading from the barycenter to `id`
    pub fn chain(&self, id: i32) -> Result<&[(i32, i32)]> {
        if id == targets::SOLAR_SYSTEM_BARYCENTER {
            return Ok(&[]);
        }
        self.chains
            .get(&id)
            .map(Vec::as_slice)
            .ok_or(JplephemError::NoPath(id))
    }

    /// Barycentric ICRF position of `id` in km at TDB seconds past J2000
    pub fn barycentric_km(&self, id: i32, tdb_seconds: f64) -> Result<Vector3<f64>> {
        self.chain(id)?
            .iter()
            .try_fold(Vector3::zeros(), |total, &(center, target)| {
                Ok(total + self.spk.compute(center, target, tdb_seconds)?)
            })
    }

    /// Position of `target` relative to `observer` in km
    pub fn relative_km(&self, observer: i32, target: i32, tdb_seconds: f64) -> Result<Vector3<f64>> {
        Ok(self.barycentric_km(target, tdb_seconds)? - self.barycentric_km(observer, tdb_seconds)?)
    }

    /// Access the underlying SPK for direct segment access
    pub fn spk(&self) -> &SPK {
        &self.spk
    }
}

impl fmt::Display for SpiceKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.spk.fmt(f)
    }
}
