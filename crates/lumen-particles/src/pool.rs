//! Capped particle pool with dense active storage and O(1) release

use crate::particle::{Particle, ParticleOptions};
use lumen_core::Vec2;
use serde::{Deserialize, Serialize};

/// Pool slot identity. Valid until the particle is released; slots are reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId(pub u32);

impl ParticleId {
    fn slot(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Swap-remove pool. Active particles live contiguously in `particles` so
/// physics and rendering see a plain slice; `index_of` maps each slot to its
/// dense index.
pub struct ParticlePool {
    particles: Vec<Particle>,
    ids: Vec<ParticleId>,
    index_of: Vec<Option<usize>>,
    free_slots: Vec<ParticleId>,
    /// Retired particles kept for reuse (trail buffers stay allocated)
    spare: Vec<Particle>,
    max_particles: usize,
}

impl ParticlePool {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::new(),
            ids: Vec::new(),
            index_of: Vec::new(),
            free_slots: Vec::new(),
            spare: Vec::new(),
            max_particles,
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_particles
    }

    /// Lowering the cap below the active count evicts nothing; it only
    /// blocks acquires until enough particles are released.
    pub fn set_capacity(&mut self, max_particles: usize) {
        if max_particles < self.particles.len() {
            tracing::debug!(
                active = self.particles.len(),
                max_particles,
                "particle cap lowered below active count; acquires blocked until releases"
            );
        }
        self.max_particles = max_particles;
    }

    pub fn active_count(&self) -> usize {
        self.particles.len()
    }

    pub fn free_count(&self) -> usize {
        self.max_particles.saturating_sub(self.particles.len())
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Activate a particle at `position`. Returns None at the cap.
    pub fn acquire(&mut self, position: Vec2, options: &ParticleOptions) -> Option<ParticleId> {
        if self.particles.len() >= self.max_particles {
            return None;
        }

        let id = match self.free_slots.pop() {
            Some(id) => id,
            None => {
                let id = ParticleId(self.index_of.len() as u32);
                self.index_of.push(None);
                id
            }
        };

        let particle = match self.spare.pop() {
            Some(mut p) => {
                p.reset(position, options);
                p
            }
            None => Particle::spawned(position, options),
        };

        self.index_of[id.slot()] = Some(self.particles.len());
        self.particles.push(particle);
        self.ids.push(id);
        Some(id)
    }

    /// Return a particle to the free pool. False if `id` is not active.
    pub fn release(&mut self, id: ParticleId) -> bool {
        let Some(index) = self.index_of.get(id.slot()).copied().flatten() else {
            return false;
        };
        self.remove_at(index);
        true
    }

    fn remove_at(&mut self, index: usize) -> ParticleId {
        let id = self.ids.swap_remove(index);
        let mut particle = self.particles.swap_remove(index);
        if let Some(&moved) = self.ids.get(index) {
            self.index_of[moved.slot()] = Some(index);
        }
        self.index_of[id.slot()] = None;
        particle.retire();
        self.spare.push(particle);
        self.free_slots.push(id);
        id
    }

    /// Release every active particle, returning their ids in dense order
    pub fn release_all(&mut self) -> Vec<ParticleId> {
        let released = self.ids.clone();
        while !self.particles.is_empty() {
            self.remove_at(self.particles.len() - 1);
        }
        released
    }

    /// Release particles whose `active` flag was cleared. Returns the released ids.
    pub fn sweep_inactive(&mut self) -> Vec<ParticleId> {
        let mut released = Vec::new();
        let mut i = 0;
        while i < self.particles.len() {
            if self.particles[i].active {
                i += 1;
            } else {
                // The swapped-in particle lands at i and is checked next
                released.push(self.remove_at(i));
            }
        }
        released
    }

    /// Drop everything, including recycled storage
    pub fn clear(&mut self) {
        self.particles.clear();
        self.ids.clear();
        self.index_of.clear();
        self.free_slots.clear();
        self.spare.clear();
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        let index = self.index_of.get(id.slot()).copied().flatten()?;
        self.particles.get(index)
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        let index = self.index_of.get(id.slot()).copied().flatten()?;
        self.particles.get_mut(index)
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.get(id).is_some()
    }

    /// Active particles in dense order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Ids parallel to `particles()`
    pub fn ids(&self) -> &[ParticleId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticleId, &Particle)> {
        self.ids.iter().copied().zip(self.particles.iter())
    }
}
