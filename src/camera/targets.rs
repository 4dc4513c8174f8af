//! Lock-on target tracking: which enemies are in view, and which one is locked.
//!
//! Records live in an arena of reusable slots. Becoming visible takes a slot
//! from the free stack, becoming invisible returns it, so frequent visibility
//! flicker does not allocate. Handles carry a generation and go stale once
//! their slot is recycled.

use bevy::prelude::*;

use crate::physics::{LayerMask, PhysicsQuery};

/// Weak reference to a tracked target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetHandle {
    slot: u32,
    generation: u32,
}

/// Cached per-enemy values, recomputed on every lock-on attempt.
#[derive(Debug, Clone)]
pub struct TargetRecord<K> {
    pub key: K,
    pub position: Vec3,
    /// Squared distance to the camera.
    pub sqr_distance: f32,
    /// Offset projected on the camera's right axis; negative is left.
    pub alignment: f32,
    /// Selection score, lower wins.
    pub weight: f32,
    generation: u32,
    in_use: bool,
}

/// Where the camera is looking from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub position: Vec3,
    pub right: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionSettings {
    /// Targets further than this are never candidates.
    pub max_distance: f32,
    /// Layers that block line of sight.
    pub occlusion_mask: LayerMask,
}

/// Fired whenever the selected target changes, including to or from none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetChanged {
    pub previous: Option<TargetHandle>,
    pub current: Option<TargetHandle>,
}

/// Composite score of a candidate: close and centred wins.
pub fn target_weight(sqr_distance: f32, alignment: f32) -> f32 {
    0.25 * sqr_distance * alignment.abs().max(0.75)
}

#[derive(Debug, Clone)]
pub struct TargetTracker<K> {
    slots: Vec<TargetRecord<K>>,
    free: Vec<u32>,
    visible: Vec<u32>,
    selected: Option<TargetHandle>,
    scratch: Vec<u32>,
}

impl<K> Default for TargetTracker<K> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            visible: Vec::new(),
            selected: None,
            scratch: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq> TargetTracker<K> {
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Number of slots ever allocated.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn contains(&self, key: K) -> bool {
        self.find_visible(key).is_some()
    }

    pub fn selected(&self) -> Option<TargetHandle> {
        self.selected
    }

    pub fn get(&self, handle: TargetHandle) -> Option<&TargetRecord<K>> {
        self.slots
            .get(handle.slot as usize)
            .filter(|record| record.in_use && record.generation == handle.generation)
    }

    pub fn key(&self, handle: TargetHandle) -> Option<K> {
        self.get(handle).map(|record| record.key)
    }

    pub fn position(&self, handle: TargetHandle) -> Option<Vec3> {
        self.get(handle).map(|record| record.position)
    }

    pub fn handle_of(&self, key: K) -> Option<TargetHandle> {
        self.find_visible(key).map(|index| self.handle(self.visible[index]))
    }

    /// An enemy entered the view. Registering twice is a no-op.
    pub fn register(&mut self, key: K, position: Vec3) -> TargetHandle {
        if let Some(handle) = self.handle_of(key) {
            return handle;
        }

        let slot = match self.free.pop() {
            Some(slot) => {
                let record = &mut self.slots[slot as usize];
                record.key = key;
                record.in_use = true;
                slot
            }
            None => {
                self.slots.push(TargetRecord {
                    key,
                    position,
                    sqr_distance: 0.0,
                    alignment: 0.0,
                    weight: 0.0,
                    generation: 0,
                    in_use: true,
                });
                (self.slots.len() - 1) as u32
            }
        };

        let record = &mut self.slots[slot as usize];
        record.position = position;
        record.sqr_distance = 0.0;
        record.alignment = 0.0;
        record.weight = 0.0;

        self.visible.push(slot);
        self.handle(slot)
    }

    /// An enemy left the view or was removed.
    ///
    /// Dropping the selected enemy clears the selection.
    pub fn unregister(&mut self, key: K) -> Option<TargetChanged> {
        let index = self.find_visible(key)?;
        let slot = self.visible.remove(index);
        let handle = self.handle(slot);

        let record = &mut self.slots[slot as usize];
        record.in_use = false;
        record.generation = record.generation.wrapping_add(1);
        self.free.push(slot);

        if self.selected == Some(handle) {
            self.set_selected(None)
        } else {
            None
        }
    }

    /// Update a tracked enemy's world position.
    pub fn set_position(&mut self, key: K, position: Vec3) {
        if let Some(index) = self.find_visible(key) {
            let slot = self.visible[index] as usize;
            self.slots[slot].position = position;
        }
    }

    /// Lock-on button: unlock when holding a target, otherwise pick one.
    pub fn toggle_lock_on<P: PhysicsQuery>(
        &mut self,
        view: &Viewpoint,
        settings: &SelectionSettings,
        physics: &P,
    ) -> Option<TargetChanged> {
        if self.selected.is_some() {
            self.set_selected(None)
        } else {
            self.select_best(view, settings, physics)
        }
    }

    /// Pick the closest, most centred target in line of sight.
    ///
    /// Leaves the selection unchanged when nothing qualifies.
    pub fn select_best<P: PhysicsQuery>(
        &mut self,
        view: &Viewpoint,
        settings: &SelectionSettings,
        physics: &P,
    ) -> Option<TargetChanged> {
        let mut candidates = self.candidates_in_range(view, settings.max_distance);
        if candidates.is_empty() {
            self.scratch = candidates;
            return None;
        }

        let slots = &self.slots;
        candidates.sort_by(|&a, &b| {
            slots[a as usize].weight.total_cmp(&slots[b as usize].weight)
        });
        self.retain_in_sight(&mut candidates, view, settings.occlusion_mask, physics);

        let best = candidates.first().map(|&slot| self.handle(slot));
        self.scratch = candidates;
        best.and_then(|handle| self.set_selected(Some(handle)))
    }

    /// Move the lock one target left (`direction < 0`) or right (`direction > 0`).
    ///
    /// Clamps at the ends of the candidate list.
    pub fn switch_target<P: PhysicsQuery>(
        &mut self,
        direction: f32,
        view: &Viewpoint,
        settings: &SelectionSettings,
        physics: &P,
    ) -> Option<TargetChanged> {
        let current = self.selected?;
        if direction == 0.0 {
            return None;
        }

        let mut candidates = self.candidates_in_range(view, settings.max_distance);
        let slots = &self.slots;
        candidates.sort_by(|&a, &b| {
            slots[a as usize].alignment.total_cmp(&slots[b as usize].alignment)
        });
        self.retain_in_sight(&mut candidates, view, settings.occlusion_mask, physics);

        let next = candidates
            .iter()
            .position(|&slot| self.handle(slot) == current)
            .map(|index| {
                let last = candidates.len() as isize - 1;
                let step = if direction > 0.0 { 1 } else { -1 };
                (index as isize + step).clamp(0, last) as usize
            })
            .map(|index| self.handle(candidates[index]));

        self.scratch = candidates;
        next.and_then(|handle| self.set_selected(Some(handle)))
    }

    /// Keys of visible targets within `max_distance`, closest first.
    pub fn in_range(&mut self, view: &Viewpoint, max_distance: f32) -> Vec<K> {
        let candidates = self.candidates_in_range(view, max_distance);
        let keys = candidates
            .iter()
            .map(|&slot| self.slots[slot as usize].key)
            .collect();
        self.scratch = candidates;
        keys
    }

    fn set_selected(&mut self, target: Option<TargetHandle>) -> Option<TargetChanged> {
        if self.selected == target {
            return None;
        }
        let previous = std::mem::replace(&mut self.selected, target);
        Some(TargetChanged {
            previous,
            current: target,
        })
    }

    /// Refresh cached values and return visible slots within range, closest first.
    ///
    /// Reuses the scratch buffer; callers hand it back through `self.scratch`.
    fn candidates_in_range(&mut self, view: &Viewpoint, max_distance: f32) -> Vec<u32> {
        for &slot in &self.visible {
            let record = &mut self.slots[slot as usize];
            let offset = record.position - view.position;
            record.sqr_distance = offset.length_squared();
            record.alignment = view.right.dot(offset);
            record.weight = target_weight(record.sqr_distance, record.alignment);
        }

        let mut candidates = std::mem::take(&mut self.scratch);
        candidates.clear();
        candidates.extend_from_slice(&self.visible);

        let slots = &self.slots;
        candidates.sort_unstable_by(|&a, &b| {
            slots[a as usize]
                .sqr_distance
                .total_cmp(&slots[b as usize].sqr_distance)
        });
        let max_sqr = max_distance * max_distance;
        let cutoff = candidates.partition_point(|&slot| slots[slot as usize].sqr_distance <= max_sqr);
        candidates.truncate(cutoff);
        candidates
    }

    fn retain_in_sight<P: PhysicsQuery>(
        &self,
        candidates: &mut Vec<u32>,
        view: &Viewpoint,
        mask: LayerMask,
        physics: &P,
    ) {
        candidates.retain(|&slot| {
            !physics.line_blocked(view.position, self.slots[slot as usize].position, mask)
        });
    }

    fn find_visible(&self, key: K) -> Option<usize> {
        self.visible
            .iter()
            .position(|&slot| self.slots[slot as usize].key == key)
    }

    fn handle(&self, slot: u32) -> TargetHandle {
        TargetHandle {
            slot,
            generation: self.slots[slot as usize].generation,
        }
    }
}
