//! Proximity collision
//!
//! Entities are approximated as circles whose radius is the length of their
//! scale vector. Two entities collide when their centers are closer than the
//! larger of the two radii (times a tuning factor). Every hit deletes both
//! participants; there is no damage model.

use crate::foundation::math::Vec2;
use crate::scene::{EntityPool, PoolId, Transform};

/// Whether two transforms overlap
///
/// Symmetric in `a` and `b`.
pub fn collides(a: &Transform, b: &Transform, scale_factor: f32) -> bool {
    circles_overlap(a.position(), a.scale_length(), b.position(), b.scale_length(), scale_factor)
}

/// Circle test shared by [`collides`] and the collision pass
fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32, scale_factor: f32) -> bool {
    (a - b).magnitude() < a_radius.max(b_radius) * scale_factor
}

/// Location of an entity inside a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    /// Pool holding the entity
    pub pool: PoolId,
    /// Slot index inside the pool
    pub slot: usize,
}

/// A detected collision; both entities are already marked deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionHit {
    /// Entity from the rule's first pool
    pub first: EntityRef,
    /// Entity from the rule's second pool
    pub second: EntityRef,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    slot: usize,
    position: Vec2,
    radius: f32,
    alive: bool,
}

impl Candidate {
    fn overlaps(&self, other: &Self, scale_factor: f32) -> bool {
        circles_overlap(self.position, self.radius, other.position, other.radius, scale_factor)
    }
}

/// Runs the collision pass over registered pool pairs
#[derive(Debug, Clone)]
pub struct CollisionDetector {
    scale_factor: f32,
    rules: Vec<(PoolId, PoolId)>,
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl CollisionDetector {
    /// Detector with no rules
    pub fn new(scale_factor: f32) -> Self {
        Self {
            scale_factor,
            rules: Vec::new(),
        }
    }

    /// Radius multiplier
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Change the radius multiplier
    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.scale_factor = scale_factor;
    }

    /// Check `first` against `second` every tick
    ///
    /// A pool may be paired with itself; each unordered pair is then tested once.
    /// Registering the same rule twice has no effect.
    pub fn add_rule(&mut self, first: PoolId, second: PoolId) {
        if !self.rules.contains(&(first, second)) {
            self.rules.push((first, second));
        }
    }

    /// Registered rules, in the order they run
    pub fn rules(&self) -> &[(PoolId, PoolId)] {
        &self.rules
    }

    /// Run every rule, deleting both participants of each hit
    ///
    /// Rules run in registration order, so an entity deleted by an earlier
    /// rule can no longer collide in a later one. Within a rule, each live
    /// entity of the first pool takes the first live overlapping entity of
    /// the second pool.
    pub fn detect(&self, pools: &mut [EntityPool]) -> Vec<CollisionHit> {
        let mut hits = Vec::new();

        for &(first, second) in &self.rules {
            let (Some(left), Some(right)) = (pools.get(first.index()), pools.get(second.index())) else {
                continue;
            };

            let mut left = candidates(left);
            let rule_hits = if first == second {
                self.pairs_within(&mut left)
            } else {
                let mut right = candidates(right);
                self.pairs_across(&mut left, &mut right)
            };

            for (a, b) in rule_hits {
                for (pool, slot) in [(first, a), (second, b)] {
                    if let Some(entity) = pools[pool.index()].get_mut(slot) {
                        entity.mark_deleted();
                    }
                }
                log::debug!(
                    "Collision: {}[{a}] x {}[{b}]",
                    pools[first.index()].name(),
                    pools[second.index()].name()
                );
                hits.push(CollisionHit {
                    first: EntityRef { pool: first, slot: a },
                    second: EntityRef { pool: second, slot: b },
                });
            }
        }

        hits
    }

    fn pairs_across(&self, left: &mut [Candidate], right: &mut [Candidate]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for a in left.iter_mut() {
            if let Some(b) = right
                .iter_mut()
                .find(|b| b.alive && a.overlaps(b, self.scale_factor))
            {
                a.alive = false;
                b.alive = false;
                pairs.push((a.slot, b.slot));
            }
        }
        pairs
    }

    fn pairs_within(&self, all: &mut [Candidate]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..all.len() {
            if !all[i].alive {
                continue;
            }
            let (head, tail) = all.split_at_mut(i + 1);
            let a = &mut head[i];
            if let Some(b) = tail
                .iter_mut()
                .find(|b| b.alive && a.overlaps(b, self.scale_factor))
            {
                a.alive = false;
                b.alive = false;
                pairs.push((a.slot, b.slot));
            }
        }
        pairs
    }
}

fn candidates(pool: &EntityPool) -> Vec<Candidate> {
    pool.iter_live()
        .map(|(slot, entity)| Candidate {
            slot,
            position: entity.transform().position(),
            radius: entity.transform().scale_length(),
            alive: true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::RenderableId;
    use crate::scene::Entity;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sprite(x: f32, y: f32, sx: f32, sy: f32) -> Entity {
        Entity::new(RenderableId::default()).with_transform(Transform::at(x, y).with_scale(sx, sy))
    }

    fn random_transform(rng: &mut StdRng) -> Transform {
        Transform::at(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0))
            .with_scale(rng.gen_range(0.1..3.0), rng.gen_range(0.1..3.0))
    }

    fn detect_pair(first: &Transform, second: &Transform, factor: f32) -> bool {
        let mut pools = vec![EntityPool::new("first"), EntityPool::new("second")];
        pools[0].insert(Entity::new(RenderableId::default()).with_transform(first.clone()));
        pools[1].insert(Entity::new(RenderableId::default()).with_transform(second.clone()));

        let mut detector = CollisionDetector::new(factor);
        detector.add_rule(PoolId::new(0), PoolId::new(1));
        !detector.detect(&mut pools).is_empty()
    }

    #[test]
    fn test_collides_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let a = random_transform(&mut rng);
            let b = random_transform(&mut rng);
            let factor = rng.gen_range(0.5..1.5);
            assert_eq!(collides(&a, &b, factor), collides(&b, &a, factor));
        }
    }

    #[test]
    fn test_detect_agrees_with_collides_both_ways() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let a = random_transform(&mut rng);
            let b = random_transform(&mut rng);
            let factor = rng.gen_range(0.5..1.5);
            let expected = collides(&a, &b, factor);
            assert_eq!(detect_pair(&a, &b, factor), expected);
            assert_eq!(detect_pair(&b, &a, factor), expected);
        }

        let enemy = Transform::at(12.0, 0.0).with_scale(2.0, 2.0);
        let shot = Transform::at(11.9, 0.0).with_scale(0.2, 1.4);
        assert!(detect_pair(&shot, &enemy, 1.0));
        assert!(detect_pair(&enemy, &shot, 1.0));
    }

    #[test]
    fn test_radius_is_larger_scale_length() {
        let enemy = Transform::at(12.0, 0.0).with_scale(2.0, 2.0);
        let shot = Transform::at(11.9, 0.0).with_scale(0.2, 1.4);
        assert_relative_eq!(enemy.scale_length(), 8.0_f32.sqrt());
        assert!(collides(&enemy, &shot, 1.0));

        let far = Transform::at(20.0, 0.0).with_scale(0.2, 1.4);
        assert!(!collides(&enemy, &far, 1.0));
    }

    #[test]
    fn test_detect_marks_both_deleted() {
        let mut pools = vec![EntityPool::new("shots"), EntityPool::new("enemies")];
        pools[0].insert(sprite(11.9, 0.0, 0.2, 1.4));
        pools[0].insert(sprite(-5.0, 0.0, 0.2, 1.4));
        pools[1].insert(sprite(12.0, 0.0, 2.0, 2.0));

        let mut detector = CollisionDetector::default();
        detector.add_rule(PoolId::new(0), PoolId::new(1));
        let hits = detector.detect(&mut pools);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first, EntityRef { pool: PoolId::new(0), slot: 0 });
        assert_eq!(hits[0].second, EntityRef { pool: PoolId::new(1), slot: 0 });
        assert!(pools[0].get(0).is_some_and(Entity::is_deleted));
        assert!(pools[1].get(0).is_some_and(Entity::is_deleted));
        assert_eq!(pools[0].live_count(), 1);
    }

    #[test]
    fn test_one_target_absorbs_one_shot() {
        let mut pools = vec![EntityPool::new("shots"), EntityPool::new("enemies")];
        pools[0].insert(sprite(0.0, 0.0, 0.5, 0.5));
        pools[0].insert(sprite(0.1, 0.0, 0.5, 0.5));
        pools[1].insert(sprite(0.0, 0.0, 1.0, 1.0));

        let mut detector = CollisionDetector::default();
        detector.add_rule(PoolId::new(0), PoolId::new(1));
        assert_eq!(detector.detect(&mut pools).len(), 1);
        assert_eq!(pools[0].live_count(), 1);
    }

    #[test]
    fn test_no_candidates_is_a_no_op() {
        let mut pools = vec![EntityPool::new("shots"), EntityPool::new("enemies")];
        let mut detector = CollisionDetector::default();
        detector.add_rule(PoolId::new(0), PoolId::new(1));
        detector.add_rule(PoolId::new(0), PoolId::new(7));
        assert!(detector.detect(&mut pools).is_empty());
    }

    #[test]
    fn test_same_pool_pairs_once() {
        let mut pools = vec![EntityPool::new("rocks")];
        pools[0].insert(sprite(0.0, 0.0, 1.0, 1.0));
        pools[0].insert(sprite(0.5, 0.0, 1.0, 1.0));
        pools[0].insert(sprite(9.0, 0.0, 1.0, 1.0));

        let mut detector = CollisionDetector::default();
        detector.add_rule(PoolId::new(0), PoolId::new(0));
        let hits = detector.detect(&mut pools);

        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].first.slot, hits[0].second.slot), (0, 1));
        assert_eq!(pools[0].live_count(), 1);
    }

    #[test]
    fn test_duplicate_rules_ignored() {
        let mut detector = CollisionDetector::default();
        detector.add_rule(PoolId::new(0), PoolId::new(1));
        detector.add_rule(PoolId::new(0), PoolId::new(1));
        assert_eq!(detector.rules().len(), 1);
    }
}
