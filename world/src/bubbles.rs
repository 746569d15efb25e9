//! Decorative bubble pool refreshed once per rendered frame.

use std::{collections::HashSet, time::Duration};

use fear_the_water_core::{BubbleConfig, EntityId};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    entities::{Bubble, Component},
    EntityAllocator,
};

/// Outcome of a single maintenance pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct BubbleTurnover {
    pub(crate) removed: usize,
    pub(crate) spawned: Option<EntityId>,
}

/// Seeded spawner that keeps the live bubble count under a soft cap.
#[derive(Debug)]
pub(crate) struct BubblePool {
    config: BubbleConfig,
    area: Vec2,
    rng: ChaCha8Rng,
}

impl BubblePool {
    /// Creates a pool spawning inside `area`, which must have positive extent.
    pub(crate) fn new(config: BubbleConfig, area: Vec2, seed: u64) -> Self {
        Self {
            config,
            area,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Evicts dead bubbles and rolls for at most one replacement.
    ///
    /// Dead bubbles are removed from both `components` and `bubbles` by id. A
    /// new bubble is inserted at the front of `components` so it draws beneath
    /// everything added earlier.
    pub(crate) fn maintain(
        &mut self,
        components: &mut Vec<Component>,
        bubbles: &mut Vec<EntityId>,
        ids: &mut EntityAllocator,
    ) -> BubbleTurnover {
        let dead: HashSet<EntityId> = components
            .iter()
            .filter_map(Component::as_bubble)
            .filter(|bubble| bubble.is_dead())
            .map(Bubble::id)
            .collect();

        let mut turnover = BubbleTurnover {
            removed: dead.len(),
            spawned: None,
        };
        if !dead.is_empty() {
            bubbles.retain(|id| !dead.contains(id));
            components.retain(|component| !dead.contains(&component.id()));
        }

        if bubbles.len() < self.config.capacity && self.roll_spawn() {
            let bubble = self.spawn(ids.allocate());
            turnover.spawned = Some(bubble.id());
            bubbles.push(bubble.id());
            components.insert(0, Component::Bubble(bubble));
        }

        turnover
    }

    fn roll_spawn(&mut self) -> bool {
        self.rng.gen_range(1..=2) == 1
    }

    fn spawn(&mut self, id: EntityId) -> Bubble {
        let width = self.rng.gen_range(self.config.min_size..self.config.max_size);
        let height = self.rng.gen_range(self.config.min_size..self.config.max_size);
        let x = self.rng.gen_range(0.0..self.area.x);
        let y = self.rng.gen_range(0.0..self.area.y);
        let lifetime_ms = self
            .rng
            .gen_range(self.config.min_lifetime_ms..=self.config.max_lifetime_ms);

        Bubble::new(
            id,
            Vec2::new(x, y),
            Vec2::new(width, height),
            Duration::from_millis(lifetime_ms),
        )
    }
}
