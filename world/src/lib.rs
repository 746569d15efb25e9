#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Fear the Water.
//!
//! A [`Level`] is built once from a [`LevelDocument`]: the loader turns the
//! bitmask grid into floor tiles, structural walls and the hole, after which
//! every frame ages the live entities, refreshes the decorative bubble pool and
//! draws the layers onto a [`Surface`] in a fixed order.

mod bubbles;
mod entities;
mod loader;

use std::time::Duration;

use fear_the_water_core::{
    ConfigError, EntityId, Event, EventBus, GameConfig, LevelDocument, LevelMapError,
};
use fear_the_water_rendering::{Color, Renderable, RenderingError, Surface};
use glam::Vec2;
use thiserror::Error;

pub use entities::{
    Bubble, Component, Hole, Tile, TileKind, BUBBLE_COLOR, FLOOR_COLOR, HOLE_COLOR, WALL_COLOR,
};

use bubbles::BubblePool;

/// Level shipped with the game and used when no level file is supplied.
pub const DEFAULT_LEVEL_JSON: &str = include_str!("../levels/level.001.json");

/// Parses the embedded default level.
pub fn default_level_document() -> Result<LevelDocument, LevelMapError> {
    LevelDocument::from_json(DEFAULT_LEVEL_JSON)
}

/// Errors raised while constructing a [`Level`].
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level map could not be parsed or validated.
    #[error(transparent)]
    Map(#[from] LevelMapError),
    /// The background colour is not a recognised hex colour.
    #[error("invalid level background: {0}")]
    Background(#[from] RenderingError),
    /// The game configuration is unusable.
    #[error("invalid game configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Hands out entity identifiers that are unique within a level.
#[derive(Debug, Default)]
pub(crate) struct EntityAllocator {
    next: u32,
}

impl EntityAllocator {
    pub(crate) fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// A loaded level together with its live decorative state.
#[derive(Debug)]
pub struct Level {
    config: GameConfig,
    size: Vec2,
    background: Option<Color>,
    floor: Vec<Tile>,
    components: Vec<Component>,
    bubbles: Vec<EntityId>,
    hole: Option<EntityId>,
    player_initial_position: Vec2,
    bubble_pool: BubblePool,
    ids: EntityAllocator,
}

impl Level {
    /// Validates the configuration and document and builds the level entities.
    pub fn new(config: GameConfig, document: &LevelDocument) -> Result<Self, LevelError> {
        config.validate()?;
        let background = document
            .background
            .as_deref()
            .map(Color::from_hex)
            .transpose()?;
        let map = document.level_map()?;

        let mut ids = EntityAllocator::default();
        let loaded = loader::load(&map, config.grid_size, &mut ids);
        let size = Vec2::new(
            map.columns() as f32 * config.grid_size,
            map.rows() as f32 * config.grid_size,
        );

        tracing::info!(
            columns = map.columns(),
            rows = map.rows(),
            floor = loaded.floor.len(),
            components = loaded.components.len(),
            merged = loaded.merged,
            hole = loaded.hole.map(|id| id.get()),
            "level loaded"
        );

        let bubble_pool =
            BubblePool::new(config.bubbles.clone(), config.screen_size(), config.rng_seed);

        Ok(Self {
            size,
            background,
            floor: loaded.floor,
            components: loaded.components,
            bubbles: Vec::new(),
            hole: loaded.hole,
            player_initial_position: loaded.player_start,
            bubble_pool,
            ids,
            config,
        })
    }

    /// Configuration the level was built with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Advances every component by `dt`.
    pub fn update(&mut self, dt: Duration) {
        for component in &mut self.components {
            component.update(dt);
        }
    }

    /// Draws one frame.
    ///
    /// The screen is cleared, the floor is drawn, the water wash is laid over
    /// it, the bubble pool is refreshed and finally every component is drawn in
    /// collection order.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        surface.clear_rect(Vec2::ZERO, self.config.screen_size());

        for tile in &self.floor {
            tile.render(surface);
        }

        if let Some(background) = self.background {
            surface.fill_rect(Vec2::ZERO, self.size, background);
        }

        let turnover =
            self.bubble_pool
                .maintain(&mut self.components, &mut self.bubbles, &mut self.ids);
        if turnover.removed > 0 || turnover.spawned.is_some() {
            tracing::trace!(
                removed = turnover.removed,
                spawned = turnover.spawned.map(|id| id.get()),
                live = self.bubbles.len(),
                "bubble pool refreshed"
            );
        }

        for component in &self.components {
            component.render(surface);
        }
    }

    /// Topmost component whose bounds contain `point`, in logical coordinates.
    #[must_use]
    pub fn entity_at(&self, point: Vec2) -> Option<EntityId> {
        self.components
            .iter()
            .rev()
            .find(|component| component.contains(point))
            .map(Component::id)
    }

    /// Tears the level down, announcing every owned entity on `bus`.
    ///
    /// Floor tiles are announced first, followed by components in collection
    /// order.
    pub fn destroy(self, bus: &mut EventBus) {
        let floor = self.floor.iter().map(Tile::id);
        let components = self.components.iter().map(Component::id);
        let mut announced = 0_usize;
        for entity in floor.chain(components) {
            bus.emit(Event::Destroyed { entity });
            announced += 1;
        }
        tracing::debug!(entities = announced, "level destroyed");
    }
}

/// Read-only queries over a [`Level`].
pub mod query {
    use fear_the_water_core::EntityId;
    use fear_the_water_rendering::Color;
    use glam::Vec2;

    use super::{Bubble, Component, Hole, Level, Tile};

    /// Centre of the player start cell, or the origin when the map has none.
    #[must_use]
    pub fn player_initial_position(level: &Level) -> Vec2 {
        level.player_initial_position
    }

    /// Logical width and height covered by the map.
    #[must_use]
    pub fn size(level: &Level) -> Vec2 {
        level.size
    }

    /// Colour of the water wash, if the level defines one.
    #[must_use]
    pub fn background(level: &Level) -> Option<Color> {
        level.background
    }

    /// Floor tiles in scan order.
    #[must_use]
    pub fn floor(level: &Level) -> &[Tile] {
        &level.floor
    }

    /// Render/update collection in draw order.
    #[must_use]
    pub fn components(level: &Level) -> &[Component] {
        &level.components
    }

    /// Structural wall tiles in scan order.
    pub fn tiles(level: &Level) -> impl Iterator<Item = &Tile> + '_ {
        level.components.iter().filter_map(Component::as_tile)
    }

    /// The level's hole, if the map contains one.
    #[must_use]
    pub fn hole(level: &Level) -> Option<&Hole> {
        let id = level.hole?;
        level
            .components
            .iter()
            .filter_map(Component::as_hole)
            .find(|hole| hole.id() == id)
    }

    /// Live bubbles in spawn order.
    pub fn bubbles(level: &Level) -> impl Iterator<Item = &Bubble> + '_ {
        level.bubbles.iter().filter_map(|id| {
            level
                .components
                .iter()
                .filter_map(Component::as_bubble)
                .find(|bubble| bubble.id() == *id)
        })
    }

    /// Number of live bubbles.
    #[must_use]
    pub fn bubble_count(level: &Level) -> usize {
        level.bubbles.len()
    }

    /// Soft cap on live bubbles.
    #[must_use]
    pub fn bubble_capacity(level: &Level) -> usize {
        level.bubble_pool.capacity()
    }

    /// Identifiers of every entity the level owns, floor first.
    #[must_use]
    pub fn entity_ids(level: &Level) -> Vec<EntityId> {
        level
            .floor
            .iter()
            .map(Tile::id)
            .chain(level.components.iter().map(Component::id))
            .collect()
    }
}
