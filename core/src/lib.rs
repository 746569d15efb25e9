#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Fear the Water level engine.
//!
//! This crate defines the data that flows between adapters, the level world
//! and the bootstrap system: the cell bitmask encoding used by level maps,
//! the validated [`LevelMap`] built from a JSON [`LevelDocument`], the explicit
//! [`GameConfig`] handed to constructors, and the [`EventBus`] through which
//! click and teardown notifications are delivered.

use std::{fmt, time::Duration};

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "FEAR THE WATER";

bitflags! {
    /// Independent flags packed into a single level-map cell.
    ///
    /// The bit layout is the level file format and must not change.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CellFlags: u8 {
        /// Cell is occupied by a solid wall tile.
        const SOLID = 0b0001;
        /// Cell contains the level's hole.
        const HOLE = 0b0010;
        /// Reserved tree decoration variant. Carried through but not interpreted.
        const TREE = 0b0100;
        /// Cell marks the player's starting position.
        const PLAYER_START = 0b1000;
    }
}

impl CellFlags {
    /// Whether the cell carries the solid wall bit.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.contains(Self::SOLID)
    }

    /// Whether the cell carries the hole bit.
    #[must_use]
    pub const fn is_hole(&self) -> bool {
        self.contains(Self::HOLE)
    }

    /// Whether the cell carries the player start bit.
    #[must_use]
    pub const fn is_player_start(&self) -> bool {
        self.contains(Self::PLAYER_START)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Top-left corner of the cell in logical pixels.
    #[must_use]
    pub fn anchor(&self, grid_size: f32) -> Vec2 {
        Vec2::new(self.column as f32 * grid_size, self.row as f32 * grid_size)
    }

    /// Centre of the cell in logical pixels.
    #[must_use]
    pub fn center(&self, grid_size: f32) -> Vec2 {
        self.anchor(grid_size) + Vec2::splat(grid_size * 0.5)
    }
}

/// Unique identifier assigned to an entity owned by a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised while turning raw level data into a [`LevelMap`].
#[derive(Debug, Error)]
pub enum LevelMapError {
    /// A row's length differs from the first row's.
    #[error("level map row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Zero-based index of the offending row.
        row: u32,
        /// Number of cells found in the offending row.
        found: usize,
        /// Number of cells found in the first row.
        expected: usize,
    },
    /// A cell uses bits outside of the documented encoding.
    #[error("level map cell ({column}, {row}) has unknown bits in value {value}")]
    UnknownBits {
        /// Column of the offending cell.
        column: u32,
        /// Row of the offending cell.
        row: u32,
        /// Raw cell value.
        value: u32,
    },
    /// The document is not valid level JSON.
    #[error("could not parse level document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rectangular, row-major grid of validated cell flags.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LevelMap {
    columns: u32,
    rows: u32,
    cells: Vec<CellFlags>,
}

impl LevelMap {
    /// Builds a map from raw row-major values, rejecting ragged grids and unknown bits.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, LevelMapError>
    where
        R: AsRef<[u32]>,
    {
        let expected = rows.first().map_or(0, |row| row.as_ref().len());
        let mut cells = Vec::with_capacity(expected * rows.len());

        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != expected {
                return Err(LevelMapError::Ragged {
                    row: row_index as u32,
                    found: row.len(),
                    expected,
                });
            }

            for (column_index, &value) in row.iter().enumerate() {
                let flags = u8::try_from(value)
                    .ok()
                    .and_then(CellFlags::from_bits)
                    .ok_or(LevelMapError::UnknownBits {
                        column: column_index as u32,
                        row: row_index as u32,
                        value,
                    })?;
                cells.push(flags);
            }
        }

        let columns = if cells.is_empty() { 0 } else { expected as u32 };
        let rows = if cells.is_empty() { 0 } else { rows.len() as u32 };

        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Number of columns contained in the map.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the map.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Returns `true` when the map holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flags stored at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<CellFlags> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.cells.get(index).copied()
    }

    /// Whether the provided cell lies inside the grid and carries the solid bit.
    #[must_use]
    pub fn is_solid(&self, cell: CellCoord) -> bool {
        self.get(cell).is_some_and(|flags| flags.is_solid())
    }

    /// Iterates over every cell in row-major scan order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellFlags)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, flags)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *flags)
        })
    }
}

/// Serialized level description as shipped in level JSON files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDocument {
    /// Hex colour of the translucent water wash, if any.
    #[serde(default)]
    pub background: Option<String>,
    /// Row-major grid of raw cell bitmasks.
    pub map: Vec<Vec<u32>>,
}

impl LevelDocument {
    /// Parses a level document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, LevelMapError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validates the raw grid into a [`LevelMap`].
    pub fn level_map(&self) -> Result<LevelMap, LevelMapError> {
        LevelMap::from_rows(&self.map)
    }
}

/// Errors reported when validating a [`GameConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Screen dimensions must both be positive and finite.
    #[error("screen size must be positive and finite (received {width}x{height})")]
    NonPositiveScreen {
        /// Configured logical screen width.
        width: f32,
        /// Configured logical screen height.
        height: f32,
    },
    /// Grid cells must have a positive, finite side length.
    #[error("grid size must be positive and finite (received {0})")]
    NonPositiveGridSize(f32),
    /// The surface scale factor must be positive and finite.
    #[error("scale must be positive and finite (received {0})")]
    NonPositiveScale(f32),
    /// Bubble sizes must form a non-empty, positive, finite range.
    #[error("bubble size range {min}..{max} is empty, non-positive or unbounded")]
    InvalidBubbleSize {
        /// Configured minimum bubble edge.
        min: f32,
        /// Configured maximum bubble edge (exclusive).
        max: f32,
    },
    /// Bubble lifetimes must satisfy `min <= max` and be non-zero.
    #[error("bubble lifetime range {min_ms}..={max_ms}ms is invalid")]
    InvalidBubbleLifetime {
        /// Configured minimum lifetime in milliseconds.
        min_ms: u64,
        /// Configured maximum lifetime in milliseconds.
        max_ms: u64,
    },
}

/// Tuning for the decorative bubble pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    /// Soft cap on live bubbles, checked once per frame.
    pub capacity: usize,
    /// Smallest bubble edge in logical pixels (inclusive).
    pub min_size: f32,
    /// Largest bubble edge in logical pixels (exclusive).
    pub max_size: f32,
    /// Shortest bubble lifetime in milliseconds.
    pub min_lifetime_ms: u64,
    /// Longest bubble lifetime in milliseconds.
    pub max_lifetime_ms: u64,
}

impl BubbleConfig {
    /// Default soft cap on live bubbles.
    pub const DEFAULT_CAPACITY: usize = 40;

    /// Shortest configured lifetime.
    #[must_use]
    pub const fn min_lifetime(&self) -> Duration {
        Duration::from_millis(self.min_lifetime_ms)
    }

    /// Longest configured lifetime.
    #[must_use]
    pub const fn max_lifetime(&self) -> Duration {
        Duration::from_millis(self.max_lifetime_ms)
    }
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            min_size: 10.0,
            max_size: 50.0,
            min_lifetime_ms: 2_000,
            max_lifetime_ms: 6_000,
        }
    }
}

/// Explicit game configuration handed to level constructors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Logical screen width.
    pub screen_width: f32,
    /// Logical screen height.
    pub screen_height: f32,
    /// Side length of a single map cell in logical pixels.
    pub grid_size: f32,
    /// Uniform multiplier from logical coordinates to surface pixels.
    pub scale: f32,
    /// Seed for the decorative random number generator.
    pub rng_seed: u64,
    /// Bubble pool tuning.
    pub bubbles: BubbleConfig,
}

impl GameConfig {
    /// Logical screen dimensions.
    #[must_use]
    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.screen_width, self.screen_height)
    }

    /// Checks that every value is usable by the level and the adapters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(is_positive_finite(self.screen_width) && is_positive_finite(self.screen_height)) {
            return Err(ConfigError::NonPositiveScreen {
                width: self.screen_width,
                height: self.screen_height,
            });
        }
        if !is_positive_finite(self.grid_size) {
            return Err(ConfigError::NonPositiveGridSize(self.grid_size));
        }
        if !is_positive_finite(self.scale) {
            return Err(ConfigError::NonPositiveScale(self.scale));
        }

        let bubbles = &self.bubbles;
        if !(is_positive_finite(bubbles.min_size)
            && is_positive_finite(bubbles.max_size)
            && bubbles.min_size < bubbles.max_size)
        {
            return Err(ConfigError::InvalidBubbleSize {
                min: bubbles.min_size,
                max: bubbles.max_size,
            });
        }
        if bubbles.min_lifetime_ms == 0 || bubbles.min_lifetime_ms > bubbles.max_lifetime_ms {
            return Err(ConfigError::InvalidBubbleLifetime {
                min_ms: bubbles.min_lifetime_ms,
                max_ms: bubbles.max_lifetime_ms,
            });
        }

        Ok(())
    }
}

fn is_positive_finite(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 640.0,
            screen_height: 640.0,
            grid_size: 32.0,
            scale: 1.0,
            rng_seed: 0x5eed_b0b0_cafe_f00d,
            bubbles: BubbleConfig::default(),
        }
    }
}

/// Channels that subscribers can listen on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Pointer presses resolved to an entity.
    Click,
    /// Teardown notifications.
    Destroy,
}

/// Notifications broadcast through the [`EventBus`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// A pointer press landed on an entity.
    Clicked {
        /// Entity under the pointer.
        entity: EntityId,
        /// Press location in logical coordinates.
        position: Vec2,
    },
    /// An entity was torn down together with its owner.
    Destroyed {
        /// Entity that no longer exists.
        entity: EntityId,
    },
}

impl Event {
    /// Topic the event is delivered on.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::Clicked { .. } => Topic::Click,
            Self::Destroyed { .. } => Topic::Destroy,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    topic: Topic,
    handler: Box<dyn FnMut(&Event)>,
}

/// Single-threaded publish/subscribe registry.
///
/// Handlers run synchronously inside [`EventBus::emit`], in subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for every event published on `topic`.
    pub fn subscribe<F>(&mut self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscribers.push(Subscriber {
            id,
            topic,
            handler: Box::new(handler),
        });
        id
    }

    /// Removes a handler. Returns `false` when the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| subscriber.id != id);
        self.subscribers.len() != before
    }

    /// Delivers the event to every handler subscribed to its topic.
    pub fn emit(&mut self, event: Event) {
        let topic = event.topic();
        for subscriber in self
            .subscribers
            .iter_mut()
            .filter(|subscriber| subscriber.topic == topic)
        {
            (subscriber.handler)(&event);
        }
    }

    /// Number of handlers currently listening on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers
            .iter()
            .filter(|subscriber| subscriber.topic == topic)
            .count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("next_id", &self.next_id)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
