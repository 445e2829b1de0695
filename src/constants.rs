//! Centralised gameplay, tracking and timing constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameConfig::default`] is built from these values; any of
//! them can be overridden at runtime through `assets/game.toml`.
//!
//! ## Coordinate space
//!
//! Playfield coordinates are pixels with the origin at the top-left corner and
//! +Y pointing down, matching what a camera image (and the window cursor)
//! reports.  The renderer converts to Bevy world space at draw time.

// ── Playfield ─────────────────────────────────────────────────────────────────

/// Playfield width in pixels.
pub const GAME_WIDTH: f32 = 800.0;

/// Playfield height in pixels.
pub const GAME_HEIGHT: f32 = 600.0;

/// Simulation tick rate (Hz).  The Simulation Loop runs in `FixedUpdate`.
pub const TICK_HZ: f64 = 60.0;

// ── Sensor / Camera ───────────────────────────────────────────────────────────

/// Width of the sensor image the raw points are expressed in.
pub const CAMERA_WIDTH: f32 = 640.0;

/// Height of the sensor image the raw points are expressed in.
pub const CAMERA_HEIGHT: f32 = 480.0;

/// Mirror raw X coordinates before mapping (selfie-style camera preview).
pub const CAMERA_MIRROR: bool = false;

// ── Chain (snake body) ────────────────────────────────────────────────────────

/// Draw radius of one body segment; also the clearance radius used for
/// item placement and half of it for the consumption test.
pub const SEGMENT_SIZE: f32 = 14.0;

/// Exact distance kept between consecutive chain points.
///
/// Smaller values give a smoother-looking body at the cost of more points.
pub const SEGMENT_SPACING: f32 = 5.0;

/// Number of chain points at the start of every round.  Must be ≥ 2.
pub const INITIAL_LENGTH: u32 = 7;

/// Chain points added per score point collected.
pub const GROWTH_RATE: u32 = 2;

/// Dead-zone radius around the head.  Targets closer than this do not move
/// the chain, which suppresses micro-jitter when the pointer rests on the head.
pub const MIN_MOVE_DISTANCE: f32 = 2.0;

/// Head speed cap in pixels per tick.
pub const MAX_SPEED: f32 = 4.0;

/// Multiplier applied to [`MAX_SPEED`] while a bonus boost is active.
pub const BOOST_MULTIPLIER: f32 = 1.5;

/// Fraction of the previous velocity retained each tick (first-order low-pass).
///
/// 0.8 keeps noticeable momentum; values near 1.0 make the chain sluggish.
pub const VELOCITY_INERTIA: f32 = 0.8;

/// Distance at which the desired speed reaches the cap.  Below this the
/// speed eases in linearly.
pub const EASE_DISTANCE: f32 = 100.0;

// ── Collisions ────────────────────────────────────────────────────────────────

/// Head-to-body distance that counts as a self-collision.
pub const COLLISION_THRESHOLD: f32 = 10.0;

/// Number of chain points nearest the head excluded from the self-collision test.
pub const SELF_COLLISION_IGNORE: usize = 5;

/// Distance from any playfield edge that counts as a wall hit.
pub const WALL_COLLISION_MARGIN: f32 = 5.0;

// ── Smoothing ─────────────────────────────────────────────────────────────────

/// Size of the weighted moving-average ring buffer.
pub const SMOOTHING_WINDOW: usize = 15;

/// Exponential smoothing factor α applied after the moving average.
pub const SMOOTHING_FACTOR: f32 = 0.15;

/// Raw points further than this from the last accepted point are treated as
/// a misdetection and the previous output is re-emitted.
pub const JUMP_THRESHOLD: f32 = 200.0;

/// Consecutive rejected jumps after which the new location is accepted as a
/// genuine relocation of the tracked point (≈ 1/3 s at a 30 fps camera).
pub const MAX_CONSECUTIVE_JUMPS: u32 = 10;

// ── Food ──────────────────────────────────────────────────────────────────────

/// Radius of a regular food item.
pub const FOOD_SIZE: f32 = 15.0;

/// Radius of a bonus food item.
pub const BONUS_FOOD_SIZE: f32 = 20.0;

/// Inset from the playfield edges inside which items are placed.
pub const FOOD_SPAWN_MARGIN: f32 = 50.0;

/// Extra clearance added to `SEGMENT_SIZE + item radius` when validating a placement.
pub const SPAWN_CLEARANCE_BUFFER: f32 = 10.0;

/// Placement attempts before an unvalidated position is accepted.
pub const SPAWN_ATTEMPTS: u32 = 100;

/// Seconds a consumed regular item stays hidden before reappearing.
pub const REGULAR_COOLDOWN: f32 = 0.5;

/// Score awarded by a regular item.
pub const REGULAR_SCORE: u32 = 1;

/// Score awarded by a bonus item.
pub const BONUS_SCORE: u32 = 5;

/// Boost duration (seconds) granted by a bonus item.
pub const BONUS_BOOST_DURATION: f32 = 5.0;

/// Delay from round start until the first bonus item may appear.
pub const FIRST_BONUS_DELAY: f32 = 15.0;

/// Lower bound of the randomised bonus re-arm interval (seconds).
pub const BONUS_INTERVAL_MIN: f32 = 20.0;

/// Upper bound of the randomised bonus re-arm interval (seconds).
pub const BONUS_INTERVAL_MAX: f32 = 30.0;

/// A bonus item only spawns while fewer than this many items are active.
pub const MAX_ACTIVE_ITEMS: usize = 2;

// ── Session ───────────────────────────────────────────────────────────────────

/// Seconds the sensor must report continuous detection to start a round.
pub const START_DWELL: f32 = 0.5;

/// Duration of the red flash drawn after a collision.
pub const GAME_OVER_FLASH: f32 = 0.5;

// ── Sampling thread ───────────────────────────────────────────────────────────

/// Pause between sampling iterations (milliseconds).
pub const SAMPLER_IDLE_MS: u64 = 10;

/// Pause before retrying after the sensor produced no frame (milliseconds).
pub const SENSOR_RETRY_MS: u64 = 10;

/// Bounded wait for the sampling thread to exit at shutdown (seconds).
pub const SAMPLER_SHUTDOWN_TIMEOUT: f32 = 1.0;

/// Native cadence of the demo sensors (milliseconds, ≈ 30 fps camera).
pub const SENSOR_CADENCE_MS: u64 = 33;

// ── Persistence ───────────────────────────────────────────────────────────────

/// Default location of the high-score file.
pub const HIGH_SCORE_PATH: &str = "highscore.toml";

// ── Rendering ─────────────────────────────────────────────────────────────────

/// HUD font size.
pub const HUD_FONT_SIZE: f32 = 20.0;
