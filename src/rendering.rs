//! Rendering systems: gizmo playfield and HUD text.
//!
//! ## Layer Model
//!
//! | Layer            | Technology | Shown                       |
//! |------------------|------------|-----------------------------|
//! | Border           | Gizmos     | always                      |
//! | Items            | Gizmos     | `Playing`, visible items    |
//! | Chain            | Gizmos     | `Playing` / `GameOver`      |
//! | Pointer marker   | Gizmos     | while the target is tracked |
//! | Collision flash  | Bevy UI    | `game_over_flash` seconds   |
//! | Paused banner    | Bevy UI    | while paused                |
//! | Score HUD        | Bevy UI    | always                      |
//!
//! Core positions use a top-left origin with y down; [`to_world`] converts
//! them into the centred, y-up space of the 2D camera.

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::food::FoodKind;
use crate::menu::GamePhase;
use crate::simulation::ActiveSession;
use crate::Point;

/// Marker for the score HUD text.
#[derive(Component)]
pub struct HudText;

/// Marker for the full-screen red flash shown on collision.
#[derive(Component)]
pub struct FlashOverlay;

/// Marker for the "PAUSED" banner.
#[derive(Component)]
pub struct PausedBanner;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud).add_systems(
            Update,
            (
                draw_border_system,
                draw_items_system.run_if(in_state(GamePhase::Playing)),
                draw_chain_system.run_if(not(in_state(GamePhase::Menu))),
                draw_pointer_system,
                hud_text_system,
                overlay_visibility_system,
            ),
        );
    }
}

/// Playfield point → world position.
#[inline]
pub fn to_world(p: Point, config: &GameConfig) -> Vec2 {
    Vec2::new(
        p.x - config.game_width * 0.5,
        config.game_height * 0.5 - p.y,
    )
}

fn chain_color(boosted: bool) -> Color {
    if boosted {
        Color::srgb(0.2, 0.8, 1.0)
    } else {
        Color::srgb(0.25, 0.85, 0.35)
    }
}

// ── Startup: HUD nodes ────────────────────────────────────────────────────────

pub fn setup_hud(mut commands: Commands, config: Res<GameConfig>) {
    commands.spawn((
        Text::new("Score: 0"),
        TextFont {
            font_size: config.hud_font_size,
            ..default()
        },
        TextColor(Color::srgb(0.95, 0.88, 0.45)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        HudText,
    ));

    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        BackgroundColor(Color::srgba(1.0, 0.0, 0.0, 0.4)),
        ZIndex(200),
        Visibility::Hidden,
        FlashOverlay,
    ));

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            Visibility::Hidden,
            PausedBanner,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("PAUSED"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.9, 0.2)),
            ));
        });
}

// ── Update: gizmos ────────────────────────────────────────────────────────────

pub fn draw_border_system(mut gizmos: Gizmos, config: Res<GameConfig>) {
    let half = Vec2::new(config.game_width, config.game_height) * 0.5;
    let m = config.wall_collision_margin;
    let inner = half - Vec2::splat(m);
    gizmos.linestrip_2d(
        [
            Vec2::new(-inner.x, -inner.y),
            Vec2::new(inner.x, -inner.y),
            Vec2::new(inner.x, inner.y),
            Vec2::new(-inner.x, inner.y),
            Vec2::new(-inner.x, -inner.y),
        ],
        Color::srgb(0.35, 0.35, 0.4),
    );
}

pub fn draw_chain_system(
    mut gizmos: Gizmos,
    session: Res<ActiveSession>,
    config: Res<GameConfig>,
    time: Res<Time<Fixed>>,
) {
    let chain = session.0.chain();
    let color = chain_color(chain.is_boosted(time.elapsed_secs()));
    let radius = config.segment_size * 0.5;

    let world: Vec<Vec2> = chain.points().map(|p| to_world(p, &config)).collect();
    gizmos.linestrip_2d(world.iter().copied(), color.with_alpha(0.5));
    for p in world.iter().skip(1) {
        gizmos.circle_2d(*p, radius, color);
    }
    if let Some(head) = world.first() {
        gizmos.circle_2d(*head, radius, Color::WHITE);
    }
}

pub fn draw_items_system(mut gizmos: Gizmos, session: Res<ActiveSession>, config: Res<GameConfig>) {
    for item in session.0.targets().items().iter().filter(|i| i.visible) {
        let color = match item.kind {
            FoodKind::Regular => Color::srgb(1.0, 0.25, 0.25),
            FoodKind::Bonus => Color::srgb(1.0, 0.85, 0.1),
        };
        let pos = to_world(item.position, &config);
        gizmos.circle_2d(pos, item.radius, color);
        if item.is_special() {
            gizmos.circle_2d(pos, item.radius * 0.5, color);
        }
    }
}

pub fn draw_pointer_system(mut gizmos: Gizmos, session: Res<ActiveSession>, config: Res<GameConfig>) {
    if !session.0.is_tracking() {
        return;
    }
    if let Some(target) = session.0.last_target() {
        let pos = to_world(target, &config);
        gizmos.circle_2d(pos, 10.0, Color::srgb(0.2, 0.4, 1.0));
        gizmos.circle_2d(pos, 3.0, Color::WHITE);
    }
}

// ── Update: HUD ───────────────────────────────────────────────────────────────

pub fn hud_text_system(
    session: Res<ActiveSession>,
    time: Res<Time<Fixed>>,
    mut query: Query<&mut Text, With<HudText>>,
) {
    let s = &session.0;
    let now = time.elapsed_secs();
    let mut line = format!("Score: {}   High: {}", s.score(), s.high_score());
    let boost = s.chain().boost_remaining(now);
    if boost > 0.0 {
        line.push_str(&format!("   Boost: {boost:.1}s"));
    }
    line.push_str(if s.is_tracking() {
        "   Sensor: tracking"
    } else {
        "   Sensor: lost"
    });

    for mut text in query.iter_mut() {
        if text.0 != line {
            text.0 = line.clone();
        }
    }
}

#[allow(clippy::type_complexity)]
pub fn overlay_visibility_system(
    session: Res<ActiveSession>,
    time: Res<Time<Fixed>>,
    mut flash: Query<&mut Visibility, (With<FlashOverlay>, Without<PausedBanner>)>,
    mut banner: Query<&mut Visibility, (With<PausedBanner>, Without<FlashOverlay>)>,
) {
    let show = |on: bool| if on { Visibility::Inherited } else { Visibility::Hidden };
    let flash_on = show(session.0.flash_active(time.elapsed_secs()));
    let paused_on = show(session.0.is_paused());
    for mut vis in flash.iter_mut() {
        vis.set_if_neq(flash_on);
    }
    for mut vis in banner.iter_mut() {
        vis.set_if_neq(paused_on);
    }
}
