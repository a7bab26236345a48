use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;
use thiserror::Error;

use config::{ConfigError, PuzzleConfig};
use flow::{FlowEvent, GameState};
use input::sample_input;
use save::{SaveError, ScoreBook};
use session::Session;
use tile::{Content, TileEvent};
use topology::TileId;

mod app;
pub mod config;
pub mod flow;
pub mod grid;
pub mod input;
pub mod save;
pub mod selection;
pub mod session;
pub mod tile;
pub mod timer;
pub mod topology;

const TILE_GAP: f32 = 4.;
const FRAME_BORDER: f32 = 8.;
const LABEL_SIZE: f32 = 48.;
const HOVER_ALPHA: f32 = 0.5;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Save(#[from] SaveError),
}

#[derive(Resource)]
struct HighScores(ScoreBook);

/// Flow events pushed by the session observer, drained once per frame.
#[derive(Resource, Default)]
struct FlowInbox(Arc<Mutex<Vec<FlowEvent>>>);

#[derive(Component)]
struct MainCamera;

#[derive(Component)]
struct TileVisual {
    tile: TileId,
}

#[derive(Component)]
struct TileLabel {
    tile: TileId,
}

#[derive(Component)]
struct DragProxy;

#[derive(Component)]
struct DragProxyLabel;

#[derive(Component)]
struct StatusText;

#[derive(Component)]
struct TimerText;

#[derive(Component)]
struct BannerText;

pub fn run(config: PuzzleConfig) -> Result<(), SetupError> {
    let mut session = Session::new(&config)?;
    let scores = ScoreBook::open(&config.save_file)?;

    let inbox = FlowInbox::default();
    let queue = Arc::clone(&inbox.0);
    session.subscribe(move |event| queue.lock().push(event));

    app::default_app(env!("CARGO_PKG_NAME"))
        .insert_resource(session)
        .insert_resource(HighScores(scores))
        .insert_resource(inbox)
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                drive_session,
                restart_on_press,
                apply_tile_events,
                follow_drag_proxy,
                handle_flow_events,
                update_timer_text,
            )
                .chain(),
        )
        .run();
    Ok(())
}

fn piece_color(piece: u8, pieces: usize) -> Color {
    Color::hsl(360. * piece as f32 / pieces.max(1) as f32, 0.55, 0.6)
}

fn label(content: Content) -> String {
    content
        .piece()
        .map_or_else(String::new, |piece| (piece as u16 + 1).to_string())
}

fn setup(mut commands: Commands, session: Res<Session>, scores: Res<HighScores>) {
    let grid = session.grid();
    let cell_size = grid.cell_size();
    let board_width = grid.topology().width() as f32 * cell_size;
    let board_height = grid.topology().height() as f32 * cell_size;

    commands.spawn(Camera2d).insert(MainCamera);

    // Frame
    commands
        .spawn((
            Sprite::from_color(
                Color::WHITE,
                Vec2::new(board_width + 2. * FRAME_BORDER, board_height + 2. * FRAME_BORDER),
            ),
            Transform::from_xyz(0., 0., -10.),
        ))
        .with_children(|parent| {
            parent.spawn((
                Sprite::from_color(Color::BLACK, Vec2::new(board_width, board_height)),
                Transform::from_xyz(0., 0., 5.),
            ));
        });

    let tile_size = Vec2::splat(cell_size - TILE_GAP);
    for (id, tile) in grid.tiles() {
        let content = tile.content();
        let color = content
            .piece()
            .map_or(Color::NONE, |piece| piece_color(piece, grid.len()));
        commands
            .spawn((
                Sprite::from_color(color, tile_size),
                Transform::from_translation(tile.anchor().extend(0.)),
                TileVisual { tile: id },
            ))
            .with_child((
                Text2d::new(label(content)),
                TextFont {
                    font_size: LABEL_SIZE,
                    ..default()
                },
                TextColor(Color::BLACK),
                Transform::from_xyz(0., 0., 1.),
                TileLabel { tile: id },
            ));
    }

    commands
        .spawn((
            Sprite::from_color(Color::WHITE, tile_size),
            Transform::from_xyz(0., 0., 10.),
            Visibility::Hidden,
            DragProxy,
        ))
        .with_child((
            Text2d::default(),
            TextFont {
                font_size: LABEL_SIZE,
                ..default()
            },
            TextColor(Color::BLACK),
            Transform::from_xyz(0., 0., 1.),
            DragProxyLabel,
        ));

    let top = board_height / 2. + FRAME_BORDER;
    commands.spawn((
        Text2d::new(session.countdown().display()),
        TextFont {
            font_size: 40.,
            ..default()
        },
        TextColor(Color::WHITE),
        Transform::from_xyz(0., top + 40., 10.),
        TimerText,
    ));
    commands.spawn((
        Text2d::new("Tap to start"),
        TextFont {
            font_size: 32.,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(JustifyText::Center),
        Transform::from_xyz(0., top + 100., 10.),
        StatusText,
    ));
    commands.spawn((
        Text2d::new(scores.0.banner().unwrap_or_default()),
        TextFont {
            font_size: 24.,
            ..default()
        },
        TextColor(Color::WHITE),
        Transform::from_xyz(0., -top - 40., 10.),
        BannerText,
    ));
}

fn drive_session(
    window: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    time: Res<Time>,
    mut session: ResMut<Session>,
) {
    let sample = sample_input(&mouse_button_input, &touch_input, &window, &camera);
    let outcome = session.tick(&sample, time.delta_secs());
    if outcome.moved {
        debug!("board after move\n{}", session.grid());
    }
}

// Any press outside a running game deals a new board.
fn restart_on_press(
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut session: ResMut<Session>,
) {
    let pressed =
        mouse_button_input.just_pressed(MouseButton::Left) || touch_input.any_just_pressed();
    if pressed && session.state() != GameState::Going {
        session.shuffle();
    }
}

fn apply_tile_events(
    mut session: ResMut<Session>,
    mut tiles: Query<(&TileVisual, &mut Sprite)>,
    mut labels: Query<(&TileLabel, &mut Text2d)>,
) {
    let events = session.drain_tile_events();
    if events.is_empty() {
        return;
    }
    let grid = session.grid();
    let pieces = grid.len();

    for event in events {
        let (tile, color, text) = match event {
            TileEvent::Content { tile, content } => (
                tile,
                content
                    .piece()
                    .map_or(Color::NONE, |piece| piece_color(piece, pieces)),
                label(content),
            ),
            TileEvent::Hover {
                tile,
                preview: Some(piece),
            } => (
                tile,
                piece_color(piece, pieces).with_alpha(HOVER_ALPHA),
                label(Content::Piece(piece)),
            ),
            TileEvent::Hover {
                tile,
                preview: None,
            } => {
                let content = grid.content(tile).unwrap_or(Content::Empty);
                let color = content
                    .piece()
                    .map_or(Color::NONE, |piece| piece_color(piece, pieces));
                (tile, color, label(content))
            }
        };

        for (visual, mut sprite) in &mut tiles {
            if visual.tile == tile {
                sprite.color = color;
            }
        }
        for (tile_label, mut label_text) in &mut labels {
            if tile_label.tile == tile {
                label_text.0.clone_from(&text);
            }
        }
    }
}

fn follow_drag_proxy(
    session: Res<Session>,
    mut proxy: Query<(&mut Transform, &mut Visibility, &mut Sprite), With<DragProxy>>,
    mut proxy_label: Query<&mut Text2d, With<DragProxyLabel>>,
) {
    let Ok((mut transform, mut visibility, mut sprite)) = proxy.get_single_mut() else {
        return;
    };

    let Some((tile, position)) = session.selection().drag_proxy() else {
        *visibility = Visibility::Hidden;
        return;
    };

    let content = session.grid().content(tile).unwrap_or(Content::Empty);
    if let Some(piece) = content.piece() {
        sprite.color = piece_color(piece, session.grid().len());
    }
    transform.translation = position.extend(transform.translation.z);
    *visibility = Visibility::Visible;
    if let Ok(mut text) = proxy_label.get_single_mut() {
        text.0 = label(content);
    }
}

fn handle_flow_events(
    inbox: Res<FlowInbox>,
    session: Res<Session>,
    mut scores: ResMut<HighScores>,
    mut status: Query<&mut Text2d, (With<StatusText>, Without<BannerText>)>,
    mut banner: Query<&mut Text2d, (With<BannerText>, Without<StatusText>)>,
) {
    let events = inbox.0.lock().drain(..).collect::<Vec<_>>();

    for event in events {
        let message = match event {
            FlowEvent::Started => String::new(),
            FlowEvent::Won => {
                let score = session.time_score();
                info!("solved in {score:.2}s");
                if let Err(err) = scores.0.check_and_save(score) {
                    error!("{err}");
                }
                if let Ok(mut text) = banner.get_single_mut() {
                    text.0 = scores.0.banner().unwrap_or_default();
                }
                "Good job!\nTap to play again".to_string()
            }
            FlowEvent::Lost => "Time's up!\nTap to play again".to_string(),
            FlowEvent::TileMoved => continue,
        };

        if let Ok(mut text) = status.get_single_mut() {
            text.0 = message;
        }
    }
}

fn update_timer_text(session: Res<Session>, mut timer: Query<&mut Text2d, With<TimerText>>) {
    if let Ok(mut text) = timer.get_single_mut() {
        text.0 = session.countdown().display();
    }
}
