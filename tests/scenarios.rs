use std::f32::consts::FRAC_PI_2;

use grid_raycaster::{
    Camera, ChannelLayout, Command, Engine, RayCaster, RenderConfig, Side, Texture, TextureBank,
    TileMap, Vec2,
};

fn corridor_map() -> TileMap {
    // Three cells wide (rows 4..=6), running east from x = 1 to x = 8
    TileMap::parse(&[
        "1111111111",
        "1111111111",
        "1111111111",
        "1........1",
        "1s.......1",
        "1........1",
        "1111111111",
        "1111111111",
        "1111111111",
        "1111111111",
    ])
    .unwrap()
}

fn open_room() -> TileMap {
    TileMap::parse(&[
        "1111111111",
        "1........1",
        "1........1",
        "1........1",
        "1........1",
        "1........1",
        "1........1",
        "1........1",
        "1........1",
        "1111111111",
    ])
    .unwrap()
}

#[test]
fn corridor_center_sees_the_far_wall() {
    let map = corridor_map();
    let cam = Camera::new(Vec2::new(1.5, 5.5), 0.0, 60f32.to_radians(), 20.0);
    let width = 120;
    let caster = RayCaster::new(&map, &cam, width);

    let center = caster.cast(width / 2);
    assert_eq!(center.wall, Some(1));
    assert_eq!(center.side, Side::Vertical);
    assert!((center.distance - 7.5).abs() < 1e-4);

    // Outer columns fan into the corridor's side walls much sooner
    for x in [0, width - 1] {
        let edge = caster.cast(x);
        assert_eq!(edge.side, Side::Horizontal);
        assert!(edge.distance < 3.0, "column {x}: {}", edge.distance);
    }
}

#[test]
fn open_room_east_wall_distance() {
    let map = open_room();
    let cam = Camera::new(Vec2::new(5.5, 5.5), 0.0, 60f32.to_radians(), 4.5);
    let hit = RayCaster::new(&map, &cam, 200).cast(100);
    assert_eq!(hit.wall, Some(1));
    assert_eq!(hit.side, Side::Vertical);
    assert!((hit.distance - 3.5).abs() < 1e-5);
}

#[test]
fn flat_wall_has_no_fisheye() {
    let map = open_room();
    let cam = Camera::new(Vec2::new(5.5, 5.5), 0.0, 60f32.to_radians(), 4.5);
    let caster = RayCaster::new(&map, &cam, 160);
    for x in 0..160 {
        let hit = caster.cast(x);
        assert_eq!(hit.side, Side::Vertical, "column {x}");
        assert!((hit.distance - 3.5).abs() < 1e-5, "column {x}: {}", hit.distance);
    }
}

#[test]
fn walking_into_walls_never_enters_them() {
    let map = TileMap::demo();
    let mut cam = Camera::new(map.start_position(), 0.0, 80f32.to_radians(), 4.5);
    for turn in 0..24 {
        cam.rotate(turn as f32 * 0.7);
        for _ in 0..40 {
            cam.move_forward(&map, 0.3);
            assert_eq!(map.wall_at_point(cam.pos.x, cam.pos.y), 0, "at {}", cam.pos);
            cam.strafe(&map, 0.17);
            assert_eq!(map.wall_at_point(cam.pos.x, cam.pos.y), 0, "at {}", cam.pos);
        }
    }
}

/// Depth after a tick is the nearest surface drawn at each pixel: walls in
/// the wall span, the nearer of ground and wall elsewhere.
#[test]
fn depth_buffer_holds_the_nearest_surface() {
    let config = RenderConfig {
        width: 80,
        height: 50,
        field_of_view: 60f32.to_radians(),
        black_distance: 20.0,
    };
    let mut engine = Engine::new(config, corridor_map(), TextureBank::procedural()).unwrap();
    engine.apply(Command::RotateTo(0.0)).unwrap();
    engine.tick(0.0).unwrap();

    let frame = engine.frame();
    let camera = *engine.camera();
    let d_screen = camera.screen_distance(80, 50);
    for (x, hit) in engine.last_hits().iter().enumerate() {
        let ceiling = grid_raycaster::renderer::ceiling_size(50, d_screen, hit.distance);
        let start = ceiling.max(0) as usize;
        for y in 0..50 {
            let depth = frame.depth(x, y);
            if y >= start && y < 50 - start {
                assert_eq!(depth, hit.distance, "wall pixel ({x}, {y})");
            } else {
                assert!(depth < hit.distance, "ground pixel ({x}, {y})");
            }
        }
    }
}

#[test]
fn turning_renders_a_different_frame() {
    // Wall code 2 is only in view once the player faces west
    let map = TileMap::parse(&["11111", "1...1", "2.s.1", "1...1", "11111"]).unwrap();
    let full = TextureBank::procedural();
    let mut bank = TextureBank::new(full.floor().clone(), full.ceiling().clone()).unwrap();
    let wall = full.wall(1).unwrap().clone();
    bank.set_wall(1, wall.clone()).unwrap();
    bank.set_wall(2, wall).unwrap();

    let mut engine = Engine::new(RenderConfig::default(), map, bank).unwrap();
    engine.tick(0.0).unwrap();
    let before = engine.frame().pixels().to_vec();

    engine.apply(Command::Rotate(FRAC_PI_2)).unwrap();
    engine.tick(16.0).unwrap();
    assert_eq!(engine.frame_count(), 2);
    assert_ne!(engine.frame().pixels(), before.as_slice());
}

#[test]
fn custom_textures_flow_into_the_frame() {
    let solid = |argb: u32| Texture::from_fn(ChannelLayout::Rgb, move |_, _| argb);
    let mut bank = TextureBank::new(solid(0xFF00_FF00), solid(0xFF00_00FF)).unwrap();
    bank.set_wall(1, solid(0xFFFF_0000)).unwrap();

    let config = RenderConfig {
        width: 40,
        height: 30,
        ..RenderConfig::default()
    };
    let mut engine = Engine::new(config, open_room(), bank).unwrap();
    engine.tick(0.0).unwrap();

    // Every visible color is a darkened red, green, blue or black
    for &p in engine.frame().pixels() {
        let channels = [(p >> 16) & 0xFF, (p >> 8) & 0xFF, p & 0xFF];
        assert!(channels.iter().filter(|&&c| c != 0).count() <= 1, "{p:#08x}");
    }
}
