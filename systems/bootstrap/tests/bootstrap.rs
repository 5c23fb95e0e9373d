use light_bulbs_core::{CellCoord, Command, LayoutCell, LevelLayout, TileArchetype};
use light_bulbs_system_bootstrap::Bootstrap;
use light_bulbs_world::{self as world, World};

#[test]
fn exposes_banner_before_any_level() {
    let world = World::new();
    let bootstrap = Bootstrap;

    assert_eq!(bootstrap.welcome_banner(&world), "Welcome to Light Bulbs!");
    assert_eq!(bootstrap.dimensions(&world), (0, 0));
    assert!(bootstrap.tiles(&world).iter().next().is_none());
    assert!(!bootstrap.is_solved(&world));
}

#[test]
fn exposes_board_views_after_load() {
    let mut world = World::new();
    let layout = LevelLayout::new(
        2,
        1,
        vec![
            LayoutCell::new(TileArchetype::Battery, 1),
            LayoutCell::new(TileArchetype::Light, 3),
        ],
    )
    .expect("valid layout");
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadLevel { layout }, &mut events);
    let bootstrap = Bootstrap;

    assert_eq!(bootstrap.dimensions(&world), (2, 1));
    assert_eq!(bootstrap.tiles(&world).iter().count(), 2);
    assert_eq!(bootstrap.batteries(&world), vec![CellCoord::new(0, 0)]);
    assert_eq!(bootstrap.lights(&world).lit_count(), 1);
    assert!(bootstrap.is_solved(&world));
}
