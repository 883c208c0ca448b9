use log::trace;
use tile_grid::core::Coord;

use crate::controller::LightingController;
use crate::luminosity::{Lum, LumMap};
use crate::source::OwnerLookup;

/// Lumcount at or below which an opacity change cannot alter anything.
pub const INVALIDATE_FLOOR: Lum = 0;

/// Mark every registered light that could reach `coord` as dirty after the
/// tile's opacity changed. Returns how many sources were marked.
///
/// Lights that used to reach the tile but have since moved are already dirty
/// from their own movement check, so only the current neighborhood is scanned.
pub fn invalidate_affecting_lights(
    coord: Coord,
    lum: &LumMap,
    owners: &dyn OwnerLookup,
    controller: &mut LightingController,
) -> usize {
    let Some(count) = lum.raw_lumcount(coord) else {
        return 0;
    };
    if count <= INVALIDATE_FLOOR {
        return 0;
    }

    let radius = controller.config().caps.largest();
    let mut marked = 0;
    for tile in lum.coords_within(coord, radius) {
        for owner in owners.owners_at(tile) {
            if controller.mark_dirty(owner) {
                marked += 1;
            }
        }
    }
    trace!("opacity change at {coord} woke {marked} lights");
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LightingConfig;
    use crate::luminosity::{LumWriter, to_lum};
    use crate::policy::EmitterKind;
    use crate::source::tests::Fixture;
    use crate::source::{LightEnv, Owner};
    use crate::visibility::RayCastVisibility;

    fn lit_fixture() -> (Fixture, LightingController, Owner) {
        let mut fx = Fixture::open(20, 9);
        let mut controller = LightingController::new(LightingConfig::default()).expect("controller");
        let owner = fx.place(1, Coord::new(4, 4));
        controller
            .register(owner, EmitterKind::Fixture, 16.0, true, &fx)
            .expect("register");
        let mut lum = fx.lum.clone();
        {
            let visibility = RayCastVisibility::new(&fx);
            let env = LightEnv {
                owners: &fx,
                visibility: &visibility,
                kinds: &fx.kinds,
            };
            controller.tick(&mut lum, &env);
        }
        fx.lum = lum;
        (fx, controller, owner)
    }

    #[test]
    fn zero_lumcount_tile_marks_nothing() {
        let (fx, mut controller, owner) = lit_fixture();
        let dark = Coord::new(15, 4);
        assert_eq!(fx.lum.raw_lumcount(dark), Some(0));

        let marked = invalidate_affecting_lights(dark, &fx.lum, &fx, &mut controller);
        assert_eq!(marked, 0);
        assert!(controller.source(owner).is_some_and(|s| !s.is_dirty()));
    }

    #[test]
    fn lit_tile_wakes_nearby_lights() {
        let (fx, mut controller, owner) = lit_fixture();
        let lit = Coord::new(6, 4);
        assert!(fx.lum.lumcount(lit) > 0.0);

        let marked = invalidate_affecting_lights(lit, &fx.lum, &fx, &mut controller);
        assert_eq!(marked, 1);
        assert!(controller.source(owner).is_some_and(|s| s.is_dirty()));
    }

    #[test]
    fn lights_beyond_largest_cap_are_left_alone() {
        let (mut fx, mut controller, near) = lit_fixture();
        let far = fx.place(2, Coord::new(19, 4));
        controller
            .register(far, EmitterKind::Mobile, 1.0, true, &fx)
            .expect("register");

        // Fake a count on a tile more than 8 tiles from the far light.
        let target = Coord::new(5, 4);
        let mut lum = fx.lum.clone();
        let mut pending = Default::default();
        LumWriter::new(&mut lum, &mut pending, &fx.kinds).apply(target, to_lum(1.0));

        let marked = invalidate_affecting_lights(target, &lum, &fx, &mut controller);
        assert_eq!(marked, 1);
        assert!(controller.source(near).is_some_and(|s| s.is_dirty()));
    }

    #[test]
    fn out_of_bounds_tile_is_ignored() {
        let (fx, mut controller, _) = lit_fixture();
        let marked = invalidate_affecting_lights(Coord::new(40, 40), &fx.lum, &fx, &mut controller);
        assert_eq!(marked, 0);
    }
}
