use spinero::{
    create_spine_object, BoundsAccumulator, BoundsProvider, Rect, SetupPoseBoundsProvider,
    SkinsAndAnimationBoundsProvider, SpineObject, SpineObjectSpec, DEFAULT_TIME_STEP,
};

use crate::testing::AssetScenario;

mod testing;

#[test]
fn test_empty_accumulator_collapses_to_zero() {
    let accumulator = BoundsAccumulator::new();
    assert_eq!(accumulator.finish(), Rect::ZERO);
}

#[test]
fn test_accumulator_single_sample() {
    let mut accumulator = BoundsAccumulator::new();
    accumulator.fold(Rect::new(-2.0, 3.0, 10.0, 4.0));
    assert_eq!(accumulator.finish(), Rect::new(-2.0, 3.0, 10.0, 4.0));
}

#[test]
fn test_accumulator_grows_max_from_running_origin() {
    // the max corner is folded against the running min, so a later sample
    // shifted right does not widen an earlier one of the same size
    let mut accumulator = BoundsAccumulator::new();
    accumulator.fold(Rect::new(0.0, 0.0, 10.0, 10.0));
    accumulator.fold(Rect::new(5.0, 0.0, 10.0, 10.0));
    assert_eq!(accumulator.finish(), Rect::new(0.0, 0.0, 10.0, 10.0));

    // the same samples folded in reverse order do widen
    let mut accumulator = BoundsAccumulator::new();
    accumulator.fold(Rect::new(5.0, 0.0, 10.0, 10.0));
    accumulator.fold(Rect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(accumulator.finish(), Rect::new(0.0, 0.0, 15.0, 10.0));
}

#[test]
fn test_degenerate_sample_collapses_to_zero() {
    let mut accumulator = BoundsAccumulator::new();
    accumulator.fold(Rect::new(0.0, 0.0, f32::INFINITY, 1.0));
    assert_eq!(accumulator.finish(), Rect::ZERO);
}

#[test]
fn test_setup_pose_bounds_of_empty_object() {
    let object = SpineObject::empty();
    let provider = SetupPoseBoundsProvider;
    assert_eq!(provider.calculate_bounds(&object), Rect::ZERO);
}

#[test]
fn test_animation_bounds_of_empty_object() {
    let object = SpineObject::empty();
    let provider =
        SkinsAndAnimationBoundsProvider::new(Some("walk"), vec!["default".to_string()]);
    assert_eq!(provider.calculate_bounds(&object), Rect::ZERO);
}

#[test]
fn test_animation_bounds_provider_defaults() {
    let provider = SkinsAndAnimationBoundsProvider::new(None, Vec::new());
    assert_eq!(provider.animation, None);
    assert!(provider.skins.is_empty());
    assert_eq!(provider.time_step, DEFAULT_TIME_STEP);

    let provider = provider.with_time_step(0.1);
    assert_eq!(provider.time_step, 0.1);
}

#[test]
fn test_object_delegates_bounds_to_provider() {
    struct FixedBounds(Rect);
    impl BoundsProvider for FixedBounds {
        fn calculate_bounds(&self, _object: &SpineObject) -> Rect {
            self.0
        }
    }

    let mut object = SpineObject::empty();
    object.bounds_provider = Box::new(FixedBounds(Rect::new(1.0, 2.0, 3.0, 4.0)));
    assert_eq!(object.calculate_bounds(), Rect::new(1.0, 2.0, 3.0, 4.0));
}

// A one-bone rig with a 64x32 region on the body slot, an empty hat slot and
// an "armor" skin holding a 10x10 region for the hat, centered at x 100.
const RIG_ATLAS: &[u8] = b"page.png
size: 64,32
format: RGBA8888
filter: Linear,Linear
repeat: none
rect
  rotate: false
  xy: 0, 0
  size: 64, 32
  orig: 64, 32
  offset: 0, 0
  index: -1
plume
  rotate: false
  xy: 0, 0
  size: 10, 10
  orig: 10, 10
  offset: 0, 0
  index: -1
";

const RIG_SKELETON: &[u8] = br#"{
  "skeleton": { "hash": "rig", "spine": "4.1.24", "width": 64, "height": 32 },
  "bones": [ { "name": "root" } ],
  "slots": [
    { "name": "body", "bone": "root", "attachment": "rect" },
    { "name": "hat", "bone": "root" }
  ],
  "skins": [
    {
      "name": "default",
      "attachments": { "body": { "rect": { "width": 64, "height": 32 } } }
    },
    {
      "name": "armor",
      "attachments": { "hat": { "plume": { "x": 100, "width": 10, "height": 10 } } }
    }
  ],
  "animations": { "idle": {} }
}"#;

fn rig_scenario(name: &str) -> AssetScenario {
    AssetScenario::new(name)
        .given_file("rig.atlas", RIG_ATLAS)
        .given_file("page.png", b"rig-page")
        .given_file("rig.json", RIG_SKELETON)
        .when_load_atlas("rig-atlas", "rig.atlas", None)
        .when_load_skeleton_json("rig", "rig.json")
        .when_settled()
}

fn rig_object(
    scenario: &mut AssetScenario,
    provider: Option<Box<dyn BoundsProvider>>,
) -> SpineObject {
    let spec = SpineObjectSpec::position(0.0, 0.0, "rig", "rig-atlas");
    create_spine_object(&mut scenario.assets, spec, provider).unwrap()
}

fn assert_rect_close(actual: Rect, expected: Rect) {
    let close = (actual.x - expected.x).abs() < 1e-3
        && (actual.y - expected.y).abs() < 1e-3
        && (actual.width - expected.width).abs() < 1e-3
        && (actual.height - expected.height).abs() < 1e-3;
    assert!(close, "expected {:?}, got {:?}", expected, actual);
}

#[test]
fn test_setup_pose_bounds_of_rig() {
    let mut scenario = rig_scenario("rig-setup");
    let object = rig_object(&mut scenario, None);
    let bounds = object.calculate_bounds();
    assert_rect_close(bounds, Rect::new(-32.0, -16.0, 64.0, 32.0));
    // deterministic across calls
    assert_eq!(object.calculate_bounds(), bounds);
}

#[test]
fn test_animation_bounds_without_animation_match_setup_pose() {
    let mut scenario = rig_scenario("rig-no-animation");
    let provider = SkinsAndAnimationBoundsProvider::new(None, Vec::new());
    let object = rig_object(&mut scenario, Some(Box::new(provider)));
    let setup = SetupPoseBoundsProvider.calculate_bounds(&object);
    assert_eq!(object.calculate_bounds(), setup);
}

#[test]
fn test_animation_sampling_bounds_of_rig() {
    let mut scenario = rig_scenario("rig-sampling");
    let provider = SkinsAndAnimationBoundsProvider::new(Some("idle"), Vec::new());
    let object = rig_object(&mut scenario, Some(Box::new(provider)));
    assert_rect_close(object.calculate_bounds(), Rect::new(-32.0, -16.0, 64.0, 32.0));
}

#[test]
fn test_named_skin_bounds_include_uncovered_slots() {
    // the skin overrides the hat slot only, the body slot still contributes
    // its live attachment
    let mut scenario = rig_scenario("rig-named-skin");
    let provider = SkinsAndAnimationBoundsProvider::new(None, vec!["armor".to_string()]);
    let object = rig_object(&mut scenario, Some(Box::new(provider)));
    assert_rect_close(object.calculate_bounds(), Rect::new(-32.0, -16.0, 137.0, 32.0));
}

#[test]
fn test_unknown_skin_bounds_fall_back_to_live_attachments() {
    let mut scenario = rig_scenario("rig-unknown-skin");
    let provider = SkinsAndAnimationBoundsProvider::new(None, vec!["missing".to_string()]);
    let object = rig_object(&mut scenario, Some(Box::new(provider)));
    assert_rect_close(object.calculate_bounds(), Rect::new(-32.0, -16.0, 64.0, 32.0));
}
