//! End-to-end frame loop: resources, scheduling, mid-frame spawning, and
//! layered drawing working together the way an embedding game drives them.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use tinsel_engine::prelude::*;

const MANIFEST: &str = r#"
    [numbers]
    drift_speed = 1.0
    burst_at = 20.0

    [images]
    sky = "backdrops/sky.png"
    sleigh = "sprites/sleigh.png"
    spark = "fx/spark.png"
"#;

/// Moves right at a configured speed and bursts a spark effect into the
/// scene the moment it crosses a threshold.
struct Drifter {
    state: SpriteState,
    image: ImageHandle,
    speed: f32,
    burst_at: f32,
    spark_image: ImageHandle,
    runner: Runner,
    group: Rc<RefCell<SpriteGroup>>,
    spark: Option<Rc<RefCell<Spark>>>,
}

impl GameObject for Drifter {
    fn start(&mut self, _time: u64) {}

    #[allow(clippy::cast_precision_loss)]
    fn think(&mut self, _now: u64, elapsed: u64) {
        let x = self.state.x() + self.speed * elapsed as f32;
        self.state.pending_mut().x = x;
    }

    fn update(&mut self) -> Vec<SharedObject> {
        self.state.commit();
        if self.spark.is_some() || self.state.x() < self.burst_at {
            return Vec::new();
        }

        // The spark must start, think, and settle before this frame's
        // draw, so both it and the group holding it ask for another wave.
        let spark = Rc::new(RefCell::new(Spark {
            layer: 10,
            image: self.spark_image,
            born: None,
            lifetime: 40,
            expired_pending: false,
            expired: false,
        }));
        self.runner.add_object(spark.clone());
        self.group.borrow_mut().add_effect(spark.clone());
        self.spark = Some(spark.clone());

        let group_obj: SharedObject = self.group.clone();
        vec![group_obj, shared(&spark)]
    }

    fn ready_to_delete(&self) -> bool {
        self.state.ready_to_delete()
    }
}

impl Sprite for Drifter {
    fn placement(&self) -> Placement {
        self.state.placement()
    }

    fn draw(&self, surface: &mut dyn DrawSurface) -> Result<(), DrawError> {
        surface.draw_image(self.image)
    }
}

/// A short-lived effect that deletes itself once its lifetime passes.
struct Spark {
    layer: i32,
    image: ImageHandle,
    born: Option<u64>,
    lifetime: u64,
    expired_pending: bool,
    expired: bool,
}

impl GameObject for Spark {
    fn start(&mut self, time: u64) {
        self.born = Some(time);
    }

    fn think(&mut self, now: u64, _elapsed: u64) {
        if let Some(born) = self.born {
            if now.saturating_sub(born) >= self.lifetime {
                self.expired_pending = true;
            }
        }
    }

    fn update(&mut self) -> Vec<SharedObject> {
        self.expired = self.expired_pending;
        Vec::new()
    }

    fn ready_to_delete(&self) -> bool {
        self.expired
    }
}

impl Effect for Spark {
    fn layer(&self) -> i32 {
        self.layer
    }

    fn draw(&self, surface: &mut dyn DrawSurface) -> Result<(), DrawError> {
        surface.draw_image(self.image)
    }
}

struct Scene {
    runner: Runner,
    clock: Rc<ManualClock>,
    group: Rc<RefCell<SpriteGroup>>,
    drifter: Rc<RefCell<Drifter>>,
    sky: ImageHandle,
    sleigh: ImageHandle,
    spark: ImageHandle,
}

fn build_scene() -> Scene {
    let _ = env_logger::builder().is_test(true).try_init();

    let manifest = ResourceManifest::from_toml_str(MANIFEST).unwrap();
    let mut store = ResourceStore::new();
    store.load_manifest(&manifest, Path::new("/srv/game/resources"));

    let sky = store.image("sky").unwrap();
    let sleigh = store.image("sleigh").unwrap();
    let spark = store.image("spark").unwrap();
    let drift_speed = store.number_f32("drift_speed").unwrap();
    let burst_at = store.number_f32("burst_at").unwrap();

    let clock = Rc::new(ManualClock::new());
    let runner = Runner::new(Rc::new(store), clock.clone());
    runner.start();

    let group = Rc::new(RefCell::new(SpriteGroup::new(runner.clone())));
    runner.add_object(group.clone());

    let background = Rc::new(RefCell::new(ImageSprite::with_placement(
        sky,
        Placement {
            x: 30.0,
            depth: 3.0,
            layer: -10,
            ..Placement::default()
        },
    )));
    runner.add_object(background.clone());
    group.borrow_mut().add_sprite(background);

    let drifter = Rc::new(RefCell::new(Drifter {
        state: SpriteState::new(),
        image: sleigh,
        speed: drift_speed,
        burst_at,
        spark_image: spark,
        runner: runner.clone(),
        group: group.clone(),
        spark: None,
    }));
    runner.add_object(drifter.clone());
    group.borrow_mut().add_sprite(drifter.clone());

    Scene {
        runner,
        clock,
        group,
        drifter,
        sky,
        sleigh,
        spark,
    }
}

fn draw(scene: &Scene) -> RecordingSurface {
    let mut surface = RecordingSurface::new();
    scene.group.borrow().draw(&mut surface).unwrap();
    surface
}

#[test]
fn scene_runs_spawns_and_expires_across_frames() {
    let scene = build_scene();
    let runner = &scene.runner;

    // Frame 1: everything is admitted; nothing has moved yet.
    runner.step().unwrap();
    assert_eq!(runner.time(), 0);
    assert_eq!(runner.num_objects(), 3);
    let surface = draw(&scene);
    assert_eq!(
        surface.images_drawn(),
        vec![scene.sky, scene.sleigh],
        "background under drifter, layer order"
    );
    assert!(
        surface
            .ops()
            .contains(&SurfaceOp::Translate { x: 10.0, y: 0.0 }),
        "background translation is divided by its parallax depth"
    );

    // Frame 2: the drifter moves 16 units but has not hit the threshold.
    scene.clock.advance(16);
    runner.step().unwrap();
    assert_eq!(runner.time(), 16);
    assert!((scene.drifter.borrow().state.x() - 16.0).abs() < f32::EPSILON);
    assert!(runner.has_object(&scene.drifter));

    // Frame 3 at double speed: 16 real ms becomes 32 game ms, the drifter
    // crosses the threshold, and the spark it bursts is live, settled, and
    // drawn before this frame ends.
    runner.set_speed(2.0);
    scene.clock.advance(16);
    runner.step().unwrap();
    assert_eq!(runner.time(), 48, "only the new frame is dilated");
    assert!((scene.drifter.borrow().state.x() - 48.0).abs() < f32::EPSILON);

    let spark_obj = scene.drifter.borrow().spark.clone().unwrap();
    assert!(runner.has_object(&spark_obj));
    assert_eq!(scene.group.borrow().child_count(), 3);
    let surface = draw(&scene);
    assert_eq!(
        surface.images_drawn(),
        vec![scene.sky, scene.sleigh, scene.spark],
        "spawned effect draws the same frame it was spawned"
    );

    // Frame 4: spark age 32 of 40, still alive.
    scene.clock.advance(16);
    runner.step().unwrap();
    assert_eq!(runner.time(), 80);
    assert!(runner.has_object(&spark_obj));

    // Frame 5: the spark notices its lifetime passed and commits the
    // deletion, but remains drawable for the rest of the frame.
    scene.clock.advance(16);
    runner.step().unwrap();
    assert!(runner.has_object(&spark_obj));
    let surface = draw(&scene);
    assert_eq!(surface.images_drawn().len(), 3);

    // Frame 6: the delete scan purges it from the runner, the group scans
    // it out of the scene, and the draw no longer includes it.
    scene.clock.advance(16);
    runner.step().unwrap();
    assert!(!runner.has_object(&spark_obj));
    assert_eq!(scene.group.borrow().child_count(), 2);
    let surface = draw(&scene);
    assert_eq!(surface.images_drawn(), vec![scene.sky, scene.sleigh]);
    assert_eq!(runner.num_objects(), 3, "group, background, drifter remain");
}

#[test]
fn surface_state_is_balanced_after_a_full_scene_draw() {
    let scene = build_scene();
    scene.runner.step().unwrap();
    let surface = draw(&scene);
    assert_eq!(surface.matrix_depth(), 0);
    assert_eq!(surface.style_depth(), 0);
    assert!((surface.tint() - 1.0).abs() < f32::EPSILON);
}
