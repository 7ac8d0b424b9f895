//! The frame scheduler.
//!
//! A [`Runner`] owns the registry of live objects and advances them in
//! lockstep phases once per frame:
//!
//! 1. **delete** — objects reporting [`ready_to_delete`], plus explicit
//!    removals, are purged;
//! 2. **add** — queued objects are admitted and receive their one
//!    [`start`] call;
//! 3. **think** — every live object plans against committed state;
//! 4. **update** — every live object commits its pending state.
//!
//! Objects spawned mid-frame settle in the *same* frame: when an `update`
//! returns dependents needing re-evaluation, or leaves queued additions or
//! removals behind, the runner runs another wave (flush removals, admit,
//! think, update) over just the affected objects, up to [`MAX_WAVES`].
//! An object that keeps requesting re-evaluation forever is a defect in
//! that object; the runner surfaces it as [`StepError::WaveLimitExceeded`]
//! rather than spinning.
//!
//! The runner is a cheap-clone handle over shared state, so objects can
//! keep one and queue additions or removals from inside their own `think`
//! or `update`. All of it is single-threaded and non-reentrant: nothing
//! may call [`step`](Runner::step) from inside an object callback, and
//! nothing outside the frame step may mutate the registry concurrently.
//! The interior `RefCell`s turn violations into immediate panics instead
//! of silent corruption.
//!
//! [`ready_to_delete`]: super::GameObject::ready_to_delete
//! [`start`]: super::GameObject::start

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use thiserror::Error;

use crate::assets::ResourceStore;
use crate::foundation::time::Clock;

use super::object::{GameObject, ObjectId, SharedObject};

/// Hard bound on re-evaluation waves within a single frame.
pub const MAX_WAVES: usize = 64;

/// Fatal frame-step failures.
#[derive(Debug, Error)]
pub enum StepError {
    /// A frame failed to settle within [`MAX_WAVES`] re-evaluation waves.
    /// Some object is requesting re-evaluation or spawning new objects
    /// without ever converging.
    #[error("frame did not settle after {limit} update waves")]
    WaveLimitExceeded {
        /// The wave bound that was hit.
        limit: usize,
    },
}

#[derive(Clone)]
struct ObjectHandle {
    object: SharedObject,
    id: ObjectId,
}

impl ObjectHandle {
    fn new(object: SharedObject) -> Self {
        let id = ObjectId::of(&object);
        Self { object, id }
    }
}

struct RunnerCore {
    resources: Rc<ResourceStore>,
    clock: Rc<dyn Clock>,
    /// Live objects in registration order. Iteration order of every phase
    /// follows this, which is what makes frames deterministic.
    live: RefCell<Vec<ObjectHandle>>,
    live_ids: RefCell<HashSet<ObjectId>>,
    to_add: RefCell<Vec<ObjectHandle>>,
    to_add_ids: RefCell<HashSet<ObjectId>>,
    to_remove: RefCell<HashSet<ObjectId>>,
    time: Cell<u64>,
    last_wall: Cell<u64>,
    speed: Cell<f32>,
    notified_speed: Cell<f32>,
    started: Cell<bool>,
}

/// The frame scheduler. Clones share the same registry and clock domain.
///
/// Speed is per-runner state, not a process global: a game typically runs
/// one dilated runner for gameplay and a second undilated one for things
/// like music timing, side by side.
#[derive(Clone)]
pub struct Runner {
    core: Rc<RunnerCore>,
}

impl Runner {
    /// Create a runner over a resource registry and a wall clock.
    pub fn new(resources: Rc<ResourceStore>, clock: Rc<dyn Clock>) -> Self {
        Self {
            core: Rc::new(RunnerCore {
                resources,
                clock,
                live: RefCell::new(Vec::new()),
                live_ids: RefCell::new(HashSet::new()),
                to_add: RefCell::new(Vec::new()),
                to_add_ids: RefCell::new(HashSet::new()),
                to_remove: RefCell::new(HashSet::new()),
                time: Cell::new(0),
                last_wall: Cell::new(0),
                speed: Cell::new(1.0),
                notified_speed: Cell::new(1.0),
                started: Cell::new(false),
            }),
        }
    }

    /// The resource registry this runner was built with.
    pub fn resources(&self) -> &Rc<ResourceStore> {
        &self.core.resources
    }

    /// Current game time in milliseconds.
    ///
    /// Advances by the dilated elapsed amount exactly once per frame, no
    /// matter how many waves the frame took.
    pub fn time(&self) -> u64 {
        self.core.time.get()
    }

    /// Begin (or restart) the simulation clock: game time returns to zero
    /// and elapsed-time tracking anchors to the present. Does not touch
    /// the object registry.
    pub fn start(&self) {
        log::info!("starting runner");
        self.core.last_wall.set(self.core.clock.now_ms());
        self.core.time.set(0);
        self.core.started.set(true);
    }

    /// Current time dilation factor.
    pub fn speed(&self) -> f32 {
        self.core.speed.get()
    }

    /// Change the time dilation factor. 1 is real time, 2 is double speed.
    ///
    /// Takes effect prospectively: the next frame's elapsed time uses the
    /// new factor, and time already accumulated is never rescaled.
    /// [`GameObject::speed_change`] hooks are dispatched at the top of the
    /// next [`step`](Self::step), so calling this from inside a callback
    /// is safe.
    pub fn set_speed(&self, speed: f32) {
        log::debug!("speed set to {speed}");
        self.core.speed.set(speed);
    }

    /// Queue an object for admission at the next add phase.
    ///
    /// Adding an object that is already live or already queued is a no-op.
    /// Adding an object that is queued for removal cancels the removal
    /// instead.
    pub fn add_object(&self, object: SharedObject) {
        let core = &*self.core;
        let id = ObjectId::of(&object);
        if core.to_remove.borrow_mut().remove(&id) {
            return;
        }
        if core.live_ids.borrow().contains(&id) || core.to_add_ids.borrow().contains(&id) {
            return;
        }
        core.to_add_ids.borrow_mut().insert(id);
        core.to_add.borrow_mut().push(ObjectHandle::new(object));
    }

    /// Queue an object for removal at the next delete phase.
    ///
    /// Removing an object that is absent or already queued for removal is
    /// a no-op. Removing an object that is queued for admission cancels
    /// the admission instead, so the object is dropped before ever
    /// starting.
    pub fn remove_object<T: GameObject + ?Sized>(&self, object: &Rc<RefCell<T>>) {
        self.queue_remove(ObjectId::of(object));
    }

    fn queue_remove(&self, id: ObjectId) {
        let core = &*self.core;
        if core.to_remove.borrow().contains(&id) {
            return;
        }
        if core.to_add_ids.borrow_mut().remove(&id) {
            core.to_add.borrow_mut().retain(|handle| handle.id != id);
            return;
        }
        if !core.live_ids.borrow().contains(&id) {
            return;
        }
        core.to_remove.borrow_mut().insert(id);
    }

    /// Whether this object has been admitted and not removed.
    ///
    /// Queued additions do not count: an object is only "in" the runner
    /// once it has been started.
    pub fn has_object<T: GameObject + ?Sized>(&self, object: &Rc<RefCell<T>>) -> bool {
        self.contains_id(ObjectId::of(object))
    }

    /// Identity-keyed variant of [`has_object`](Self::has_object), for
    /// collaborators that only kept the id.
    pub fn contains_id(&self, id: ObjectId) -> bool {
        self.core.live_ids.borrow().contains(&id)
    }

    /// Number of live objects.
    pub fn num_objects(&self) -> usize {
        self.core.live.borrow().len()
    }

    /// Drop every live object and every pending add or removal,
    /// immediately. Used for whole-game resets.
    pub fn clear_all(&self) {
        log::info!("clearing all objects");
        let core = &*self.core;
        core.live.borrow_mut().clear();
        core.live_ids.borrow_mut().clear();
        core.to_add.borrow_mut().clear();
        core.to_add_ids.borrow_mut().clear();
        core.to_remove.borrow_mut().clear();
    }

    /// Execute one frame.
    ///
    /// Reads the wall clock once, computes the dilated elapsed time
    /// (truncated to whole milliseconds), runs the delete, add, think, and
    /// update phases, then keeps running re-evaluation waves until the
    /// frame settles. Object callbacks receive the game time as it stood
    /// at the top of the frame; the accumulated game time advances once at
    /// the end.
    ///
    /// Panics raised by object callbacks are defects in those objects and
    /// propagate to the caller untouched.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn step(&self) -> Result<(), StepError> {
        let core = &*self.core;
        if !core.started.get() {
            self.start();
        }
        self.dispatch_speed_change();

        let wall_now = core.clock.now_ms();
        let real_elapsed = wall_now.saturating_sub(core.last_wall.get());
        let elapsed = (real_elapsed as f64 * f64::from(core.speed.get())) as u64;
        let now = core.time.get();

        // Objects reporting ready-to-delete are collected once per frame,
        // before anything ticks. They were visible all of last frame and
        // are gone before this frame's think.
        self.scan_ready_to_delete();

        let mut revisit: Vec<ObjectHandle> = Vec::new();
        let mut first_wave = true;
        let mut waves = 0;
        loop {
            waves += 1;
            if waves > MAX_WAVES {
                return Err(StepError::WaveLimitExceeded { limit: MAX_WAVES });
            }

            self.flush_removals();
            let admitted = self.admit(now);

            // The first wave ticks every live object. Later waves tick only
            // objects requesting re-evaluation plus the newly admitted.
            let wave: Vec<ObjectHandle> = if first_wave {
                core.live.borrow().clone()
            } else {
                let live_ids = core.live_ids.borrow();
                let mut seen: HashSet<ObjectId> = HashSet::new();
                std::mem::take(&mut revisit)
                    .into_iter()
                    .chain(admitted)
                    .filter(|handle| live_ids.contains(&handle.id) && seen.insert(handle.id))
                    .collect()
            };
            first_wave = false;

            for handle in &wave {
                handle.object.borrow_mut().think(now, elapsed);
            }

            let mut next: Vec<ObjectHandle> = Vec::new();
            for handle in &wave {
                for object in handle.object.borrow_mut().update() {
                    next.push(ObjectHandle::new(object));
                }
            }

            let settled = next.is_empty()
                && core.to_add.borrow().is_empty()
                && core.to_remove.borrow().is_empty();
            if settled {
                break;
            }
            revisit = next;
        }

        if waves > 1 {
            log::trace!("frame settled after {waves} waves");
        }
        core.time.set(now + elapsed);
        core.last_wall.set(wall_now);
        Ok(())
    }

    /// Deliver pending `speed_change` notifications. Runs before the frame
    /// so a hook can never re-enter an object the scheduler has borrowed.
    fn dispatch_speed_change(&self) {
        let core = &*self.core;
        let speed = core.speed.get();
        if (core.notified_speed.get() - speed).abs() < f32::EPSILON {
            return;
        }
        core.notified_speed.set(speed);
        let snapshot: Vec<ObjectHandle> = core.live.borrow().clone();
        for handle in &snapshot {
            handle.object.borrow_mut().speed_change(speed);
        }
    }

    fn scan_ready_to_delete(&self) {
        let core = &*self.core;
        let mut doomed: Vec<ObjectId> = Vec::new();
        for handle in core.live.borrow().iter() {
            if handle.object.borrow().ready_to_delete() {
                doomed.push(handle.id);
            }
        }
        for handle in core.to_add.borrow().iter() {
            if handle.object.borrow().ready_to_delete() {
                doomed.push(handle.id);
            }
        }
        for id in doomed {
            self.queue_remove(id);
        }
    }

    fn flush_removals(&self) {
        let core = &*self.core;
        let removing = std::mem::take(&mut *core.to_remove.borrow_mut());
        if removing.is_empty() {
            return;
        }
        core.live
            .borrow_mut()
            .retain(|handle| !removing.contains(&handle.id));
        let mut live_ids = core.live_ids.borrow_mut();
        for id in &removing {
            live_ids.remove(id);
        }
        log::debug!("removed {} objects", removing.len());
    }

    /// Move every queued object into the live set, then start each one.
    /// All admissions land before the first `start` runs, so a `start`
    /// implementation can already see its whole cohort in the registry.
    fn admit(&self, now: u64) -> Vec<ObjectHandle> {
        let core = &*self.core;
        let admitted: Vec<ObjectHandle> = core.to_add.borrow_mut().drain(..).collect();
        core.to_add_ids.borrow_mut().clear();
        if admitted.is_empty() {
            return admitted;
        }
        {
            let mut live = core.live.borrow_mut();
            let mut live_ids = core.live_ids.borrow_mut();
            for handle in &admitted {
                live.push(handle.clone());
                live_ids.insert(handle.id);
            }
        }
        log::debug!("admitted {} objects", admitted.len());
        for handle in &admitted {
            handle.object.borrow_mut().start(now);
        }
        admitted
    }
}
