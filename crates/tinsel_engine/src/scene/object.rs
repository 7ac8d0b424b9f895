//! The behavioral contract every scheduled object implements.

use std::cell::RefCell;
use std::rc::Rc;

/// A shared, interiorly-mutable handle to a scheduled object.
///
/// The scheduler, composition groups, and "follow" behaviors all hold these;
/// none of them owns the object's lifetime exclusively. Identity is the
/// allocation itself — see [`ObjectId`].
pub type SharedObject = Rc<RefCell<dyn GameObject>>;

/// Anything advanced by a [`Runner`](crate::scene::Runner) each frame.
///
/// The frame is split into phases. During `think`, an object assesses its
/// environment and plans by writing only its own pending state; it may read
/// other objects' committed state but must not assume anything about the
/// order of `think` calls within a frame. During `update`, the object
/// commits pending state and must not look at other objects at all, because
/// only some of them have updated.
pub trait GameObject {
    /// Called exactly once, after the object is admitted and before its
    /// first `think`.
    ///
    /// `time` is the current game time in milliseconds.
    fn start(&mut self, time: u64);

    /// Plan this frame's changes without publishing any of them.
    ///
    /// `now` is the game time in milliseconds; `elapsed` is the dilated
    /// time since the previous frame.
    fn think(&mut self, now: u64, elapsed: u64);

    /// Publish pending state.
    ///
    /// Returns any objects that must be re-evaluated before the frame is
    /// considered settled — typically dependents spawned during this update
    /// that have to start and think before the frame's draw. Most objects
    /// return nothing.
    fn update(&mut self) -> Vec<SharedObject> {
        Vec::new()
    }

    /// Whether this object is dead and should be purged at the next
    /// delete scan. Must be a pure predicate over committed state.
    fn ready_to_delete(&self) -> bool;

    /// Called when the owning runner's time dilation changes.
    fn speed_change(&mut self, _speed: f32) {}
}

/// Identity of a scheduled object: the address of its shared allocation.
///
/// Objects carry no engine-assigned ids; two handles are the same object
/// exactly when they point at the same allocation, regardless of which
/// trait they are viewed through. The registry relies on this for set
/// membership, so an id is only meaningful while something still holds the
/// allocation alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Get the identity of a shared object.
    pub fn of<T: GameObject + ?Sized>(object: &Rc<RefCell<T>>) -> Self {
        Self(Rc::as_ptr(object).cast::<()>() as usize)
    }
}

/// Coerce a concrete shared object into a [`SharedObject`] handle.
///
/// Convenience for `update` return values and heterogeneous collections:
/// `vec![shared(&spawned)]`.
pub fn shared<T: GameObject + 'static>(object: &Rc<RefCell<T>>) -> SharedObject {
    object.clone()
}
