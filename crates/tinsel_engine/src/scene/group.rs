//! Nestable composition of sprites and effects.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::render::surface::{DrawError, DrawSurface, StyleGuard, TransformGuard};

use super::object::{GameObject, ObjectId, SharedObject};
use super::runner::Runner;
use super::sprite::{Effect, Placement, Sprite, SpriteState};

enum ChildKind {
    Sprite(Rc<RefCell<dyn Sprite>>),
    Effect(Rc<RefCell<dyn Effect>>),
}

/// One entry in a group, keyed by the identity of the wrapped object.
struct Child {
    id: ObjectId,
    kind: ChildKind,
}

impl Child {
    fn ready_to_delete(&self) -> bool {
        match &self.kind {
            ChildKind::Sprite(sprite) => sprite.borrow().ready_to_delete(),
            ChildKind::Effect(effect) => effect.borrow().ready_to_delete(),
        }
    }

    fn layer(&self) -> i32 {
        match &self.kind {
            ChildKind::Sprite(sprite) => sprite.borrow().placement().layer,
            ChildKind::Effect(effect) => effect.borrow().layer(),
        }
    }
}

/// An ordered collection of sprites and effects drawn as one unit.
///
/// A group is itself a [`Sprite`], so groups nest: register a group with
/// the runner like any object and add it to a parent group to compose
/// whole sub-scenes under one transform.
///
/// Sprite children are drawn under a scoped transform built from their
/// committed placement: translate by `(x / depth, y / depth)` — the
/// parallax divisor — then rotate, scale, and alpha-tint. Effect children
/// are drawn as-is under a scoped style save. Children are skipped when
/// hidden, fully transparent, or not currently live in the owning runner
/// (an object admitted this frame has not started yet by the time an
/// earlier-registered group draws).
///
/// Membership changes go through pending sets with the same cancellation
/// rules as the runner's registry and take effect at the group's own
/// `update`. A child appears in a group at most once.
///
/// A group must not be added to itself, directly or through a cycle of
/// groups; drawing such a cycle is a reborrow of an already-borrowed
/// group and panics.
pub struct SpriteGroup {
    state: SpriteState,
    runner: Runner,
    children: Vec<Child>,
    child_ids: HashSet<ObjectId>,
    pending_add: Vec<Child>,
    pending_ids: HashSet<ObjectId>,
    pending_remove: HashSet<ObjectId>,
}

impl SpriteGroup {
    /// Create an empty group owned by `runner`.
    ///
    /// The runner handle is what lets the group skip children that are not
    /// yet (or no longer) live when drawing.
    pub fn new(runner: Runner) -> Self {
        Self {
            state: SpriteState::new(),
            runner,
            children: Vec::new(),
            child_ids: HashSet::new(),
            pending_add: Vec::new(),
            pending_ids: HashSet::new(),
            pending_remove: HashSet::new(),
        }
    }

    /// Queue a sprite for membership. The group only draws it; scheduling
    /// the sprite with the runner is still the caller's job.
    pub fn add_sprite(&mut self, sprite: Rc<RefCell<dyn Sprite>>) {
        let id = ObjectId::of(&sprite);
        self.queue_add(Child {
            id,
            kind: ChildKind::Sprite(sprite),
        });
    }

    /// Queue an effect for membership.
    pub fn add_effect(&mut self, effect: Rc<RefCell<dyn Effect>>) {
        let id = ObjectId::of(&effect);
        self.queue_add(Child {
            id,
            kind: ChildKind::Effect(effect),
        });
    }

    /// Queue a sprite for removal, by identity.
    pub fn remove_sprite<T: Sprite + ?Sized>(&mut self, sprite: &Rc<RefCell<T>>) {
        self.queue_remove(ObjectId::of(sprite));
    }

    /// Queue an effect for removal, by identity.
    pub fn remove_effect<T: Effect + ?Sized>(&mut self, effect: &Rc<RefCell<T>>) {
        self.queue_remove(ObjectId::of(effect));
    }

    fn queue_add(&mut self, child: Child) {
        if self.pending_remove.remove(&child.id) {
            return;
        }
        if self.child_ids.contains(&child.id) || self.pending_ids.contains(&child.id) {
            return;
        }
        self.pending_ids.insert(child.id);
        self.pending_add.push(child);
    }

    fn queue_remove(&mut self, id: ObjectId) {
        if self.pending_remove.contains(&id) {
            return;
        }
        if self.pending_ids.remove(&id) {
            self.pending_add.retain(|child| child.id != id);
            return;
        }
        if !self.child_ids.contains(&id) {
            return;
        }
        self.pending_remove.insert(id);
    }

    /// Number of current children, not counting pending membership changes.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Drop every child and pending membership change, immediately.
    pub fn clear(&mut self) {
        self.children.clear();
        self.child_ids.clear();
        self.pending_add.clear();
        self.pending_ids.clear();
        self.pending_remove.clear();
    }

    /// The group's own double-buffered state, for positioning the group
    /// within a parent.
    pub fn state(&self) -> &SpriteState {
        &self.state
    }

    /// Mutable access to the group's own state. Pending writes commit at
    /// the group's `update` like any sprite's.
    pub fn state_mut(&mut self) -> &mut SpriteState {
        &mut self.state
    }

    /// Draw every live child in layer order, lowest first.
    ///
    /// The order is re-sorted on every call because layers change between
    /// frames; the sort is stable, so children on equal layers keep their
    /// registration order. Surface transform and style state are restored
    /// on every exit path, including a child draw failing mid-scene.
    pub fn draw(&self, surface: &mut dyn DrawSurface) -> Result<(), DrawError> {
        let mut order: Vec<(i32, usize)> = self
            .children
            .iter()
            .enumerate()
            .map(|(index, child)| (child.layer(), index))
            .collect();
        order.sort_by_key(|&(layer, _)| layer);

        for (_, index) in order {
            let child = &self.children[index];
            if !self.runner.contains_id(child.id) {
                continue;
            }
            match &child.kind {
                ChildKind::Effect(effect) => {
                    let mut scope = StyleGuard::new(&mut *surface);
                    effect.borrow().draw(&mut *scope)?;
                }
                ChildKind::Sprite(sprite) => {
                    let sprite = sprite.borrow();
                    let placement = sprite.placement();
                    if !placement.shown || placement.alpha <= 0.0 {
                        continue;
                    }
                    let mut scope = TransformGuard::new(&mut *surface);
                    scope.translate(
                        placement.x / placement.depth,
                        placement.y / placement.depth,
                    );
                    scope.rotate(placement.rotation);
                    scope.scale(placement.x_scale, placement.y_scale);
                    scope.tint_alpha(placement.alpha);
                    sprite.draw(&mut *scope)?;
                    scope.clear_tint();
                }
            }
        }
        Ok(())
    }
}

impl GameObject for SpriteGroup {
    fn start(&mut self, _time: u64) {}

    fn think(&mut self, _now: u64, _elapsed: u64) {
        // Children reporting ready-to-delete leave at the next flush, the
        // same way the runner's delete scan works.
        let doomed: Vec<ObjectId> = self
            .children
            .iter()
            .chain(self.pending_add.iter())
            .filter(|child| child.ready_to_delete())
            .map(|child| child.id)
            .collect();
        for id in doomed {
            self.queue_remove(id);
        }
    }

    fn update(&mut self) -> Vec<SharedObject> {
        self.state.commit();
        if !self.pending_add.is_empty() {
            log::debug!("group admitting {} children", self.pending_add.len());
            for child in self.pending_add.drain(..) {
                self.child_ids.insert(child.id);
                self.children.push(child);
            }
            self.pending_ids.clear();
        }
        if !self.pending_remove.is_empty() {
            let removing = std::mem::take(&mut self.pending_remove);
            self.children.retain(|child| !removing.contains(&child.id));
            for id in &removing {
                self.child_ids.remove(id);
            }
        }
        Vec::new()
    }

    fn ready_to_delete(&self) -> bool {
        self.state.ready_to_delete()
    }
}

impl Sprite for SpriteGroup {
    fn placement(&self) -> Placement {
        self.state.placement()
    }

    fn draw(&self, surface: &mut dyn DrawSurface) -> Result<(), DrawError> {
        SpriteGroup::draw(self, surface)
    }
}
