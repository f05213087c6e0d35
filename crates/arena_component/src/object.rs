//! [`GameObject`]: an ordered set of owned components.
//!
//! An object owns its components exclusively. Insertion order is update and
//! draw order. Capability lookup goes through a `ComponentTypeId → slot`
//! index populated by [`GameObject::add_component`], which also enforces the
//! one-component-per-type invariant.
//!
//! Components never hold a pointer back to their object. Each hook receives
//! the owner as a parameter; to make that borrow possible the running
//! component is lifted out of its slot for the duration of the call.

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;

use crate::component::{Component, ComponentTypeId};
use crate::entity::Entity;
use crate::error::ComponentError;
use crate::frame::FrameContext;
use crate::render::Canvas;

/// Callback run on the owner once the current hook has returned.
pub type Deferred = Box<dyn FnOnce(&mut GameObject) -> Result<(), ComponentError>>;

/// Area damage queued by a melee attacker and resolved by the world.
#[derive(Debug, Clone, PartialEq)]
pub struct MeleeSweep {
    pub center: Vec2,
    pub size: Vec2,
    pub damage: f32,
    /// Collision groups the sweep can hit.
    pub hits: u32,
    /// Entities already struck by this swing.
    pub exclude: Vec<Entity>,
}

/// Something an object asks of the world it lives in.
pub enum WorldRequest {
    /// Insert a new object at the given depth after the current update.
    Spawn { depth: usize, object: Box<GameObject> },
    Sweep(MeleeSweep),
}

impl fmt::Debug for WorldRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { depth, object } => f
                .debug_struct("Spawn")
                .field("depth", depth)
                .field("object", &object.label())
                .finish(),
            Self::Sweep(sweep) => f.debug_tuple("Sweep").field(sweep).finish(),
        }
    }
}

struct Slot {
    name: &'static str,
    component: Option<Box<dyn Component>>,
}

/// A composable game object.
pub struct GameObject {
    id: Entity,
    label: String,
    active: bool,
    frame: FrameContext,
    slots: Vec<Slot>,
    index: HashMap<ComponentTypeId, usize>,
    requests: Vec<WorldRequest>,
    deferred: Vec<Deferred>,
}

impl GameObject {
    /// An active, unbound object with no components.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Entity::UNBOUND,
            label: label.into(),
            active: true,
            frame: FrameContext::default(),
            slots: Vec::new(),
            index: HashMap::new(),
            requests: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// The id assigned by the world, or [`Entity::UNBOUND`] before insertion.
    #[must_use]
    pub fn id(&self) -> Entity {
        self.id
    }

    /// Binds the world-assigned id. Returns `false` if already bound.
    pub fn bind(&mut self, id: Entity) -> bool {
        if self.id.is_bound() {
            return false;
        }
        self.id = id;
        true
    }

    /// Drops the world-assigned id so another world insertion can bind a
    /// fresh one. Returns the id it had.
    pub fn unbind(&mut self) -> Entity {
        std::mem::replace(&mut self.id, Entity::UNBOUND)
    }

    /// Human-readable name used in logs.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// `false` once [`despawn`](Self::despawn) was called.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Marks the object for removal. The world drops it after the current
    /// update or collision pass.
    pub fn despawn(&mut self) {
        self.active = false;
    }

    /// Context of the frame being processed.
    #[must_use]
    pub fn frame(&self) -> &FrameContext {
        &self.frame
    }

    /// Installs the context for the next hooks.
    pub fn set_frame(&mut self, frame: FrameContext) {
        self.frame = frame;
    }

    /// Attaches `component` and returns it for further configuration.
    ///
    /// # Errors
    ///
    /// [`ComponentError::Duplicate`] if a component of the same type is
    /// already attached.
    pub fn add_component<T: Component>(&mut self, component: T) -> Result<&mut T, ComponentError> {
        let type_id = T::component_type_id();
        if self.index.contains_key(&type_id) {
            return Err(ComponentError::Duplicate {
                component: T::type_name(),
                object: self.label.clone(),
            });
        }
        let slot = self.slots.len();
        self.index.insert(type_id, slot);
        self.slots.push(Slot {
            name: T::type_name(),
            component: Some(Box::new(component)),
        });
        self.get_mut::<T>().ok_or(ComponentError::Missing(T::type_name()))
    }

    /// Builder form of [`add_component`](Self::add_component).
    ///
    /// # Errors
    ///
    /// Same as [`add_component`](Self::add_component).
    pub fn attach<T: Component>(mut self, component: T) -> Result<Self, ComponentError> {
        self.add_component(component)?;
        Ok(self)
    }

    /// Returns `true` if a component of type `T` is attached, even if it is
    /// currently lifted out for its own hook.
    #[must_use]
    pub fn has<T: Component>(&self) -> bool {
        self.index.contains_key(&T::component_type_id())
    }

    /// The `T` component, unless missing or lifted out for its own hook.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&T> {
        let slot = *self.index.get(&T::component_type_id())?;
        let component: &dyn Component = self.slots[slot].component.as_deref()?;
        component.as_any().downcast_ref::<T>()
    }

    /// Mutable form of [`get`](Self::get).
    #[must_use]
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        let slot = *self.index.get(&T::component_type_id())?;
        let component: &mut dyn Component = self.slots[slot].component.as_deref_mut()?;
        component.as_any_mut().downcast_mut::<T>()
    }

    /// Runs `f` with mutable access to both the `T` component and its owner.
    ///
    /// Returns `None` if `T` is not attached or is already lifted out.
    pub fn with_component<T, R>(&mut self, f: impl FnOnce(&mut T, &mut GameObject) -> R) -> Option<R>
    where
        T: Component,
    {
        let slot = *self.index.get(&T::component_type_id())?;
        let mut boxed = self.slots[slot].component.take()?;
        let component: &mut dyn Component = boxed.as_mut();
        let result = component
            .as_any_mut()
            .downcast_mut::<T>()
            .map(|component| f(component, self));
        self.slots[slot].component = Some(boxed);
        result
    }

    /// Names of attached components in attachment order.
    pub fn component_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|slot| slot.name)
    }

    /// Queues `callback` to run on this object once the current hook returns.
    pub fn defer(&mut self, callback: Deferred) {
        self.deferred.push(callback);
    }

    /// Queues a request for the world to apply after the current hook.
    pub fn request(&mut self, request: WorldRequest) {
        self.requests.push(request);
    }

    /// Asks the world to insert `object` at `depth`.
    pub fn spawn(&mut self, depth: usize, object: GameObject) {
        self.requests.push(WorldRequest::Spawn {
            depth,
            object: Box::new(object),
        });
    }

    /// Takes every queued world request, oldest first.
    pub fn drain_requests(&mut self) -> Vec<WorldRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Runs every component's `update` hook in attachment order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing hook or deferred callback.
    pub fn update(&mut self) -> Result<(), ComponentError> {
        for slot in 0..self.slots.len() {
            let Some(mut component) = self.slots[slot].component.take() else {
                continue;
            };
            let result = component.update(self);
            self.slots[slot].component = Some(component);
            result?;
            self.run_deferred()?;
        }
        Ok(())
    }

    /// Runs every component's `draw` hook in attachment order.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for slot in &self.slots {
            if let Some(component) = slot.component.as_deref() {
                component.draw(self, canvas);
            }
        }
    }

    /// Dispatches a collision with `other` to every component.
    ///
    /// # Errors
    ///
    /// Stops at the first failing hook or deferred callback.
    pub fn handle_collision(&mut self, other: &mut GameObject) -> Result<(), ComponentError> {
        for slot in 0..self.slots.len() {
            let Some(mut component) = self.slots[slot].component.take() else {
                continue;
            };
            let result = component.handle_collision(self, other);
            self.slots[slot].component = Some(component);
            result?;
            self.run_deferred()?;
        }
        Ok(())
    }

    fn run_deferred(&mut self) -> Result<(), ComponentError> {
        while !self.deferred.is_empty() {
            let batch = std::mem::take(&mut self.deferred);
            for callback in batch {
                callback(self)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("active", &self.active)
            .field("components", &self.component_names().collect::<Vec<_>>())
            .finish()
    }
}
