//! Batching and re-entrancy control for convention execution.
//!
//! The dispatcher is a two-state machine, Idle and Batching, with a nestable
//! depth counter rather than a boolean since builders call each other
//! re-entrantly. While a batch is open, change events queue in arrival
//! order; closing the outermost batch drains them. An event raised while
//! idle runs as a degenerate one-event batch, immediately and synchronously.
//!
//! The drain takes a batch's queued events as a unit, so a nested batch
//! opened by a convention drains only its own events, depth-first, before
//! the outer drain proceeds to its next event. Later conventions therefore
//! always observe the fully settled state left by earlier ones.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::trace;

use super::context::ConventionContext;
use super::events::ModelEvent;
use super::set::ConventionSet;
use crate::error::ModelError;
use crate::metadata::Model;

/// Per-model dispatcher: convention registrations, the batch depth, and the
/// pending-event queue. Created with the model and torn down with it.
#[derive(Debug)]
pub struct ConventionDispatcher {
    conventions: ConventionSet,
    depth: Rc<Cell<usize>>,
    queue: VecDeque<ModelEvent>,
}

impl ConventionDispatcher {
    pub(crate) fn new(conventions: ConventionSet) -> Self {
        Self {
            conventions,
            depth: Rc::new(Cell::new(0)),
            queue: VecDeque::new(),
        }
    }

    /// Whether a batch is currently open.
    pub fn in_batch(&self) -> bool {
        self.depth.get() > 0
    }

    /// Number of events waiting for the outermost batch to close.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }
}

/// Decrements the batch depth on drop, so the count survives early returns
/// and unwinding without borrowing the model.
struct DepthGuard(Rc<Cell<usize>>);

impl Drop for DepthGuard {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

/// Run `f` inside a batch scope.
///
/// Entering the first batch suspends event propagation; leaving the
/// outermost batch drains the queued events in arrival order. An error from
/// `f` or from a convention aborts the batch: the depth still unwinds and
/// the batch's pending events are discarded (any partially applied
/// multi-step builder operation has already rolled itself back).
pub fn batch<R>(
    model: &mut Model,
    f: impl FnOnce(&mut Model) -> Result<R, ModelError>,
) -> Result<R, ModelError> {
    let depth = model.dispatcher.depth.clone();
    depth.set(depth.get() + 1);
    if depth.get() == 1 {
        trace!(target: "relmodel::dispatch", "batch opened");
    }
    let guard = DepthGuard(depth.clone());

    match f(model) {
        Ok(value) => {
            drop(guard);
            if depth.get() == 0 {
                trace!(
                    target: "relmodel::dispatch",
                    pending = model.dispatcher.queue.len(),
                    "batch closed, draining"
                );
                if let Err(err) = drain(model) {
                    model.dispatcher.queue.clear();
                    return Err(err);
                }
            }
            Ok(value)
        }
        Err(err) => {
            drop(guard);
            if depth.get() == 0 {
                let dropped = model.dispatcher.queue.len();
                if dropped > 0 {
                    trace!(
                        target: "relmodel::dispatch",
                        dropped,
                        "batch aborted, discarding pending events"
                    );
                }
                model.dispatcher.queue.clear();
            }
            Err(err)
        }
    }
}

/// Raise a model-change event.
///
/// Queued while a batch is open; otherwise dispatched immediately as a
/// degenerate one-event batch.
pub(crate) fn raise(model: &mut Model, event: ModelEvent) -> Result<(), ModelError> {
    if model.dispatcher.depth.get() > 0 {
        trace!(target: "relmodel::dispatch", kind = ?event.kind(), entity = event.entity(), "event queued");
        model.dispatcher.queue.push_back(event);
        return Ok(());
    }
    run_conventions(model, event)
}

fn drain(model: &mut Model) -> Result<(), ModelError> {
    // Take the batch's events as a unit: a nested batch opened during a
    // callback accumulates and drains its own events before control returns
    // here.
    let events = std::mem::take(&mut model.dispatcher.queue);
    for event in events {
        run_conventions(model, event)?;
    }
    Ok(())
}

fn run_conventions(model: &mut Model, event: ModelEvent) -> Result<(), ModelError> {
    let conventions = model.dispatcher.conventions.for_kind(event.kind()).to_vec();
    if conventions.is_empty() {
        return Ok(());
    }
    trace!(
        target: "relmodel::dispatch",
        kind = ?event.kind(),
        entity = event.entity(),
        conventions = conventions.len(),
        "dispatching event"
    );
    let mut ctx = ConventionContext::new();
    for convention in conventions {
        convention.process(model, &event, &mut ctx)?;
        if ctx.should_stop() {
            trace!(
                target: "relmodel::dispatch",
                convention = convention.name(),
                "event processing short-circuited"
            );
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convention::ConventionSet;
    use crate::metadata::{Model, ModelConfig};

    fn empty_model() -> Model {
        Model::with_conventions(ModelConfig::default(), ConventionSet::empty())
    }

    #[test]
    fn test_batch_depth_unwinds_on_error() {
        let mut model = empty_model();
        let result = batch(&mut model, |model| {
            assert!(model.dispatcher.in_batch());
            Err::<(), _>(ModelError::Configuration("nope".into()))
        });
        assert!(result.is_err());
        assert!(!model.dispatcher.in_batch());
        assert_eq!(model.dispatcher.pending_events(), 0);
    }

    #[test]
    fn test_nested_batches_drain_at_outermost_close_only() {
        let mut model = empty_model();
        batch(&mut model, |model| {
            raise(
                model,
                ModelEvent::EntityTypeAdded { entity: "A".into() },
            )?;
            batch(model, |model| {
                raise(
                    model,
                    ModelEvent::EntityTypeAdded { entity: "B".into() },
                )?;
                assert_eq!(model.dispatcher.pending_events(), 2);
                Ok(())
            })?;
            // The nested close leaves the queue untouched.
            assert_eq!(model.dispatcher.pending_events(), 2);
            assert!(model.dispatcher.in_batch());
            Ok(())
        })
        .unwrap();
        assert_eq!(model.dispatcher.pending_events(), 0);
        assert!(!model.dispatcher.in_batch());
    }

    #[test]
    fn test_idle_raise_leaves_no_queue() {
        let mut model = empty_model();
        raise(
            &mut model,
            ModelEvent::EntityTypeAdded { entity: "A".into() },
        )
        .unwrap();
        assert_eq!(model.dispatcher.pending_events(), 0);
    }
}
