//! Per-Kind Render Step
//!
//! Performing a unit decides the structure below it and nothing else:
//!
//! - root and fragment units reconcile their own `children`
//! - host units create their node if they have none yet, then reconcile
//!   their `children` (text entries are left for commit)
//! - function units call their render fn with the hook records of their
//!   alternate and reconcile the single element it returns
//! - stateful units instantiate the component from props and reconcile what
//!   `render()` returns
//!
//! Attributes are not applied here; commit does that.

use std::rc::Rc;

use tracing::{trace, warn};

use super::Engine;
use crate::element::{Children, Element, FunctionComponent, Props};
use crate::error::{EngineError, HookError, RenderError};
use crate::fiber::{reconcile_children, UnitId, UnitKind};
use crate::hooks::Hooks;
use crate::host::Host;

impl<H: Host> Engine<H> {
    /// Render one unit, reconcile its children, and return the unit to perform next.
    pub(super) fn perform_unit(&mut self, id: UnitId) -> Result<Option<UnitId>, EngineError> {
        let Some(wip) = self.wip.as_mut() else {
            return Ok(None);
        };
        let kind = wip[id].kind.clone();
        let props = Rc::clone(&wip[id].props);
        trace!(unit = %id, kind = kind.label(), "perform unit");

        let rendered;
        let children = match &kind {
            UnitKind::Root | UnitKind::Fragment => props.children(),
            UnitKind::Host(tag) => {
                if props.contains("children") {
                    return Err(RenderError::ReservedAttribute {
                        tag: tag.to_string(),
                    }
                    .into());
                }
                if wip[id].host.is_none() {
                    wip[id].host = Some(self.host.create_node(tag)?);
                }
                props.children()
            }
            UnitKind::Function(component) => {
                rendered = Children::single(self.render_function(id, *component, &props)?);
                &rendered
            }
            UnitKind::Stateful(class) => {
                rendered = Children::single(class.instantiate(&props).render()?);
                &rendered
            }
        };

        let Some(wip) = self.wip.as_mut() else {
            return Ok(None);
        };
        reconcile_children(wip, self.current.as_mut(), id, children, &mut self.deletions);
        Ok(wip.next_unit(id))
    }

    /// Invoke a function component with the hook records of its alternate.
    fn render_function(
        &mut self,
        id: UnitId,
        component: FunctionComponent,
        props: &Props,
    ) -> Result<Element, EngineError> {
        let Some(wip) = self.wip.as_mut() else {
            return Err(EngineError::DetachedUnit(id));
        };
        let previous = match (wip[id].alternate, self.current.as_ref()) {
            (Some(alternate), Some(current)) => Some(current[alternate].hooks.as_slice()),
            _ => None,
        };

        let requested_before = self.requests.pending();
        let mut hooks = Hooks::new(previous, &self.requests);
        let element = (component.render_fn())(props, &mut hooks)?;

        if let Err(err) = hooks.check_order() {
            if self.config.strict_hook_order {
                return Err(RenderError::from(err).into());
            }
            warn!(unit = %id, error = %err, "hook order changed between renders");
        }
        let records = hooks.finish();

        if self.requests.pending() != requested_before {
            return Err(RenderError::from(HookError::UpdateDuringRender {
                component: format!("{component:?}"),
            })
            .into());
        }

        wip[id].hooks = records;
        Ok(element)
    }
}
