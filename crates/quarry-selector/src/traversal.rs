//! Tree navigation built on engine queries.
//!
//! These helpers only use [`QueryEngine`] calls, so they work against any
//! driver. Parent lookup is the boundary detector: the document element has
//! no parent element, and a node that went stale mid-walk is treated the same
//! way.

use crate::engine::{QueryEngine, QueryKind};
use crate::error::EngineError;

/// The parent element, or `None` at the top of the tree.
///
/// `NotFound` and `StaleElement` mean "no parent"; any other engine failure
/// propagates.
pub fn parent<E: QueryEngine>(
    engine: &E,
    element: &E::Element,
) -> Result<Option<E::Element>, EngineError> {
    match engine.find_one(element, "..", QueryKind::Path) {
        Ok(parent) => Ok(Some(parent)),
        Err(EngineError::NotFound { .. } | EngineError::StaleElement) => Ok(None),
        Err(other) => Err(other),
    }
}

/// The `lang` attribute of the element or its nearest ancestor carrying one.
pub fn lang<E: QueryEngine>(
    engine: &E,
    element: &E::Element,
) -> Result<Option<String>, EngineError> {
    let mut current = Some(element.clone());
    while let Some(node) = current {
        if let Some(lang) = engine.attribute(&node, "lang")? {
            return Ok(Some(lang));
        }
        current = parent(engine, &node)?;
    }
    Ok(None)
}

/// Whether the element carries the attribute at all (empty values count).
pub fn has_attribute<E: QueryEngine>(
    engine: &E,
    element: &E::Element,
    name: &str,
) -> Result<bool, EngineError> {
    Ok(engine.attribute(element, name)?.is_some())
}

/// Displayed and not a `<title>`.
///
/// Some drivers report `<title>` as displayed, others don't; it is never
/// considered visible here so results agree across drivers.
pub fn is_visible<E: QueryEngine>(engine: &E, element: &E::Element) -> Result<bool, EngineError> {
    Ok(engine.is_displayed(element)? && engine.tag_name(element)? != "title")
}

/// The element children of the element's parent, the element included.
///
/// Without a parent the element is the only member of its sibling set.
pub fn itself_with_siblings<E: QueryEngine>(
    engine: &E,
    element: &E::Element,
) -> Result<Vec<E::Element>, EngineError> {
    match parent(engine, element)? {
        Some(parent) => engine.find_all(&parent, "./*", QueryKind::Path),
        None => Ok(vec![element.clone()]),
    }
}

/// Siblings before the element, in document order.
pub fn previous_siblings<E: QueryEngine>(
    engine: &E,
    element: &E::Element,
) -> Result<Vec<E::Element>, EngineError> {
    Ok(itself_with_siblings(engine, element)?
        .into_iter()
        .take_while(|sibling| sibling != element)
        .collect())
}

/// The sibling immediately before the element.
pub fn previous_sibling<E: QueryEngine>(
    engine: &E,
    element: &E::Element,
) -> Result<Option<E::Element>, EngineError> {
    Ok(previous_siblings(engine, element)?.pop())
}
