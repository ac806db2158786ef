//! Executable locator plans.
//!
//! A [`CompiledSelector`] holds one [`SelectorPlan`] per comma-separated
//! branch. A plan runs left to right: the candidate set starts as the search
//! root, and every [`PlanStep`] replaces it with the elements its locator
//! finds relative to the candidates, narrowed by the step's filters.
//!
//! A branch yields elements in document order without duplicates. Child and
//! sibling steps collect the elements the combinator reaches from each
//! candidate, then keep those found by one document-wide run of the locator,
//! so nested candidates cannot reorder the result. Branches merge in
//! first-seen order.

use std::borrow::Cow;
use std::collections::HashSet;

use log::trace;

use crate::ast::Combinator;
use crate::engine::{QueryEngine, QueryKind};
use crate::error::SelectorError;
use crate::filter::{self, CssFilter};
use crate::locator::Locator;
use crate::traversal;

/// One compound of a complex selector, ready to run.
#[derive(Debug, Clone)]
pub struct PlanStep {
    /// How located elements relate to the previous step's candidates.
    pub combinator: Combinator,
    /// The query for the compound's query-expressible conditions.
    pub locator: Locator,
    /// In-process conditions applied to what the locator found.
    pub filters: Vec<CssFilter>,
}

/// One branch of a selector list.
#[derive(Debug, Clone)]
pub struct SelectorPlan {
    /// Steps in execution order. Never empty.
    pub steps: Vec<PlanStep>,
}

/// A compiled selector list.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    branches: Vec<SelectorPlan>,
}

impl CompiledSelector {
    /// Wrap compiled branches.
    #[must_use]
    pub fn new(branches: Vec<SelectorPlan>) -> Self {
        Self { branches }
    }

    /// The branches, in source order.
    #[must_use]
    pub fn branches(&self) -> &[SelectorPlan] {
        &self.branches
    }

    /// Run every branch from `root` and merge the results.
    pub fn execute<E: QueryEngine>(
        &self,
        engine: &E,
        root: &E::Element,
    ) -> Result<Vec<E::Element>, SelectorError> {
        let mut merged = Vec::new();
        let mut seen = HashSet::new();
        for branch in &self.branches {
            for element in branch.execute(engine, root)? {
                if seen.insert(element.clone()) {
                    merged.push(element);
                }
            }
        }
        Ok(merged)
    }
}

impl SelectorPlan {
    /// Run the steps from `root`.
    pub fn execute<E: QueryEngine>(
        &self,
        engine: &E,
        root: &E::Element,
    ) -> Result<Vec<E::Element>, SelectorError> {
        let mut candidates = vec![root.clone()];

        for step in &self.steps {
            let mut next = Vec::new();
            for element in step.locate(engine, &candidates)? {
                if filter::matches_all(&step.filters, engine, &element)? {
                    next.push(element);
                }
            }
            trace!(
                "{:?} {} from {} candidate(s): {} match(es)",
                step.combinator,
                step.locator,
                candidates.len(),
                next.len()
            );
            if next.is_empty() {
                return Ok(next);
            }
            candidates = next;
        }

        Ok(candidates)
    }
}

impl PlanStep {
    /// Elements related to any of `candidates` by the combinator that satisfy
    /// the locator, in document order and before filtering.
    fn locate<E: QueryEngine>(
        &self,
        engine: &E,
        candidates: &[E::Element],
    ) -> Result<Vec<E::Element>, SelectorError> {
        if self.combinator == Combinator::Descendant {
            return self.descendants_of(engine, candidates);
        }

        let mut related = HashSet::new();
        for candidate in candidates {
            related.extend(self.related_to(engine, candidate)?);
        }
        if related.is_empty() {
            return Ok(Vec::new());
        }

        let scan = self.scan_expression();
        let matching = engine.find_all(&engine.document(), &scan, self.locator.kind())?;
        Ok(matching
            .into_iter()
            .filter(|element| related.contains(element))
            .collect())
    }

    /// Descendants of every candidate, first-seen order.
    ///
    /// Candidates are in document order: a nested candidate's matches are
    /// already among its ancestor's, and disjoint subtrees follow each other.
    fn descendants_of<E: QueryEngine>(
        &self,
        engine: &E,
        candidates: &[E::Element],
    ) -> Result<Vec<E::Element>, SelectorError> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        for candidate in candidates {
            let matching =
                engine.find_all(candidate, self.locator.expression(), self.locator.kind())?;
            for element in matching {
                if seen.insert(element.clone()) {
                    found.push(element);
                }
            }
        }
        Ok(found)
    }

    /// Elements the combinator reaches from `candidate`, matching or not:
    /// children for `>`, the next sibling for `+`, every later sibling for `~`.
    fn related_to<E: QueryEngine>(
        &self,
        engine: &E,
        candidate: &E::Element,
    ) -> Result<Vec<E::Element>, SelectorError> {
        if self.combinator == Combinator::Child {
            return Ok(engine.find_all(candidate, "./*", QueryKind::Path)?);
        }

        let siblings = traversal::itself_with_siblings(engine, candidate)?;
        let Some(index) = siblings.iter().position(|sibling| sibling == candidate) else {
            return Ok(Vec::new());
        };
        let after = siblings.into_iter().skip(index + 1);
        Ok(match self.combinator {
            Combinator::NextSibling => after.take(1).collect(),
            _ => after.collect(),
        })
    }

    /// The locator widened to the whole document.
    ///
    /// Non-descendant path locators read `./*[P]`; `.//*[P]` keeps `P`
    /// sibling-relative while reaching every element.
    fn scan_expression(&self) -> Cow<'_, str> {
        match &self.locator {
            Locator::Path(xpath) => match xpath.strip_prefix("./*") {
                Some(rest) => Cow::Owned(format!(".//*{rest}")),
                None => Cow::Borrowed(xpath.as_str()),
            },
            Locator::Native(css) => Cow::Borrowed(css.as_str()),
        }
    }
}
