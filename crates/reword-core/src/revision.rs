//! Revision expressions
//!
//! Grammar: a base followed by any number of navigation steps.
//!
//! - base: `HEAD`, a branch name (`main`, `refs/heads/main`), or a hex id
//!   prefix of at least four characters
//! - `~N`: follow the first parent N times (`~` alone means `~1`)
//! - `^N`: take the N-th parent (`^` alone means `^1`, `^0` is the snapshot
//!   itself)

use crate::errors::{ExResult, RewordError};
use crate::model::snapshot::is_lower_hex;
use crate::model::SnapshotId;

/// Shortest hex prefix accepted as an abbreviated id
pub const MIN_PREFIX_LEN: usize = 4;

/// What revision resolution needs from a store
pub trait RevisionSource {
    /// Target of a reference; `name` is `HEAD`, a short branch name or a
    /// qualified reference name
    ///
    /// # Errors
    ///
    /// Propagates storage failures. An unknown name is `Ok(None)`.
    fn lookup_ref(&self, name: &str) -> ExResult<Option<SnapshotId>>;

    /// Every stored id starting with `prefix`
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    fn ids_with_prefix(&self, prefix: &str) -> ExResult<Vec<SnapshotId>>;

    /// Parent ids of a stored snapshot, in order
    ///
    /// # Errors
    ///
    /// `NotFound` if the snapshot is missing.
    fn parent_ids(&self, id: &SnapshotId) -> ExResult<Vec<SnapshotId>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `~N`
    Ancestor(usize),
    /// `^N`
    Parent(usize),
}

/// A parsed revision expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionExpr {
    pub base: String,
    pub steps: Vec<Step>,
}

impl RevisionExpr {
    /// # Errors
    ///
    /// `InvalidRevision` for an empty base or a malformed step.
    pub fn parse(expr: &str) -> crate::errors::Result<Self> {
        let invalid = |reason: &str| RewordError::InvalidRevision {
            revision: expr.to_string(),
            reason: reason.to_string(),
        };

        let split = expr.find(['~', '^']).unwrap_or(expr.len());
        let (base, mut rest) = expr.split_at(split);
        if base.is_empty() {
            return Err(invalid("missing base"));
        }
        if base.chars().any(char::is_whitespace) {
            return Err(invalid("whitespace in revision"));
        }

        let mut steps = Vec::new();
        while let Some(op) = rest.chars().next() {
            rest = &rest[op.len_utf8()..];
            let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            let count = if digits == 0 {
                1
            } else {
                rest[..digits]
                    .parse::<usize>()
                    .map_err(|_| invalid("step count out of range"))?
            };
            rest = &rest[digits..];
            match op {
                '~' => steps.push(Step::Ancestor(count)),
                '^' => steps.push(Step::Parent(count)),
                _ => return Err(invalid("unexpected character after step")),
            }
        }

        Ok(Self {
            base: base.to_string(),
            steps,
        })
    }
}

/// Resolve `expr` against `source`
///
/// Full-length ids are taken literally, then references are consulted, then
/// abbreviated ids. An abbreviated id matching more than one snapshot is an
/// error listing every candidate.
///
/// # Errors
///
/// `AmbiguousOrUnknownRevision` if the expression is malformed, names
/// nothing, or is ambiguous.
pub fn resolve_revision<R: RevisionSource + ?Sized>(source: &R, expr: &str) -> ExResult<SnapshotId> {
    let parsed = RevisionExpr::parse(expr)?;
    let unknown = || RewordError::UnknownRevision {
        revision: expr.to_string(),
    };

    let mut current = resolve_base(source, expr, &parsed.base)?;
    for step in parsed.steps {
        match step {
            Step::Parent(0) => {}
            Step::Parent(n) => {
                let parents = source.parent_ids(&current)?;
                current = parents.into_iter().nth(n - 1).ok_or_else(unknown)?;
            }
            Step::Ancestor(n) => {
                for _ in 0..n {
                    let parents = source.parent_ids(&current)?;
                    current = parents.into_iter().next().ok_or_else(unknown)?;
                }
            }
        }
    }

    tracing::debug!(revision = expr, snapshot_id = %current, "Resolved revision");
    Ok(current)
}

fn resolve_base<R: RevisionSource + ?Sized>(
    source: &R,
    expr: &str,
    base: &str,
) -> ExResult<SnapshotId> {
    let unknown = || RewordError::UnknownRevision {
        revision: expr.to_string(),
    };

    if base.len() == SnapshotId::HEX_LEN && is_lower_hex(base) {
        let matches = source.ids_with_prefix(base)?;
        return matches.into_iter().next().ok_or_else(|| unknown().into());
    }

    if let Some(id) = source.lookup_ref(base)? {
        return Ok(id);
    }

    let prefix = base.to_ascii_lowercase();
    if prefix.len() < MIN_PREFIX_LEN || !is_lower_hex(&prefix) {
        return Err(unknown().into());
    }

    let mut matches = source.ids_with_prefix(&prefix)?;
    matches.sort();
    matches.dedup();
    match matches.len() {
        0 => Err(unknown().into()),
        1 => Ok(matches.remove(0)),
        _ => Err(RewordError::AmbiguousRevision {
            revision: expr.to_string(),
            candidates: matches.iter().map(|id| id.to_string()).collect(),
        }
        .into()),
    }
}
