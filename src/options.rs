//! Per-pass reading options.

use core::fmt;

use chrono::{DateTime, Utc};

use crate::{FieldFlags, ObjectRef};

/// Knobs for one reading pass.
#[derive(Clone)]
pub struct ParserOptions {
    /// Deepest nesting of fields and elements that will be read; `None`
    /// disables the limit.
    pub max_depth: Option<usize>,
    /// When non-empty, only fields carrying at least one of these flags are
    /// read.
    pub check_flags: FieldFlags,
    /// Owner of constructed instances, and the scope named references are
    /// looked up in first.
    pub outer: Option<ObjectRef>,
    /// Source of the current time for `"now"` dates.
    pub clock: fn() -> DateTime<Utc>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(128),
            check_flags: FieldFlags::empty(),
            outer: None,
            clock: Utc::now,
        }
    }
}

impl ParserOptions {
    /// Options with the default depth limit and no flag filtering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or removes the nesting limit.
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Only read fields carrying one of `flags`.
    pub fn check_flags(mut self, flags: FieldFlags) -> Self {
        self.check_flags = flags;
        self
    }

    /// Sets the owner for constructed and looked-up instances.
    pub fn outer(mut self, outer: ObjectRef) -> Self {
        self.outer = Some(outer);
        self
    }

    /// Replaces the clock used for `"now"`.
    pub fn clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn reads(&self, flags: FieldFlags) -> bool {
        self.check_flags.is_empty() || flags.intersects(self.check_flags)
    }
}

impl fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field("max_depth", &self.max_depth)
            .field("check_flags", &self.check_flags)
            .field("outer", &self.outer)
            .finish_non_exhaustive()
    }
}
